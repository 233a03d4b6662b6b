use std::time::Duration;

/// Exponential reconnect delay: 1s, 2s, 4s ... capped at 32s.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    next_secs: u64,
    max_secs: u64,
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self { next_secs: 1, max_secs: 32 }
    }
}

impl ReconnectBackoff {
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next_secs;
        self.next_secs = (self.next_secs * 2).min(self.max_secs);
        Duration::from_secs(delay)
    }

    pub fn reset(&mut self) {
        self.next_secs = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_cap_and_resets() {
        let mut backoff = ReconnectBackoff::default();
        let delays: Vec<u64> = (0..8).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 32, 32]);
        backoff.reset();
        assert_eq!(backoff.next_delay().as_secs(), 1);
    }
}
