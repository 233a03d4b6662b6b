use gloo_timers::callback::Timeout;

/// Single pending browser timeout. Scheduling replaces the previous one and
/// dropping the timer cancels it.
#[derive(Default)]
pub struct SettleTimer {
    pending: Option<Timeout>,
}

impl SettleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_ms: u64, callback: impl FnOnce() + 'static) {
        self.cancel();
        let delay = u32::try_from(delay_ms).unwrap_or(u32::MAX);
        self.pending = Some(Timeout::new(delay, callback));
    }

    pub fn cancel(&mut self) {
        // dropping a Timeout clears it
        self.pending = None;
    }
}
