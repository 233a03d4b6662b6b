//! Prefetch controller.
//!
//! Decides when older history must be loaded and tracks the single outstanding
//! request. Every request carries the session epoch it was issued for, so a
//! result that arrives after a symbol switch is recognised and dropped.

use super::value_objects::ViewportWindow;
use crate::domain::errors::FetchError;
use crate::domain::market_data::{Symbol, Timeframe};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchKind {
    /// First load after a symbol/timeframe selection
    Initial,
    /// Larger reload triggered near the oldest loaded bar
    Expand,
}

/// Identity of one historical request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchTicket {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub epoch: u64,
    pub points: usize,
    pub kind: FetchKind,
}

#[derive(Debug, Clone)]
struct InFlight {
    ticket: FetchTicket,
    previous_points: usize,
}

#[derive(Debug, Clone)]
pub struct PrefetchController {
    epoch: u64,
    in_flight: Option<InFlight>,
    loaded_count: usize,
    requested_points: usize,
    exhausted: bool,
    error: Option<FetchError>,
    initial_points: usize,
    increment: usize,
    cap: usize,
    edge_margin: usize,
}

impl PrefetchController {
    pub fn new(initial_points: usize, increment: usize, cap: usize, edge_margin: usize) -> Self {
        Self {
            epoch: 0,
            in_flight: None,
            loaded_count: 0,
            requested_points: 0,
            exhausted: false,
            error: None,
            initial_points: initial_points.min(cap),
            increment,
            cap,
            edge_margin,
        }
    }

    /// Start a new session and issue its initial request.
    pub fn begin_session(&mut self, symbol: Symbol, timeframe: Timeframe) -> FetchTicket {
        self.reset();
        let ticket = FetchTicket {
            symbol,
            timeframe,
            epoch: self.epoch,
            points: self.initial_points,
            kind: FetchKind::Initial,
        };
        self.in_flight = Some(InFlight { ticket: ticket.clone(), previous_points: 0 });
        self.requested_points = ticket.points;
        ticket
    }

    /// Abandon the session: bump the epoch so outstanding results are ignored.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        self.loaded_count = 0;
        self.requested_points = 0;
        self.exhausted = false;
        self.error = None;
    }

    pub fn should_prefetch(&self, window: &ViewportWindow) -> bool {
        window.start_index <= self.edge_margin && self.can_expand() && self.error.is_none()
    }

    /// Issue an expansion request when the window nears the oldest bar.
    /// A trigger while a request is outstanding is dropped.
    pub fn maybe_prefetch(
        &mut self,
        window: &ViewportWindow,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> Option<FetchTicket> {
        if !self.should_prefetch(window) {
            return None;
        }
        Some(self.issue_expand(symbol, timeframe))
    }

    /// Clear the error gate and repeat the failed load.
    pub fn retry(&mut self, symbol: &Symbol, timeframe: Timeframe) -> Option<FetchTicket> {
        if self.error.take().is_none() || self.in_flight.is_some() {
            return None;
        }
        if self.loaded_count == 0 {
            let ticket = FetchTicket {
                symbol: symbol.clone(),
                timeframe,
                epoch: self.epoch,
                points: self.initial_points,
                kind: FetchKind::Initial,
            };
            self.in_flight = Some(InFlight { ticket: ticket.clone(), previous_points: 0 });
            self.requested_points = ticket.points;
            return Some(ticket);
        }
        if !self.can_expand() {
            return None;
        }
        Some(self.issue_expand(symbol, timeframe))
    }

    /// Whether `ticket` is the outstanding request of the current session.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.epoch == self.epoch
            && self.in_flight.as_ref().is_some_and(|pending| pending.ticket == *ticket)
    }

    /// Record a successful load. `returned` is the raw size of the response and
    /// `kept` the number of bars that made it into the store.
    pub fn complete(&mut self, ticket: &FetchTicket, returned: usize, kept: usize) {
        self.in_flight = None;
        self.loaded_count = kept;
        self.error = None;
        if returned < ticket.points {
            self.exhausted = true;
        }
    }

    /// Record a failed load: the requested size reverts and automatic triggers stop.
    pub fn fail(&mut self, error: FetchError) {
        if let Some(pending) = self.in_flight.take() {
            self.requested_points = pending.previous_points;
        }
        self.error = Some(error);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref().map(|pending| &pending.ticket)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_count
    }

    pub fn requested_points(&self) -> usize {
        self.requested_points
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    fn can_expand(&self) -> bool {
        self.loaded_count > 0
            && self.loaded_count < self.cap
            && self.in_flight.is_none()
            && !self.exhausted
    }

    fn issue_expand(&mut self, symbol: &Symbol, timeframe: Timeframe) -> FetchTicket {
        let points = (self.loaded_count + self.increment).min(self.cap);
        let ticket = FetchTicket {
            symbol: symbol.clone(),
            timeframe,
            epoch: self.epoch,
            points,
            kind: FetchKind::Expand,
        };
        self.in_flight =
            Some(InFlight { ticket: ticket.clone(), previous_points: self.requested_points });
        self.requested_points = points;
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PrefetchController {
        PrefetchController::new(200, 100, 500, 10)
    }

    fn loaded(count: usize) -> PrefetchController {
        let mut c = controller();
        let ticket = c.begin_session(Symbol::from("SPY"), Timeframe::OneMinute);
        c.complete(&ticket, ticket.points, count);
        c
    }

    #[test]
    fn initial_ticket_uses_initial_points() {
        let mut c = controller();
        let ticket = c.begin_session(Symbol::from("SPY"), Timeframe::OneMinute);
        assert_eq!(ticket.points, 200);
        assert_eq!(ticket.kind, FetchKind::Initial);
        assert!(c.is_loading());
        assert!(c.is_current(&ticket));
    }

    #[test]
    fn triggers_once_near_oldest_bar() {
        let mut c = loaded(200);
        let window = ViewportWindow::new(5, 84);
        let ticket = c.maybe_prefetch(&window, &Symbol::from("SPY"), Timeframe::OneMinute);
        assert_eq!(ticket.map(|t| t.points), Some(300));
        assert!(c.maybe_prefetch(&window, &Symbol::from("SPY"), Timeframe::OneMinute).is_none());
    }

    #[test]
    fn far_window_does_not_trigger() {
        let mut c = loaded(200);
        let window = ViewportWindow::new(11, 90);
        assert!(c.maybe_prefetch(&window, &Symbol::from("SPY"), Timeframe::OneMinute).is_none());
    }

    #[test]
    fn cap_disables_prefetch() {
        let mut c = loaded(500);
        let window = ViewportWindow::new(0, 79);
        assert!(c.maybe_prefetch(&window, &Symbol::from("SPY"), Timeframe::OneMinute).is_none());
    }

    #[test]
    fn failure_reverts_and_blocks_until_retry() {
        let mut c = loaded(200);
        let window = ViewportWindow::new(0, 79);
        let symbol = Symbol::from("SPY");
        c.maybe_prefetch(&window, &symbol, Timeframe::OneMinute);
        assert_eq!(c.requested_points(), 300);

        c.fail(FetchError::Network("offline".to_string()));
        assert_eq!(c.requested_points(), 200);
        assert!(!c.is_loading());
        assert!(c.maybe_prefetch(&window, &symbol, Timeframe::OneMinute).is_none());

        let ticket = c.retry(&symbol, Timeframe::OneMinute);
        assert_eq!(ticket.map(|t| t.points), Some(300));
        assert!(c.error().is_none());
    }

    #[test]
    fn short_response_exhausts_history() {
        let mut c = loaded(200);
        let symbol = Symbol::from("SPY");
        let ticket = c.maybe_prefetch(&ViewportWindow::new(0, 79), &symbol, Timeframe::OneMinute);
        let ticket = ticket.unwrap();
        c.complete(&ticket, 250, 250);
        assert!(c.is_exhausted());
        let window = ViewportWindow::new(0, 79);
        assert!(c.maybe_prefetch(&window, &symbol, Timeframe::OneMinute).is_none());
    }

    #[test]
    fn reset_makes_tickets_stale() {
        let mut c = controller();
        let old = c.begin_session(Symbol::from("SPY"), Timeframe::OneMinute);
        let new = c.begin_session(Symbol::from("QQQ"), Timeframe::OneMinute);
        assert!(!c.is_current(&old));
        assert!(c.is_current(&new));
    }
}
