//! Live merge controller.

use super::value_objects::ViewportWindow;
use crate::domain::errors::MalformedBarError;
use crate::domain::market_data::{BarStore, LiveChannel, LiveTick, MergeOutcome};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LiveMode {
    #[default]
    Historical,
    Live,
}

/// Subscription change requested from the push feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveEffect {
    Subscribe(LiveChannel),
    Unsubscribe(LiveChannel),
}

#[derive(Debug, Clone)]
pub struct LiveController {
    mode: LiveMode,
    subscription: Option<LiveChannel>,
    connected: bool,
    edge_threshold: usize,
}

impl LiveController {
    pub fn new(edge_threshold: usize) -> Self {
        Self { mode: LiveMode::Historical, subscription: None, connected: true, edge_threshold }
    }

    pub fn mode(&self) -> LiveMode {
        self.mode
    }

    pub fn subscription(&self) -> Option<&LiveChannel> {
        self.subscription.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Live mode with a working subscription.
    pub fn is_live(&self) -> bool {
        self.mode == LiveMode::Live && self.subscription.is_some() && self.connected
    }

    /// Whether `window` sits within the edge threshold of the newest bar.
    pub fn at_live_edge(&self, window: &ViewportWindow, len: usize) -> bool {
        window.end_index + self.edge_threshold >= len
    }

    /// Move between Historical and Live for the current window.
    pub fn evaluate(
        &mut self,
        window: &ViewportWindow,
        len: usize,
        channel: &LiveChannel,
    ) -> Option<LiveEffect> {
        let target =
            if self.at_live_edge(window, len) { LiveMode::Live } else { LiveMode::Historical };
        if target == self.mode {
            return None;
        }
        self.mode = target;
        match target {
            LiveMode::Live => {
                // a fresh subscription opens its own stream
                self.connected = true;
                self.subscription = Some(channel.clone());
                Some(LiveEffect::Subscribe(channel.clone()))
            }
            LiveMode::Historical => self.subscription.take().map(LiveEffect::Unsubscribe),
        }
    }

    /// Ticks for another symbol or timeframe than the store's are ignored.
    pub fn accepts(&self, store: &BarStore, tick: &LiveTick) -> bool {
        tick.symbol == *store.symbol() && tick.timeframe == store.timeframe()
    }

    pub fn merge(
        &self,
        store: &mut BarStore,
        tick: &LiveTick,
    ) -> Result<MergeOutcome, MalformedBarError> {
        store.merge_live(tick.bar)
    }

    pub fn disconnected(&mut self) {
        self.connected = false;
    }

    /// Re-subscribe when the feed comes back while still live.
    pub fn reconnected(&mut self) -> Option<LiveEffect> {
        self.connected = true;
        match (self.mode, &self.subscription) {
            (LiveMode::Live, Some(channel)) => Some(LiveEffect::Subscribe(channel.clone())),
            _ => None,
        }
    }

    /// Drop the subscription and return to Historical.
    pub fn reset(&mut self) -> Option<LiveEffect> {
        self.mode = LiveMode::Historical;
        self.connected = true;
        self.subscription.take().map(LiveEffect::Unsubscribe)
    }
}
