use crate::domain::errors::{FeedError, FeedResult, FetchResult};
use crate::domain::market_data::{Bar, LiveTick, Symbol, Timeframe};
use std::fmt;

/// Source of historical bars.
///
/// `fetch` returns up to `total_points` of the most recent bars, oldest first.
/// Timeouts are the implementation's concern.
#[allow(async_fn_in_trait)]
pub trait HistoricalDataSource {
    async fn fetch(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        total_points: usize,
    ) -> FetchResult<Vec<Bar>>;
}

/// Named push channel for one symbol and timeframe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveChannel {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
}

impl LiveChannel {
    pub fn new(symbol: Symbol, timeframe: Timeframe) -> Self {
        Self { symbol, timeframe }
    }
}

impl fmt::Display for LiveChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@kline_{}", self.symbol.value().to_lowercase(), self.timeframe.as_kline_str())
    }
}

/// Push feed delivering live bars. Reconnection is the implementation's concern;
/// the engine re-subscribes once told the feed is back.
pub trait LiveFeed {
    fn subscribe(&mut self, channel: &LiveChannel) -> FeedResult<()>;
    fn unsubscribe(&mut self, channel: &LiveChannel) -> FeedResult<()>;
}

/// Message delivered by a running push feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Tick(LiveTick),
    Disconnected(FeedError),
    Reconnected,
}
