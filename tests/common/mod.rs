#![allow(dead_code)]

use price_viewport_wasm::application::{EngineEffect, ViewportConfig, ViewportEngine};
use price_viewport_wasm::domain::chart::FetchTicket;
use price_viewport_wasm::domain::errors::{FeedError, FeedResult, FetchError, FetchResult};
use price_viewport_wasm::domain::logging::TimeProvider;
use price_viewport_wasm::domain::market_data::{
    Bar, HistoricalDataSource, LiveChannel, LiveFeed, LiveTick, OHLCV, Price, Symbol, Timeframe,
    Timestamp, Volume,
};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index of the newest bar any fake source knows about.
pub const NEWEST: u64 = 9_999;
pub const MINUTE: u64 = 60_000;

#[derive(Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeProvider for ManualClock {
    fn current_timestamp(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        timestamp.to_string()
    }
}

pub fn bar_at(index: u64, close: f64) -> Bar {
    Bar::new(
        Timestamp::from_millis(index * MINUTE),
        OHLCV::new(
            Price::from(close - 0.5),
            Price::from(close + 1.0),
            Price::from(close - 1.0),
            Price::from(close),
            Volume::from(10.0),
        ),
    )
}

/// The newest `count` bars of a fixed synthetic series ending at [`NEWEST`].
pub fn history(count: usize) -> Vec<Bar> {
    let first = NEWEST + 1 - count as u64;
    (first..=NEWEST).map(|i| bar_at(i, 100.0 + (i % 20) as f64)).collect()
}

pub fn tick_at(index: u64, close: f64) -> LiveTick {
    LiveTick { symbol: spy(), timeframe: Timeframe::OneMinute, bar: bar_at(index, close) }
}

pub fn spy() -> Symbol {
    Symbol::from("SPY")
}

pub fn spy_channel() -> LiveChannel {
    LiveChannel::new(spy(), Timeframe::OneMinute)
}

pub fn config(initial_points: usize, max_points: usize) -> ViewportConfig {
    ViewportConfig { initial_points, max_points, ..ViewportConfig::default() }
}

pub fn fetch_tickets(effects: &[EngineEffect]) -> Vec<FetchTicket> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            EngineEffect::Fetch(ticket) => Some(ticket.clone()),
            _ => None,
        })
        .collect()
}

/// Engine on an 800x400 surface with SPY 1m selected and its initial load applied.
/// `available` bounds how much history the fake backend has.
pub fn loaded_engine(
    config: ViewportConfig,
    available: usize,
) -> (ViewportEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let mut engine = ViewportEngine::new(config, clock.clone()).expect("valid config");
    engine.resize(800.0, 400.0);
    engine.select(spy(), Timeframe::OneMinute);

    let ticket = fetch_tickets(&engine.take_effects()).pop().expect("initial fetch");
    let count = ticket.points.min(available);
    engine.apply_fetch(ticket, Ok(history(count)));
    (engine, clock)
}

/// In-memory historical source recording each request.
pub struct FakeSource {
    pub available: usize,
    pub calls: RefCell<Vec<usize>>,
    pub fail_next: Cell<bool>,
}

impl FakeSource {
    pub fn new(available: usize) -> Self {
        Self { available, calls: RefCell::new(Vec::new()), fail_next: Cell::new(false) }
    }
}

impl HistoricalDataSource for FakeSource {
    async fn fetch(
        &self,
        _symbol: &Symbol,
        _timeframe: Timeframe,
        total_points: usize,
    ) -> FetchResult<Vec<Bar>> {
        self.calls.borrow_mut().push(total_points);
        if self.fail_next.replace(false) {
            return Err(FetchError::Network("offline".to_string()));
        }
        Ok(history(total_points.min(self.available)))
    }
}

#[derive(Default)]
pub struct FakeFeed {
    pub active: Vec<LiveChannel>,
    pub subscribe_calls: usize,
    pub unsubscribe_calls: usize,
    pub refuse_subscribe: bool,
}

impl LiveFeed for FakeFeed {
    fn subscribe(&mut self, channel: &LiveChannel) -> FeedResult<()> {
        self.subscribe_calls += 1;
        if self.refuse_subscribe {
            return Err(FeedError::Subscribe("stream refused".to_string()));
        }
        if !self.active.contains(channel) {
            self.active.push(channel.clone());
        }
        Ok(())
    }

    fn unsubscribe(&mut self, channel: &LiveChannel) -> FeedResult<()> {
        self.unsubscribe_calls += 1;
        self.active.retain(|active| active != channel);
        Ok(())
    }
}
