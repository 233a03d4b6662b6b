//! Async driver executing engine effects against the collaborators.
//!
//! The engine lives behind `Rc<RefCell<_>>` and is never borrowed across an
//! `.await`, so user actions and feed events may interleave with a pending fetch
//! on the single-threaded event loop.

use super::engine::{EngineEffect, ViewportEngine};
use super::render::RenderSink;
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{FeedEvent, HistoricalDataSource, LiveFeed, Symbol, Timeframe};
use crate::{log_debug, log_warn};
use futures::{Stream, StreamExt};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

const COMPONENT: LogComponent = LogComponent::Application("ChartSession");

pub struct ChartSession<S, F> {
    engine: Rc<RefCell<ViewportEngine>>,
    source: Rc<S>,
    feed: Rc<RefCell<F>>,
}

impl<S, F> Clone for ChartSession<S, F> {
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            source: Rc::clone(&self.source),
            feed: Rc::clone(&self.feed),
        }
    }
}

impl<S: HistoricalDataSource, F: LiveFeed> ChartSession<S, F> {
    pub fn new(engine: ViewportEngine, source: S, feed: F) -> Self {
        Self {
            engine: Rc::new(RefCell::new(engine)),
            source: Rc::new(source),
            feed: Rc::new(RefCell::new(feed)),
        }
    }

    pub fn engine(&self) -> Ref<'_, ViewportEngine> {
        self.engine.borrow()
    }

    pub fn engine_mut(&self) -> RefMut<'_, ViewportEngine> {
        self.engine.borrow_mut()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn feed(&self) -> Ref<'_, F> {
        self.feed.borrow()
    }

    pub async fn select(&self, symbol: Symbol, timeframe: Timeframe) {
        self.engine.borrow_mut().select(symbol, timeframe);
        self.drive().await;
    }

    /// Execute queued effects until the engine stops producing new ones.
    /// Returns the number of effects executed.
    pub async fn drive(&self) -> usize {
        let mut executed = 0;
        loop {
            let effects = self.engine.borrow_mut().take_effects();
            if effects.is_empty() {
                return executed;
            }
            for effect in effects {
                self.execute(effect).await;
                executed += 1;
            }
        }
    }

    async fn execute(&self, effect: EngineEffect) {
        match effect {
            EngineEffect::Fetch(ticket) => {
                log_debug!(
                    COMPONENT,
                    "Fetching {} points for {} {}",
                    ticket.points,
                    ticket.symbol,
                    ticket.timeframe
                );
                let result =
                    self.source.fetch(&ticket.symbol, ticket.timeframe, ticket.points).await;
                self.engine.borrow_mut().apply_fetch(ticket, result);
            }
            EngineEffect::Subscribe(channel) => {
                let result = self.feed.borrow_mut().subscribe(&channel);
                if let Err(e) = result {
                    self.engine.borrow_mut().feed_disconnected(e);
                }
            }
            EngineEffect::Unsubscribe(channel) => {
                let result = self.feed.borrow_mut().unsubscribe(&channel);
                if let Err(e) = result {
                    log_warn!(COMPONENT, "Unsubscribe from {} failed: {}", channel, e);
                }
            }
        }
    }

    pub async fn handle_feed_event(&self, event: FeedEvent) {
        {
            let mut engine = self.engine.borrow_mut();
            match event {
                FeedEvent::Tick(tick) => engine.apply_tick(tick),
                FeedEvent::Disconnected(e) => engine.feed_disconnected(e),
                FeedEvent::Reconnected => engine.feed_reconnected(),
            }
        }
        self.drive().await;
    }

    /// Consume feed events until the stream ends.
    pub async fn pump_feed<E>(&self, mut events: E) -> usize
    where
        E: Stream<Item = FeedEvent> + Unpin,
    {
        let mut handled = 0;
        while let Some(event) = events.next().await {
            self.handle_feed_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Render if the engine has pending visual changes.
    pub fn flush_render(&self, sink: &mut impl RenderSink) -> bool {
        let mut engine = self.engine.borrow_mut();
        engine.needs_render() && engine.render(sink)
    }

    /// Let settled debounced work run, then render if needed.
    pub fn tick(&self, sink: &mut impl RenderSink) -> bool {
        self.engine.borrow_mut().poll();
        self.flush_render(sink)
    }

    /// Tear the session down and release the live subscription.
    pub async fn teardown(&self) {
        self.engine.borrow_mut().teardown();
        self.drive().await;
    }
}
