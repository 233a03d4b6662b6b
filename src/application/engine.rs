//! Per-session viewport engine.
//!
//! Holds the transform, the bar store and every derived controller, and runs the
//! synchronous recompute cascade (scales, viewport, buffer, prefetch, live mode)
//! after each input. Asynchronous work is not performed here: the engine queues
//! [`EngineEffect`]s that a driver executes and feeds back through
//! [`ViewportEngine::apply_fetch`] and the feed callbacks.

use super::config::ViewportConfig;
use super::debounce::Debouncer;
use super::render::{RenderCommand, RenderSink};
use crate::domain::chart::{
    BufferController, BufferRange, CoordinateScales, FetchTicket, LiveController, LiveEffect,
    LiveMode, PrefetchController, PriceDomain, ScaleManager, SurfaceSize, Transform,
    ViewportCalculator, ViewportWindow, visible_count,
};
use crate::domain::errors::{ConfigError, EngineError, FeedError, FetchResult};
use crate::domain::logging::{LogComponent, TimeProvider};
use crate::domain::market_data::{
    Bar, BarStore, LiveChannel, LiveTick, MergeOutcome, Symbol, Timeframe,
};
use crate::{log_debug, log_info, log_trace, log_warn};
use serde::Serialize;
use std::sync::Arc;

const COMPONENT: LogComponent = LogComponent::Application("ViewportEngine");

/// Asynchronous work requested by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEffect {
    Fetch(FetchTicket),
    Subscribe(LiveChannel),
    Unsubscribe(LiveChannel),
}

impl From<LiveEffect> for EngineEffect {
    fn from(effect: LiveEffect) -> Self {
        match effect {
            LiveEffect::Subscribe(channel) => Self::Subscribe(channel),
            LiveEffect::Unsubscribe(channel) => Self::Unsubscribe(channel),
        }
    }
}

/// Observable status for the surrounding UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub is_live: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    pub loaded_count: usize,
}

pub struct ViewportEngine {
    config: ViewportConfig,
    clock: Arc<dyn TimeProvider>,
    surface: SurfaceSize,
    transform: Transform,
    store: Option<BarStore>,
    channel: Option<LiveChannel>,
    scales: ScaleManager,
    current: CoordinateScales,
    window: Option<ViewportWindow>,
    buffer: BufferController,
    prefetch: PrefetchController,
    live: LiveController,
    price_domain: Option<PriceDomain>,
    price_ticks: Vec<f64>,
    settle: Debouncer,
    needs_render: bool,
    effects: Vec<EngineEffect>,
}

impl ViewportEngine {
    pub fn new(config: ViewportConfig, clock: Arc<dyn TimeProvider>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            surface: SurfaceSize::default(),
            transform: Transform::identity(),
            store: None,
            channel: None,
            scales: ScaleManager::new(
                config.window_size,
                config.price_padding,
                config.cache_capacity,
            ),
            current: CoordinateScales::not_ready(),
            window: None,
            buffer: BufferController::new(
                config.min_buffer_size,
                config.buffer_fraction,
                config.edge_margin,
            ),
            prefetch: PrefetchController::new(
                config.initial_points,
                config.buffer_increment,
                config.max_points,
                config.edge_margin,
            ),
            live: LiveController::new(config.edge_threshold),
            price_domain: None,
            price_ticks: Vec::new(),
            settle: Debouncer::new(config.debounce_ms),
            needs_render: false,
            effects: Vec::new(),
            clock,
            config,
        })
    }

    // ---- Session lifecycle ----

    /// Switch to a new symbol/timeframe: fresh store, identity transform, unlocked
    /// price domain, new fetch epoch and a re-evaluated live subscription.
    pub fn select(&mut self, symbol: Symbol, timeframe: Timeframe) {
        log_info!(COMPONENT, "Selecting {} {}", symbol, timeframe);
        self.release();

        self.store = Some(BarStore::new(symbol.clone(), timeframe, self.config.max_points));
        self.channel = Some(LiveChannel::new(symbol.clone(), timeframe));
        let ticket = self.prefetch.begin_session(symbol, timeframe);
        self.effects.push(EngineEffect::Fetch(ticket));
        self.recompute();
    }

    /// Cancel pending work and drop the session. Outstanding results are ignored.
    pub fn teardown(&mut self) {
        log_info!(COMPONENT, "Tearing down session");
        self.release();
        self.prefetch.reset();
        self.store = None;
        self.channel = None;
        self.needs_render = false;
    }

    fn release(&mut self) {
        self.settle.cancel();
        if let Some(effect) = self.live.reset() {
            self.effects.push(effect.into());
        }
        self.scales.clear();
        self.transform = Transform::identity();
        self.price_domain = None;
        self.price_ticks.clear();
        self.buffer.invalidate();
        self.window = None;
        self.current = CoordinateScales::not_ready();
    }

    // ---- User actions ----

    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface = SurfaceSize::new(width, height);
        self.transform.offset_x = self.transform.offset_x.clamp(0.0, self.max_offset_x());
        self.needs_render = true;
        self.recompute();
    }

    /// Pan by a pointer delta. Positive `dx` drags the series right, revealing
    /// older bars.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.transform.offset_x = (self.transform.offset_x + dx).clamp(0.0, self.max_offset_x());
        self.transform.offset_y += dy;
        self.after_gesture();
    }

    /// Set the zoom factor. The bar at the right edge of the view stays in place.
    pub fn zoom_to(&mut self, scale: f64) {
        if !scale.is_finite() {
            return;
        }
        let scale = self.config.clamp_scale(scale);
        let ratio = scale / self.transform.scale;
        self.transform.scale = scale;
        self.transform.offset_x = (self.transform.offset_x * ratio).clamp(0.0, self.max_offset_x());
        self.after_gesture();
    }

    /// Back to identity and relock the price domain on the newest bars.
    pub fn reset_transform(&mut self) {
        self.transform = Transform::identity();
        self.relock();
    }

    /// Scroll to the newest bar keeping the zoom level, and relock the price domain.
    pub fn jump_to_newest(&mut self) {
        self.transform.offset_x = 0.0;
        self.transform.offset_y = 0.0;
        self.relock();
    }

    /// Clear a fetch error and repeat the failed load.
    pub fn retry_prefetch(&mut self) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        match self.prefetch.retry(store.symbol(), store.timeframe()) {
            Some(ticket) => {
                log_info!(COMPONENT, "Retrying fetch of {} points", ticket.points);
                self.effects.push(EngineEffect::Fetch(ticket));
                true
            }
            None => false,
        }
    }

    fn relock(&mut self) {
        self.settle.cancel();
        self.price_domain = None;
        self.needs_render = true;
        self.recompute();
    }

    fn after_gesture(&mut self) {
        self.settle.schedule(self.clock.current_timestamp());
        self.recompute();
    }

    // ---- Collaborator callbacks ----

    /// Apply the outcome of a historical fetch. Results for a previous session or
    /// a superseded request are discarded.
    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: FetchResult<Vec<Bar>>) {
        if !self.prefetch.is_current(&ticket) {
            log_debug!(
                COMPONENT,
                "Discarding stale result for {} {} (epoch {}, current {})",
                ticket.symbol,
                ticket.timeframe,
                ticket.epoch,
                self.prefetch.epoch()
            );
            return;
        }
        let Some(store) = self.store.as_mut() else {
            return;
        };

        match result {
            Ok(bars) => {
                let returned = bars.len();
                let report = store.replace(bars);
                self.prefetch.complete(&ticket, returned, report.kept);
                self.buffer.invalidate();
                self.needs_render = true;
                log_info!(
                    COMPONENT,
                    "Loaded {} of {} requested bars ({} malformed, {} duplicates)",
                    report.kept,
                    ticket.points,
                    report.dropped_malformed,
                    report.dropped_duplicates
                );
            }
            Err(e) => {
                log_warn!(COMPONENT, "Fetch of {} points failed: {}", ticket.points, e);
                self.prefetch.fail(e);
            }
        }
        self.recompute();
    }

    /// Merge a live bar from the push feed.
    pub fn apply_tick(&mut self, tick: LiveTick) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if !self.live.accepts(store, &tick) {
            log_trace!(COMPONENT, "Ignoring tick for {} {}", tick.symbol, tick.timeframe);
            return;
        }

        let outcome = match self.live.merge(store, &tick) {
            Ok(outcome) => outcome,
            Err(e) => {
                log_warn!(COMPONENT, "Rejected live bar: {}", e);
                return;
            }
        };
        let last_index = store.len() - 1;
        if let MergeOutcome::Appended { evicted } = outcome {
            self.follow_append(evicted);
        }

        if self.buffer.range().is_some_and(|range| range.buffer_end + 1 >= last_index) {
            self.needs_render = true;
        }
        self.recompute();
    }

    /// Live mode follows the newest bar. Otherwise the pixel offset grows by one
    /// band so the visible bars stay where they are.
    fn follow_append(&mut self, evicted: bool) {
        match self.live.mode() {
            LiveMode::Live => self.transform.offset_x = 0.0,
            LiveMode::Historical => self.transform.offset_x += self.scaled_band(),
        }
        if evicted {
            self.buffer.invalidate();
        }
    }

    pub fn feed_disconnected(&mut self, error: FeedError) {
        log_warn!(COMPONENT, "Live feed lost: {}", error);
        self.live.disconnected();
    }

    pub fn feed_reconnected(&mut self) {
        log_info!(COMPONENT, "Live feed reconnected");
        if let Some(effect) = self.live.reconnected() {
            self.effects.push(effect.into());
        }
    }

    // ---- Debounced work ----

    /// Run settled work once the gesture debounce has elapsed. Returns `true`
    /// when a full re-render is due.
    pub fn poll(&mut self) -> bool {
        if !self.settle.poll(self.clock.current_timestamp()) {
            return false;
        }
        log_trace!(COMPONENT, "Gesture burst settled");
        self.refresh_ticks();
        self.needs_render = true;
        true
    }

    /// Milliseconds until the pending debounce fires, if any.
    pub fn settle_in(&self) -> Option<u64> {
        let deadline = self.settle.deadline()?;
        Some(deadline.saturating_sub(self.clock.current_timestamp()))
    }

    // ---- Outputs ----

    /// Current render command, or `None` while not ready.
    pub fn frame(&self) -> Option<RenderCommand<'_>> {
        let store = self.store.as_ref()?;
        let window = self.window?;
        let buffer = self.buffer.range()?;
        let price_domain = self.price_domain?;
        if !self.current.is_ready() {
            return None;
        }
        Some(RenderCommand {
            window,
            buffer,
            bars: store.slice(buffer.buffer_start, buffer.buffer_end),
            index_scale: self.current.index,
            price_scale: self.current.price,
            transform: self.transform,
            price_domain,
            price_ticks: &self.price_ticks,
            is_live: self.live.is_live(),
        })
    }

    /// Hand the current frame to `sink`. Returns `false` while not ready.
    pub fn render(&mut self, sink: &mut impl RenderSink) -> bool {
        let rendered = match self.frame() {
            Some(command) => {
                sink.render(&command);
                true
            }
            None => false,
        };
        if rendered {
            self.needs_render = false;
        }
        rendered
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            is_live: self.live.is_live(),
            is_loading: self.prefetch.is_loading(),
            error: self.prefetch.error().map(|e| EngineError::from(e.clone()).to_string()),
            loaded_count: self.prefetch.loaded_count(),
        }
    }

    pub fn take_effects(&mut self) -> Vec<EngineEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    pub fn store(&self) -> Option<&BarStore> {
        self.store.as_ref()
    }

    pub fn window(&self) -> Option<ViewportWindow> {
        self.window
    }

    pub fn buffer_range(&self) -> Option<BufferRange> {
        self.buffer.range()
    }

    pub fn scales(&self) -> &CoordinateScales {
        &self.current
    }

    pub fn price_domain(&self) -> Option<PriceDomain> {
        self.price_domain
    }

    pub fn price_ticks(&self) -> &[f64] {
        &self.price_ticks
    }

    pub fn live_mode(&self) -> LiveMode {
        self.live.mode()
    }

    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.prefetch.in_flight()
    }

    pub fn requested_points(&self) -> usize {
        self.prefetch.requested_points()
    }

    pub fn is_history_exhausted(&self) -> bool {
        self.prefetch.is_exhausted()
    }

    pub fn cached_scale_entries(&self) -> usize {
        self.scales.cached_entries()
    }

    // ---- Cascade ----

    fn band_width(&self) -> f64 {
        if self.surface.is_empty() {
            return 0.0;
        }
        self.surface.width / self.config.window_size as f64
    }

    fn scaled_band(&self) -> f64 {
        self.band_width() * self.transform.scale
    }

    fn max_offset_x(&self) -> f64 {
        let len = self.store.as_ref().map_or(0, BarStore::len);
        (len.saturating_sub(1) as f64 * self.scaled_band()).max(0.0)
    }

    fn refresh_ticks(&mut self) {
        if !self.current.is_ready() || self.surface.is_empty() {
            return;
        }
        let price = self.current.price;
        let visible = PriceDomain::new(price.to_price(self.surface.height), price.to_price(0.0));
        self.price_ticks = self.scales.price_ticks(visible, self.config.price_tick_count);
    }

    /// Scale -> viewport -> buffer -> prefetch -> live mode.
    fn recompute(&mut self) {
        let (Some(store), Some(channel)) = (self.store.as_ref(), self.channel.as_ref()) else {
            self.window = None;
            return;
        };

        let visible = visible_count(self.config.window_size, self.transform.scale);
        let scales =
            self.scales.compute(store, self.surface, &self.transform, self.price_domain, visible);
        let window = match ViewportCalculator::compute(&scales.index, visible) {
            Some(window) if scales.is_ready() => window,
            _ => {
                self.current = scales;
                self.window = None;
                return;
            }
        };
        self.current = scales;

        let relocked = match scales.domain_to_lock {
            Some(domain) => {
                log_debug!(COMPONENT, "Locking price domain {:.4}..{:.4}", domain.min, domain.max);
                self.price_domain = Some(domain);
                true
            }
            None => false,
        };

        if self.buffer.update(&window, store.len()) {
            self.needs_render = true;
            log_trace!(COMPONENT, "Rebuffered around {}..{}", window.start_index, window.end_index);
        }

        let prefetch = self.prefetch.maybe_prefetch(&window, store.symbol(), store.timeframe());
        if let Some(ticket) = prefetch {
            log_info!(
                COMPONENT,
                "Prefetching {} points for {} {}",
                ticket.points,
                ticket.symbol,
                ticket.timeframe
            );
            self.effects.push(EngineEffect::Fetch(ticket));
        }

        if let Some(effect) = self.live.evaluate(&window, store.len(), channel) {
            log_info!(COMPONENT, "Live mode is now {:?}", self.live.mode());
            self.effects.push(effect.into());
        }

        self.window = Some(window);
        if relocked {
            self.refresh_ticks();
            self.needs_render = true;
        }
    }
}
