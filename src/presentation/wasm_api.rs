//! `wasm_bindgen` facade over one chart session.
//!
//! The render callback receives each frame as a JSON string. It must not call
//! back into the viewport synchronously.

use crate::application::{ChartSession, RenderCommand, RenderSink, ViewportConfig, ViewportEngine};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{Symbol, Timeframe};
use crate::infrastructure::http::KlineRestSource;
use crate::infrastructure::services::BrowserTimeProvider;
use crate::infrastructure::timer::SettleTimer;
use crate::infrastructure::websocket::KlineStreamFeed;
use crate::{log_error, log_info};
use futures::StreamExt;
use futures::future::{AbortHandle, abortable};
use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

type Session = ChartSession<KlineRestSource, KlineStreamFeed>;

const COMPONENT: LogComponent = LogComponent::Presentation("ChartViewport");

/// Forwards frames to a JavaScript function
struct JsRenderSink {
    callback: js_sys::Function,
}

impl RenderSink for JsRenderSink {
    fn render(&mut self, command: &RenderCommand<'_>) {
        let json = match serde_json::to_string(command) {
            Ok(json) => json,
            Err(e) => {
                log_error!(COMPONENT, "Cannot serialize frame: {}", e);
                return;
            }
        };
        if let Err(e) = self.callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log_error!(COMPONENT, "Render callback failed: {:?}", e);
        }
    }
}

#[wasm_bindgen]
pub struct ChartViewport {
    session: Session,
    sink: Rc<RefCell<JsRenderSink>>,
    timer: Rc<RefCell<SettleTimer>>,
    feed_pump: AbortHandle,
}

#[wasm_bindgen]
impl ChartViewport {
    /// Create a viewport. `config_json` overrides defaults field by field.
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_render: js_sys::Function,
        config_json: Option<String>,
    ) -> Result<ChartViewport, JsValue> {
        let config = match config_json {
            Some(json) => ViewportConfig::from_json(&json).map_err(to_js)?,
            None => ViewportConfig::default(),
        };
        let engine =
            ViewportEngine::new(config, Arc::new(BrowserTimeProvider::new())).map_err(to_js)?;
        let (feed, mut events) = KlineStreamFeed::channel();
        let session = ChartSession::new(engine, KlineRestSource::new(), feed);
        let sink = Rc::new(RefCell::new(JsRenderSink { callback: on_render }));

        let pump = {
            let session = session.clone();
            let sink = Rc::clone(&sink);
            async move {
                while let Some(event) = events.next().await {
                    session.handle_feed_event(event).await;
                    session.flush_render(&mut *sink.borrow_mut());
                }
            }
        };
        let (pump, feed_pump) = abortable(pump);
        wasm_bindgen_futures::spawn_local(async move {
            let _ = pump.await;
        });

        log_info!(COMPONENT, "Chart viewport created");
        Ok(Self { session, sink, timer: Rc::new(RefCell::new(SettleTimer::new())), feed_pump })
    }

    /// Load a symbol/timeframe, e.g. `("BTCUSDT", "1m")`.
    pub fn select(&self, symbol: String, timeframe: String) -> Result<(), JsValue> {
        let symbol = Symbol::new(symbol).map_err(|e| JsValue::from_str(&e))?;
        let timeframe = Timeframe::from_str(&timeframe)
            .map_err(|_| JsValue::from_str(&format!("Unknown timeframe: {timeframe}")))?;
        self.timer.borrow_mut().cancel();
        self.session.engine_mut().select(symbol, timeframe);
        self.spawn_drive();
        Ok(())
    }

    pub fn resize(&self, width: f64, height: f64) {
        self.session.engine_mut().resize(width, height);
        self.spawn_drive();
    }

    #[wasm_bindgen(js_name = panBy)]
    pub fn pan_by(&self, dx: f64, dy: f64) {
        self.session.engine_mut().pan_by(dx, dy);
        self.after_gesture();
    }

    #[wasm_bindgen(js_name = zoomTo)]
    pub fn zoom_to(&self, scale: f64) {
        self.session.engine_mut().zoom_to(scale);
        self.after_gesture();
    }

    #[wasm_bindgen(js_name = resetTransform)]
    pub fn reset_transform(&self) {
        self.timer.borrow_mut().cancel();
        self.session.engine_mut().reset_transform();
        self.spawn_drive();
    }

    #[wasm_bindgen(js_name = jumpToNewest)]
    pub fn jump_to_newest(&self) {
        self.timer.borrow_mut().cancel();
        self.session.engine_mut().jump_to_newest();
        self.spawn_drive();
    }

    #[wasm_bindgen(js_name = retryPrefetch)]
    pub fn retry_prefetch(&self) -> bool {
        let retried = self.session.engine_mut().retry_prefetch();
        self.spawn_drive();
        retried
    }

    /// `{isLive, isLoading, error, loadedCount}` as JSON.
    pub fn status(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.engine().status())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Cancel timers, stop the feed and ignore any outstanding fetch.
    pub fn teardown(&self) {
        self.timer.borrow_mut().cancel();
        self.feed_pump.abort();
        let session = self.session.clone();
        wasm_bindgen_futures::spawn_local(async move {
            session.teardown().await;
        });
    }
}

impl ChartViewport {
    fn spawn_drive(&self) {
        let session = self.session.clone();
        let sink = Rc::clone(&self.sink);
        wasm_bindgen_futures::spawn_local(async move {
            session.drive().await;
            session.flush_render(&mut *sink.borrow_mut());
        });
    }

    /// Gestures always redraw with the new transform, even without a rebuffer.
    fn after_gesture(&self) {
        self.session.engine_mut().render(&mut *self.sink.borrow_mut());
        self.spawn_drive();

        let Some(delay) = self.session.engine().settle_in() else {
            return;
        };
        let session = self.session.clone();
        let sink = Rc::clone(&self.sink);
        self.timer.borrow_mut().schedule(delay, move || {
            session.tick(&mut *sink.borrow_mut());
        });
    }
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}
