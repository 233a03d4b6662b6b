//! Browser push feed over the kline stream endpoint.

use super::backoff::ReconnectBackoff;
use super::dto::parse_stream_message;
use crate::domain::errors::{FeedError, FeedResult};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::{FeedEvent, LiveChannel, LiveFeed};
use crate::{log_debug, log_error, log_info, log_warn};
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use futures::future::{AbortHandle, abortable};
use gloo_net::websocket::Message;
use gloo_net::websocket::futures::WebSocket;
use gloo_timers::future::sleep;
use std::collections::HashMap;

pub const DEFAULT_STREAM_BASE_URL: &str = "wss://stream.binance.com:9443/ws";

const COMPONENT: LogComponent = LogComponent::Infrastructure("KlineStream");

/// One websocket per subscribed channel, each reconnecting on its own.
/// Events are forwarded to a single receiver.
pub struct KlineStreamFeed {
    base_url: String,
    events: UnboundedSender<FeedEvent>,
    streams: HashMap<LiveChannel, AbortHandle>,
}

impl KlineStreamFeed {
    pub fn new(events: UnboundedSender<FeedEvent>) -> Self {
        Self { base_url: DEFAULT_STREAM_BASE_URL.to_string(), events, streams: HashMap::new() }
    }

    /// Feed plus the receiving end of its event channel.
    pub fn channel() -> (Self, UnboundedReceiver<FeedEvent>) {
        let (tx, rx) = unbounded();
        (Self::new(tx), rx)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

impl LiveFeed for KlineStreamFeed {
    fn subscribe(&mut self, channel: &LiveChannel) -> FeedResult<()> {
        if self.events.is_closed() {
            return Err(FeedError::Subscribe("event receiver dropped".to_string()));
        }
        if self.streams.contains_key(channel) {
            return Ok(());
        }
        let url = format!("{}/{}", self.base_url, channel);
        let (task, handle) = abortable(run_stream(url, channel.clone(), self.events.clone()));
        wasm_bindgen_futures::spawn_local(async move {
            let _ = task.await;
        });
        self.streams.insert(channel.clone(), handle);
        log_info!(COMPONENT, "Subscribed to {}", channel);
        Ok(())
    }

    fn unsubscribe(&mut self, channel: &LiveChannel) -> FeedResult<()> {
        if let Some(handle) = self.streams.remove(channel) {
            handle.abort();
            log_info!(COMPONENT, "Unsubscribed from {}", channel);
        }
        Ok(())
    }
}

impl Drop for KlineStreamFeed {
    fn drop(&mut self) {
        for (_, handle) in self.streams.drain() {
            handle.abort();
        }
    }
}

async fn run_stream(url: String, channel: LiveChannel, events: UnboundedSender<FeedEvent>) {
    let mut backoff = ReconnectBackoff::default();
    let mut connected_before = false;

    loop {
        match WebSocket::open(&url) {
            Ok(mut ws) => {
                if connected_before && events.unbounded_send(FeedEvent::Reconnected).is_err() {
                    return;
                }
                connected_before = true;
                let mut received_any = false;

                while let Some(msg) = ws.next().await {
                    match msg {
                        Ok(Message::Text(text)) => match parse_stream_message(&text) {
                            Ok(tick) => {
                                received_any = true;
                                if events.unbounded_send(FeedEvent::Tick(tick)).is_err() {
                                    return;
                                }
                            }
                            Err(e) => {
                                log_debug!(COMPONENT, "Skipping frame on {}: {}", channel, e);
                            }
                        },
                        Ok(Message::Bytes(_)) => {}
                        Err(e) => {
                            log_error!(COMPONENT, "Stream {} failed: {}", channel, e);
                            break;
                        }
                    }
                }
                if received_any {
                    backoff.reset();
                }

                let lost = FeedError::Disconnected(format!("{} closed", channel));
                if events.unbounded_send(FeedEvent::Disconnected(lost)).is_err() {
                    return;
                }
            }
            Err(e) => {
                log_error!(COMPONENT, "Cannot open {}: {}", url, e);
            }
        }

        let delay = backoff.next_delay();
        log_warn!(COMPONENT, "Reconnecting {} in {}s", channel, delay.as_secs());
        sleep(delay).await;
    }
}
