//! Infrastructure layer: kline REST/stream adapters, logging sinks and timers.

pub mod http;
pub mod services;
#[cfg(target_arch = "wasm32")]
pub mod timer;
pub mod websocket;
