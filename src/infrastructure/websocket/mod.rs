//! Kline stream DTOs and the browser push feed.

pub mod backoff;
pub mod dto;
#[cfg(target_arch = "wasm32")]
pub mod feed_client;

pub use backoff::ReconnectBackoff;
pub use dto::*;
#[cfg(target_arch = "wasm32")]
pub use feed_client::*;
