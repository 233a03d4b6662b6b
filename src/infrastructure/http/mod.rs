//! HTTP adapters.

pub mod kline_rest_client;

pub use kline_rest_client::*;
