//! Streaming price-chart viewport engine.
//!
//! Pan and zoom over a candlestick series of unbounded length while only a
//! bounded buffer is prepared for drawing, older history is spliced in as the
//! user nears the oldest loaded bar, and live bars merge at the right edge.

pub mod application;
pub mod domain;
pub mod infrastructure;
#[cfg(target_arch = "wasm32")]
pub mod presentation;

/// Install panic hook, console logger and browser clock.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn initialize() {
    use crate::domain::logging::{LogComponent, init_logger, init_time_provider};

    console_error_panic_hook::set_once();
    let logger = if cfg!(debug_assertions) {
        infrastructure::services::ConsoleLogger::new_development()
    } else {
        infrastructure::services::ConsoleLogger::new_production()
    };
    init_logger(Box::new(logger));
    init_time_provider(Box::new(infrastructure::services::BrowserTimeProvider::new()));

    crate::log_info!(LogComponent::Presentation("Initialize"), "Viewport engine initialized");
}
