//! Application layer: the per-session engine and its async driver.

pub mod config;
pub mod debounce;
pub mod engine;
pub mod render;
pub mod session;

pub use config::ViewportConfig;
pub use debounce::Debouncer;
pub use engine::{EngineEffect, EngineStatus, ViewportEngine};
pub use render::{RenderCommand, RenderSink};
pub use session::ChartSession;
