//! Chart aggregate: transform, scales, viewport and the controllers deriving from them.

pub mod buffer;
pub mod live;
pub mod prefetch;
pub mod scale;
pub mod ticks;
pub mod value_objects;
pub mod viewport;

pub use buffer::BufferController;
pub use live::{LiveController, LiveEffect, LiveMode};
pub use prefetch::{FetchKind, FetchTicket, PrefetchController};
pub use scale::{CoordinateScales, IndexScale, LruCache, PriceScale, ScaleManager};
pub use value_objects::*;
pub use viewport::{ViewportCalculator, visible_count};
