//! Market data aggregate: value objects, the bar store and collaborator contracts.

pub mod entities;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use repositories::*;
pub use value_objects::*;
