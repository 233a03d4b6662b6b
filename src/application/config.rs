use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Tuning of one viewport session. Counts are in bars unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Bars visible at scale 1
    pub window_size: usize,
    pub min_buffer_size: usize,
    pub buffer_fraction: f64,
    /// Buffer hysteresis and prefetch trigger distance
    pub edge_margin: usize,
    /// Live-mode distance from the newest bar
    pub edge_threshold: usize,
    pub initial_points: usize,
    pub buffer_increment: usize,
    /// Hard cap of bars per store
    pub max_points: usize,
    pub min_scale: f64,
    pub max_scale: f64,
    pub price_padding: f64,
    pub price_tick_count: usize,
    /// Settle delay after a burst of gestures, milliseconds
    pub debounce_ms: u64,
    pub cache_capacity: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            window_size: 80,
            min_buffer_size: 50,
            buffer_fraction: 0.5,
            edge_margin: 10,
            edge_threshold: 5,
            initial_points: 200,
            buffer_increment: 100,
            max_points: 500,
            min_scale: 0.25,
            max_scale: 8.0,
            price_padding: 0.05,
            price_tick_count: 6,
            debounce_ms: 150,
            cache_capacity: 64,
        }
    }
}

impl ViewportConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::InvalidParameter(msg.to_string()));

        if self.window_size == 0 {
            return invalid("window_size must be positive");
        }
        if self.max_points == 0 {
            return invalid("max_points must be positive");
        }
        if self.initial_points == 0 || self.initial_points > self.max_points {
            return invalid("initial_points must be in 1..=max_points");
        }
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return invalid("min_scale must be positive");
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            return invalid("max_scale must not be below min_scale");
        }
        if !(self.buffer_fraction.is_finite() && self.buffer_fraction >= 0.0) {
            return invalid("buffer_fraction must be a non-negative number");
        }
        if !(self.price_padding.is_finite() && self.price_padding >= 0.0) {
            return invalid("price_padding must be a non-negative number");
        }
        if self.cache_capacity == 0 {
            return invalid("cache_capacity must be positive");
        }
        Ok(())
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return 1.0_f64.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}
