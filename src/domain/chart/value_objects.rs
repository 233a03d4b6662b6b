use serde::{Deserialize, Serialize};

/// Value Object - user pan/zoom state.
///
/// `offset_x` is measured in pixels from the right edge of the series: zero keeps
/// the newest bar flush right, positive values pan into history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale: 1.0 }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Value Object - drawing surface dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Value Object - locked vertical price range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDomain {
    pub min: f64,
    pub max: f64,
}

impl PriceDomain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Expand a raw low/high range by `padding` of its span on both sides.
    /// A flat range is widened around its value so the span is never zero.
    pub fn padded(low: f64, high: f64, padding: f64) -> Self {
        let span = high - low;
        let pad = if span > 0.0 {
            span * padding
        } else if high.abs() > 0.0 {
            high.abs() * padding.max(f64::EPSILON)
        } else {
            1.0
        };
        Self { min: low - pad, max: high + pad }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

/// Value Object - inclusive index range of visible bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportWindow {
    pub start_index: usize,
    pub end_index: usize,
}

impl ViewportWindow {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self { start_index, end_index }
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }
}

/// Value Object - inclusive index range prepared for drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferRange {
    pub buffer_start: usize,
    pub buffer_end: usize,
}

impl BufferRange {
    pub fn new(buffer_start: usize, buffer_end: usize) -> Self {
        Self { buffer_start, buffer_end }
    }

    pub fn len(&self) -> usize {
        self.buffer_end - self.buffer_start + 1
    }

    pub fn contains_window(&self, window: &ViewportWindow) -> bool {
        self.buffer_start <= window.start_index && window.end_index <= self.buffer_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_domain_is_symmetric() {
        let domain = PriceDomain::padded(100.0, 200.0, 0.05);
        assert!((domain.min - 95.0).abs() < 1e-9);
        assert!((domain.max - 205.0).abs() < 1e-9);
    }

    #[test]
    fn flat_range_still_has_span() {
        assert!(PriceDomain::padded(50.0, 50.0, 0.05).span() > 0.0);
        assert!(PriceDomain::padded(0.0, 0.0, 0.05).span() > 0.0);
    }

    #[test]
    fn buffer_contains_window() {
        let buffer = BufferRange::new(10, 100);
        assert!(buffer.contains_window(&ViewportWindow::new(10, 100)));
        assert!(!buffer.contains_window(&ViewportWindow::new(9, 50)));
        assert_eq!(buffer.len(), 91);
    }
}
