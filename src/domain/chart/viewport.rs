use super::scale::IndexScale;
use super::value_objects::ViewportWindow;

/// Number of bars visible at `scale` for a configured window size.
pub fn visible_count(window_size: usize, scale: f64) -> usize {
    if !(scale.is_finite() && scale > 0.0) {
        return window_size.max(1);
    }
    ((window_size as f64 / scale).round() as usize).max(1)
}

/// Derives the visible index range from a transformed index mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportCalculator;

impl ViewportCalculator {
    /// Visible window for `visible` bars; `None` when the mapping has no data.
    ///
    /// Out-of-range offsets are clamped. An offset that would push the right edge
    /// past the oldest bar falls back to the oldest full window.
    pub fn compute(index: &IndexScale, visible: usize) -> Option<ViewportWindow> {
        if index.is_empty() {
            return None;
        }
        let rightmost = index.rightmost();
        let visible = visible.max(1);

        let raw_end = (rightmost as f64 - index.pan_points()).round();
        if !raw_end.is_finite() {
            return Some(Self::from_end(rightmost, visible));
        }
        if raw_end < 0.0 {
            return Some(ViewportWindow::new(0, (visible - 1).min(rightmost)));
        }

        let end = (raw_end as usize).min(rightmost);
        Some(Self::from_end(end, visible))
    }

    fn from_end(end: usize, visible: usize) -> ViewportWindow {
        ViewportWindow::new((end + 1).saturating_sub(visible), end)
    }
}
