use super::value_objects::{BufferRange, ViewportWindow};

/// Keeps a wider index range around the visible window and only moves it when
/// the window drifts close to its edges.
#[derive(Debug, Clone)]
pub struct BufferController {
    range: Option<BufferRange>,
    min_buffer_size: usize,
    buffer_fraction: f64,
    edge_margin: usize,
}

impl BufferController {
    pub fn new(min_buffer_size: usize, buffer_fraction: f64, edge_margin: usize) -> Self {
        Self { range: None, min_buffer_size, buffer_fraction, edge_margin }
    }

    pub fn range(&self) -> Option<BufferRange> {
        self.range
    }

    /// Bars kept on each side of a window of `visible` bars.
    pub fn margin(&self, visible: usize) -> usize {
        let fractional = (visible as f64 * self.buffer_fraction).ceil();
        let fractional =
            if fractional.is_finite() && fractional > 0.0 { fractional as usize } else { 0 };
        self.min_buffer_size.max(fractional)
    }

    /// Whether `window` has left the hysteresis band of the current buffer.
    ///
    /// An edge flush with index 0 or the newest bar cannot move further, so only
    /// the opposite edge counts there.
    pub fn needs_rebuffer(&self, window: &ViewportWindow, len: usize) -> bool {
        let Some(range) = self.range else {
            return true;
        };
        let last = len.saturating_sub(1);
        if range.buffer_end > last || !range.contains_window(window) {
            return true;
        }
        let near_start =
            range.buffer_start != 0 && window.start_index < range.buffer_start + self.edge_margin;
        let near_end =
            range.buffer_end != last && window.end_index + self.edge_margin > range.buffer_end;
        near_start || near_end
    }

    /// Recompute the buffer if needed. Returns `true` when it moved.
    pub fn update(&mut self, window: &ViewportWindow, len: usize) -> bool {
        if len == 0 {
            let had_range = self.range.is_some();
            self.range = None;
            return had_range;
        }
        if !self.needs_rebuffer(window, len) {
            return false;
        }
        let margin = self.margin(window.len());
        let last = len - 1;
        self.range = Some(BufferRange::new(
            window.start_index.saturating_sub(margin),
            window.end_index.saturating_add(margin).min(last),
        ));
        true
    }

    /// Forget the buffer, e.g. after the store was replaced or shifted.
    pub fn invalidate(&mut self) {
        self.range = None;
    }
}
