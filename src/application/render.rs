use crate::domain::chart::{
    BufferRange, IndexScale, PriceDomain, PriceScale, Transform, ViewportWindow,
};
use crate::domain::market_data::Bar;
use serde::Serialize;

/// Everything a sink needs to draw one frame.
///
/// `bars` is the buffered slice; `bars[0]` is the bar at `buffer.buffer_start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCommand<'a> {
    pub window: ViewportWindow,
    pub buffer: BufferRange,
    pub bars: &'a [Bar],
    pub index_scale: IndexScale,
    pub price_scale: PriceScale,
    pub transform: Transform,
    pub price_domain: PriceDomain,
    pub price_ticks: &'a [f64],
    pub is_live: bool,
}

impl RenderCommand<'_> {
    /// Bars of the visible window only.
    pub fn visible_bars(&self) -> &[Bar] {
        let start = self.window.start_index.saturating_sub(self.buffer.buffer_start);
        let end = (self.window.end_index + 1).saturating_sub(self.buffer.buffer_start);
        let end = end.min(self.bars.len());
        self.bars.get(start.min(end)..end).unwrap_or(&[])
    }

    /// Store index of the `i`-th buffered bar.
    pub fn store_index(&self, i: usize) -> usize {
        self.buffer.buffer_start + i
    }
}

/// Consumer of render commands, e.g. a canvas or GPU renderer
pub trait RenderSink {
    fn render(&mut self, command: &RenderCommand<'_>);
}
