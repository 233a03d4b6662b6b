//! Coordinate scale manager.
//!
//! Maps bar indices and prices to surface pixels. The index mapping is anchored
//! at the right edge: the newest bar always sits flush right at zero offset, and
//! the total base width is `band_width * len`.

use super::ticks::nice_ticks;
use super::value_objects::{PriceDomain, SurfaceSize, Transform};
use crate::domain::market_data::BarStore;
use indexmap::IndexMap;
use serde::Serialize;
use std::hash::Hash;

/// Index <-> x mapping
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexScale {
    len: usize,
    width: f64,
    band_width: f64,
    offset: f64,
}

impl IndexScale {
    /// Mapping that returns its input unchanged.
    pub fn identity() -> Self {
        Self { len: 0, width: 0.0, band_width: 0.0, offset: 0.0 }
    }

    /// Untransformed mapping spanning the whole store.
    pub fn base(len: usize, width: f64, window_size: usize) -> Self {
        let band_width = if window_size == 0 { 0.0 } else { width / window_size as f64 };
        Self { len, width, band_width, offset: 0.0 }
    }

    /// Apply zoom and pan on top of a base mapping.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self { band_width: self.band_width * transform.scale, offset: transform.offset_x, ..*self }
    }

    pub fn is_identity(&self) -> bool {
        self.len == 0 || !(self.band_width > 0.0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn rightmost(&self) -> usize {
        self.len.saturating_sub(1)
    }

    pub fn band_width(&self) -> f64 {
        self.band_width
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn total_width(&self) -> f64 {
        self.band_width * self.len as f64
    }

    /// Pixel offset expressed in data points.
    pub fn pan_points(&self) -> f64 {
        if self.is_identity() {
            return 0.0;
        }
        self.offset / self.band_width
    }

    /// Center x of the bar at `index`.
    pub fn to_px(&self, index: f64) -> f64 {
        if self.is_identity() {
            return index;
        }
        let from_right = self.rightmost() as f64 - index;
        self.width - (from_right + 0.5) * self.band_width + self.offset
    }

    /// Fractional index under pixel `x`.
    pub fn to_index(&self, x: f64) -> f64 {
        if self.is_identity() {
            return x;
        }
        self.rightmost() as f64 - ((self.width + self.offset - x) / self.band_width - 0.5)
    }
}

/// Price <-> y mapping, y grows downwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceScale {
    domain: Option<PriceDomain>,
    height: f64,
    offset: f64,
}

impl PriceScale {
    pub fn identity() -> Self {
        Self { domain: None, height: 0.0, offset: 0.0 }
    }

    pub fn new(domain: PriceDomain, height: f64) -> Self {
        Self { domain: Some(domain), height, offset: 0.0 }
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self { offset: transform.offset_y, ..*self }
    }

    pub fn domain(&self) -> Option<PriceDomain> {
        self.domain
    }

    pub fn to_px(&self, price: f64) -> f64 {
        match self.domain {
            Some(d) if d.span() > 0.0 => {
                self.height - (price - d.min) / d.span() * self.height + self.offset
            }
            _ => price,
        }
    }

    pub fn to_price(&self, y: f64) -> f64 {
        match self.domain {
            Some(d) if d.span() > 0.0 && self.height > 0.0 => {
                d.min + (self.height + self.offset - y) / self.height * d.span()
            }
            _ => y,
        }
    }
}

/// Output of one scale computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScales {
    pub base_index: IndexScale,
    pub index: IndexScale,
    pub base_price: PriceScale,
    pub price: PriceScale,
    /// Set when no domain was locked yet; the caller should lock this value.
    pub domain_to_lock: Option<PriceDomain>,
    ready: bool,
}

impl CoordinateScales {
    pub fn not_ready() -> Self {
        Self {
            base_index: IndexScale::identity(),
            index: IndexScale::identity(),
            base_price: PriceScale::identity(),
            price: PriceScale::identity(),
            domain_to_lock: None,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

/// Bounded least-recently-used map.
#[derive(Debug, Clone)]
pub struct LruCache<K: Hash + Eq, V> {
    capacity: usize,
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V: Clone> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), entries: IndexMap::new() }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        let (key, value) = self.entries.shift_remove_entry(key)?;
        self.entries.insert(key, value.clone());
        Some(value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.entries.shift_remove(&key);
        self.entries.insert(key, value);
        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }

    pub fn get_or_insert_with(&mut self, key: K, make: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = make();
        self.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

type DomainKey = (u64, usize);
type TickKey = (u64, u64, usize);

/// Derives scales for one chart session and memoizes the costly parts.
#[derive(Debug, Clone)]
pub struct ScaleManager {
    window_size: usize,
    padding: f64,
    domains: LruCache<DomainKey, Option<PriceDomain>>,
    ticks: LruCache<TickKey, Vec<f64>>,
}

impl ScaleManager {
    pub fn new(window_size: usize, padding: f64, cache_capacity: usize) -> Self {
        Self {
            window_size,
            padding,
            domains: LruCache::new(cache_capacity),
            ticks: LruCache::new(cache_capacity),
        }
    }

    pub fn compute(
        &mut self,
        store: &BarStore,
        surface: SurfaceSize,
        transform: &Transform,
        locked: Option<PriceDomain>,
        trailing: usize,
    ) -> CoordinateScales {
        if store.is_empty() || surface.is_empty() {
            return CoordinateScales::not_ready();
        }

        let (domain, domain_to_lock) = match locked {
            Some(domain) => (domain, None),
            None => match self.trailing_domain(store, trailing) {
                Some(domain) => (domain, Some(domain)),
                None => return CoordinateScales::not_ready(),
            },
        };

        let base_index = IndexScale::base(store.len(), surface.width, self.window_size);
        let base_price = PriceScale::new(domain, surface.height);

        CoordinateScales {
            base_index,
            index: base_index.transformed(transform),
            base_price,
            price: base_price.transformed(transform),
            domain_to_lock,
            ready: true,
        }
    }

    /// Padded range of the newest `count` bars.
    pub fn trailing_domain(&mut self, store: &BarStore, count: usize) -> Option<PriceDomain> {
        let padding = self.padding;
        self.domains.get_or_insert_with((store.revision(), count), || {
            let end = store.len().checked_sub(1)?;
            let start = (end + 1).saturating_sub(count.max(1));
            store.price_range(start, end).map(|(low, high)| PriceDomain::padded(low, high, padding))
        })
    }

    pub fn price_ticks(&mut self, domain: PriceDomain, count: usize) -> Vec<f64> {
        let key = (domain.min.to_bits(), domain.max.to_bits(), count);
        self.ticks.get_or_insert_with(key, || nice_ticks(domain.min, domain.max, count))
    }

    pub fn cached_entries(&self) -> usize {
        self.domains.len() + self.ticks.len()
    }

    pub fn clear(&mut self) {
        self.domains.clear();
        self.ticks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Bar, OHLCV, Price, Symbol, Timeframe, Timestamp, Volume};

    fn store_with(closes: &[f64]) -> BarStore {
        let mut store = BarStore::new(Symbol::from("SPY"), Timeframe::OneMinute, 500);
        store.replace(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    Bar::new(
                        Timestamp::from_millis(i as u64),
                        OHLCV::new(
                            Price::from(*c),
                            Price::from(*c),
                            Price::from(*c),
                            Price::from(*c),
                            Volume::from(1.0),
                        ),
                    )
                })
                .collect(),
        );
        store
    }

    #[test]
    fn rightmost_bar_is_flush_right() {
        let scale = IndexScale::base(100, 800.0, 80);
        assert_eq!(scale.band_width(), 10.0);
        assert_eq!(scale.to_px(99.0), 795.0);
        assert_eq!(scale.total_width(), 1000.0);
        assert_eq!(scale.to_index(795.0), 99.0);
    }

    #[test]
    fn transform_shifts_and_scales_bands() {
        let base = IndexScale::base(100, 800.0, 80);
        let t = Transform { offset_x: 40.0, offset_y: 0.0, scale: 2.0 };
        let scale = base.transformed(&t);
        assert_eq!(scale.band_width(), 20.0);
        assert_eq!(scale.offset(), 40.0);
        assert_eq!(scale.pan_points(), 2.0);
        assert_eq!(scale.to_px(97.0), 790.0);
    }

    #[test]
    fn price_scale_inverts_y() {
        let scale = PriceScale::new(PriceDomain::new(100.0, 200.0), 400.0);
        assert_eq!(scale.to_px(100.0), 400.0);
        assert_eq!(scale.to_px(200.0), 0.0);
        assert_eq!(scale.to_price(200.0), 150.0);
    }

    #[test]
    fn empty_store_is_not_ready() {
        let mut manager = ScaleManager::new(80, 0.05, 8);
        let store = BarStore::new(Symbol::from("SPY"), Timeframe::OneMinute, 500);
        let scales = manager.compute(
            &store,
            SurfaceSize::new(800.0, 400.0),
            &Transform::identity(),
            None,
            80,
        );
        assert!(!scales.is_ready());
        assert_eq!(scales.index.to_px(3.0), 3.0);
        assert_eq!(scales.price.to_px(42.0), 42.0);
    }

    #[test]
    fn unlocked_domain_comes_from_trailing_slice() {
        let mut manager = ScaleManager::new(80, 0.0, 8);
        let store = store_with(&[1000.0, 10.0, 20.0]);
        let scales = manager.compute(
            &store,
            SurfaceSize::new(800.0, 400.0),
            &Transform::identity(),
            None,
            2,
        );
        assert_eq!(scales.domain_to_lock, Some(PriceDomain::new(10.0, 20.0)));

        let locked = PriceDomain::new(0.0, 1.0);
        let scales = manager.compute(
            &store,
            SurfaceSize::new(800.0, 400.0),
            &Transform::identity(),
            Some(locked),
            2,
        );
        assert_eq!(scales.domain_to_lock, None);
        assert_eq!(scales.price.domain(), Some(locked));
    }

    #[test]
    fn lru_evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("c", 3);
        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.len(), 2);
    }
}
