pub use super::value_objects::{Price, Symbol, Timeframe, Timestamp, Volume};
use super::services::BarValidationService;
use crate::domain::errors::MalformedBarError;
use crate::domain::logging::LogComponent;
use crate::{log_debug, log_warn};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

/// Value Object - OHLCV sample
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct OHLCV {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

/// Domain entity - one price bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: Timestamp,
    pub ohlcv: OHLCV,
}

impl Bar {
    pub fn new(timestamp: Timestamp, ohlcv: OHLCV) -> Self {
        Self { timestamp, ohlcv }
    }
}

/// A real-time bar event from the push feed
#[derive(Debug, Clone, PartialEq)]
pub struct LiveTick {
    pub symbol: Symbol,
    pub timeframe: Timeframe,
    pub bar: Bar,
}

/// Result of merging a live bar into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Last bar replaced in place, length unchanged
    Updated,
    /// New bar appended; `evicted` is set when the oldest bar was dropped to honor the cap
    Appended { evicted: bool },
}

/// Summary of a wholesale replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceReport {
    pub kept: usize,
    pub dropped_malformed: usize,
    pub dropped_duplicates: usize,
    pub truncated: usize,
}

/// Aggregate - ordered bars of exactly one (symbol, timeframe) pair.
///
/// Timestamps are strictly increasing. The store only changes through
/// [`BarStore::replace`] (prefetch/initial load) or [`BarStore::merge_live`].
#[derive(Debug, Clone)]
pub struct BarStore {
    symbol: Symbol,
    timeframe: Timeframe,
    bars: Vec<Bar>,
    max_size: usize,
    revision: u64,
}

impl BarStore {
    pub fn new(symbol: Symbol, timeframe: Timeframe, max_size: usize) -> Self {
        Self { symbol, timeframe, bars: Vec::new(), max_size: max_size.max(1), revision: 0 }
    }

    /// Replace the whole sequence with a freshly loaded history.
    ///
    /// Malformed bars are dropped, duplicates resolved last-write-wins, and only the
    /// newest `max_size` bars are kept.
    pub fn replace(&mut self, incoming: Vec<Bar>) -> ReplaceReport {
        let validator = BarValidationService::new();
        let total = incoming.len();
        if let Err(e) = validator.validate_sequence(&incoming) {
            log_debug!(LogComponent::Domain("BarStore"), "Normalizing incoming sequence: {}", e);
        }

        // reversed so the stable sort keeps the latest write first among equal timestamps
        let mut bars: Vec<Bar> = incoming
            .into_iter()
            .rev()
            .filter(|bar| match validator.validate_bar(bar) {
                Ok(()) => true,
                Err(e) => {
                    log_warn!(
                        LogComponent::Domain("BarStore"),
                        "Dropping malformed bar at {}: {}",
                        bar.timestamp.value(),
                        e
                    );
                    false
                }
            })
            .collect();
        let dropped_malformed = total - bars.len();

        bars.sort_by_key(|b| b.timestamp);
        let before_dedup = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        let dropped_duplicates = before_dedup - bars.len();

        let truncated = bars.len().saturating_sub(self.max_size);
        if truncated > 0 {
            bars.drain(..truncated);
        }

        self.bars = bars;
        self.revision += 1;

        ReplaceReport { kept: self.bars.len(), dropped_malformed, dropped_duplicates, truncated }
    }

    /// Merge one live bar: same timestamp as the last bar updates it, a newer one is appended.
    pub fn merge_live(&mut self, bar: Bar) -> Result<MergeOutcome, MalformedBarError> {
        BarValidationService::new().validate_bar(&bar)?;

        if let Some(last) = self.bars.last_mut() {
            if last.timestamp == bar.timestamp {
                *last = bar;
                self.revision += 1;
                return Ok(MergeOutcome::Updated);
            }
            if bar.timestamp < last.timestamp {
                return Err(MalformedBarError::NonMonotonic {
                    previous: last.timestamp.value(),
                    actual: bar.timestamp.value(),
                });
            }
        }

        self.bars.push(bar);
        let evicted = self.bars.len() > self.max_size;
        if evicted {
            self.bars.remove(0);
        }
        self.revision += 1;
        Ok(MergeOutcome::Appended { evicted })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Inclusive index slice, clamped to the loaded extent.
    pub fn slice(&self, start: usize, end: usize) -> &[Bar] {
        if self.bars.is_empty() || start > end {
            return &[];
        }
        let end = end.min(self.bars.len() - 1);
        let start = start.min(end);
        &self.bars[start..=end]
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Bumped on every mutation; used to key derived caches.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Lowest low and highest high over an inclusive index range.
    pub fn price_range(&self, start: usize, end: usize) -> Option<(f64, f64)> {
        let slice = self.slice(start, end);
        if slice.is_empty() {
            return None;
        }
        let (min, max) = slice.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
            (lo.min(b.ohlcv.low.value()), hi.max(b.ohlcv.high.value()))
        });
        Some((min, max))
    }
}
