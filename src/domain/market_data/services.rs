use crate::domain::errors::MalformedBarError;
use crate::domain::market_data::Bar;

/// Domain service - bar validation
#[derive(Debug, Clone, Copy, Default)]
pub struct BarValidationService;

impl BarValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Check a single bar for structural validity.
    pub fn validate_bar(&self, bar: &Bar) -> Result<(), MalformedBarError> {
        let o = bar.ohlcv.open.value();
        let h = bar.ohlcv.high.value();
        let l = bar.ohlcv.low.value();
        let c = bar.ohlcv.close.value();
        let v = bar.ohlcv.volume.value();

        if ![o, h, l, c, v].iter().all(|x| x.is_finite()) {
            return Err(MalformedBarError::NonFinite);
        }
        if h < l {
            return Err(MalformedBarError::OhlcViolation(
                "High price cannot be lower than low price".to_string(),
            ));
        }
        if h < o.max(c) {
            return Err(MalformedBarError::OhlcViolation(
                "High price cannot be lower than open or close".to_string(),
            ));
        }
        if l > o.min(c) {
            return Err(MalformedBarError::OhlcViolation(
                "Low price cannot be higher than open or close".to_string(),
            ));
        }
        if l < 0.0 {
            return Err(MalformedBarError::OhlcViolation("Price cannot be negative".to_string()));
        }
        if v < 0.0 {
            return Err(MalformedBarError::NegativeVolume);
        }
        Ok(())
    }

    /// Check strict chronological order of a sequence.
    pub fn validate_sequence(&self, bars: &[Bar]) -> Result<(), MalformedBarError> {
        for pair in bars.windows(2) {
            let (prev, current) = (pair[0].timestamp.value(), pair[1].timestamp.value());
            if current == prev {
                return Err(MalformedBarError::Duplicate(current));
            }
            if current < prev {
                return Err(MalformedBarError::NonMonotonic { previous: prev, actual: current });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{OHLCV, Price, Timestamp, Volume};

    fn bar(ts: u64, o: f64, h: f64, l: f64, c: f64) -> Bar {
        Bar::new(
            Timestamp::from_millis(ts),
            OHLCV::new(
                Price::from(o),
                Price::from(h),
                Price::from(l),
                Price::from(c),
                Volume::from(1.0),
            ),
        )
    }

    #[test]
    fn rejects_broken_ohlc() {
        let svc = BarValidationService::new();
        assert!(svc.validate_bar(&bar(0, 10.0, 12.0, 9.0, 11.0)).is_ok());
        assert!(svc.validate_bar(&bar(0, 10.0, 9.5, 9.0, 11.0)).is_err());
        assert!(svc.validate_bar(&bar(0, 10.0, 12.0, 10.5, 11.0)).is_err());
        assert_eq!(
            svc.validate_bar(&bar(0, f64::NAN, 12.0, 9.0, 11.0)),
            Err(MalformedBarError::NonFinite)
        );
    }

    #[test]
    fn sequence_must_be_strictly_increasing() {
        let svc = BarValidationService::new();
        let ok = [bar(1, 1.0, 1.0, 1.0, 1.0), bar(2, 1.0, 1.0, 1.0, 1.0)];
        assert!(svc.validate_sequence(&ok).is_ok());
        let dup = [bar(2, 1.0, 1.0, 1.0, 1.0), bar(2, 1.0, 1.0, 1.0, 1.0)];
        assert_eq!(svc.validate_sequence(&dup), Err(MalformedBarError::Duplicate(2)));
    }
}
