//! Price-axis tick generation.

/// Step close to `span / target` rounded to 1, 2 or 5 times a power of ten.
pub fn nice_step(span: f64, target: usize) -> f64 {
    let target = target.max(2) as f64;
    let raw = (span / target).max(f64::EPSILON);
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Evenly spaced round values inside `[min, max]`, ascending.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return Vec::new();
    }

    let step = nice_step(max - min, target);
    let first = (min / step).ceil();
    let last = (max / step).floor();

    // index arithmetic avoids float drift from repeated addition
    let count = (last - first) as i64;
    (0..=count.clamp(0, 1000))
        .map(|i| (first + i as f64) * step)
        .filter(|tick| *tick >= min && *tick <= max)
        .collect()
}
