//! Linear value scales with "nice" tick steps.

/// A linear scale whose bounds are whole multiples of its tick step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// Upper bound on tick intervals, whatever the step.
const MAX_TICKS: usize = 64;

impl Scale {
    /// Build a scale covering `[lo, hi]` with roughly `target_ticks` intervals.
    ///
    /// Steps are 1, 2 or 5 times a power of ten. A degenerate range is
    /// widened so the scale never has zero extent. Returns `None` when the
    /// range is too wide to represent, e.g. values near `f64::MAX` of both signs.
    pub fn nice(lo: f64, hi: f64, target_ticks: usize) -> Option<Scale> {
        let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if lo == hi {
            if lo == 0.0 {
                hi = 1.0;
            } else {
                let pad = lo.abs() * 0.1;
                lo -= pad;
                hi += pad;
            }
        }

        if !(hi - lo).is_finite() {
            return None;
        }

        let step = nice_step((hi - lo) / target_ticks.max(1) as f64);
        let scale = Scale {
            min: (lo / step).floor() * step,
            max: (hi / step).ceil() * step,
            step,
        };
        (scale.min.is_finite() && scale.max.is_finite() && (scale.max - scale.min).is_finite())
            .then_some(scale)
    }

    /// Tick values from `min` to `max` inclusive, at most `MAX_TICKS + 1`.
    pub fn ticks(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step).round();
        let count = if count.is_finite() {
            (count as usize).min(MAX_TICKS)
        } else {
            0
        };
        (0..=count)
            .map(|i| self.min + self.step * i as f64)
            .collect()
    }

    /// Map a value onto the output range `[start, end]`.
    pub fn map(&self, value: f64, start: f64, end: f64) -> f64 {
        let t = (value - self.min) / (self.max - self.min);
        start + t * (end - start)
    }

    /// Format a tick value with no more decimals than the step needs.
    pub fn format_tick(&self, value: f64) -> String {
        let decimals = (-self.step.log10().floor()).max(0.0) as usize;
        let value = if value.abs() < self.step * 1e-9 { 0.0 } else { value };
        format!("{:.*}", decimals, value)
    }
}

fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_percent_range() {
        let scale = Scale::nice(0.0, 89.0, 5).unwrap();
        assert_eq!(scale.step, 20.0);
        assert_eq!(scale.min, 0.0);
        assert_eq!(scale.max, 100.0);
        assert_eq!(scale.ticks(), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_negative_values() {
        let scale = Scale::nice(-12.0, 30.0, 5).unwrap();
        assert!(scale.min <= -12.0);
        assert!(scale.max >= 30.0);
        assert_eq!(scale.step, 10.0);
    }

    #[test]
    fn test_degenerate_ranges() {
        let zero = Scale::nice(0.0, 0.0, 5).unwrap();
        assert!(zero.max > zero.min);
        let flat = Scale::nice(50.0, 50.0, 5).unwrap();
        assert!(flat.min < 50.0 && flat.max > 50.0);
    }

    #[test]
    fn test_fractional_ticks_format_cleanly() {
        let scale = Scale::nice(0.0, 0.9, 5).unwrap();
        assert!((scale.step - 0.2).abs() < 1e-12);
        let labels: Vec<_> = scale.ticks().iter().map(|t| scale.format_tick(*t)).collect();
        assert_eq!(labels, vec!["0.0", "0.2", "0.4", "0.6", "0.8", "1.0"]);
    }

    #[test]
    fn test_unrepresentable_range() {
        assert_eq!(Scale::nice(-f64::MAX, f64::MAX, 5), None);
        assert_eq!(Scale::nice(f64::MAX, f64::MAX, 5), None);
        assert!(Scale::nice(f64::MAX / 4.0, f64::MAX / 2.0, 5).is_some());
    }

    #[test]
    fn test_tick_count_is_bounded() {
        let scale = Scale {
            min: 0.0,
            max: 1e12,
            step: 1.0,
        };
        assert_eq!(scale.ticks().len(), MAX_TICKS + 1);
    }

    #[test]
    fn test_map() {
        let scale = Scale::nice(0.0, 100.0, 5).unwrap();
        assert_eq!(scale.map(0.0, 300.0, 20.0), 300.0);
        assert_eq!(scale.map(100.0, 300.0, 20.0), 20.0);
        assert_eq!(scale.map(50.0, 0.0, 200.0), 100.0);
    }
}
