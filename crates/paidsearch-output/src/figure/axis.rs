//! Axis scaling and tick generation.

use chrono::{Datelike, NaiveDate};

/// Linear axis with tick positions and labels in data units.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Lower data bound
    pub min: f64,
    /// Upper data bound
    pub max: f64,
    /// Tick positions
    pub ticks: Vec<f64>,
    /// Tick labels, parallel to `ticks`
    pub labels: Vec<String>,
}

impl Axis {
    /// Axis covering `[data_min, data_max]` with "nice" round ticks.
    pub fn linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (min, max, step) = nice_range(data_min, data_max, target_ticks);
        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut i = 0_u32;
        loop {
            let v = f64::from(i).mul_add(step, min);
            if v > max + step * 0.01 {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            i += 1;
        }
        Self {
            min,
            max,
            ticks,
            labels,
        }
    }

    /// Time axis over a date range; data units are days from the common
    /// era. Ticks fall on whole days spaced 1, 2, 7, 14 or 28 days apart.
    pub fn dates(first: NaiveDate, last: NaiveDate, target_ticks: usize) -> Self {
        let lo = f64::from(first.num_days_from_ce());
        let hi = f64::from(last.num_days_from_ce()).max(lo + 1.0);
        let span = hi - lo;
        let rough = span / target_ticks.max(2) as f64;
        let step = [1.0, 2.0, 7.0, 14.0, 28.0]
            .into_iter()
            .find(|s| *s >= rough)
            .unwrap_or(28.0);

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut v = lo;
        while v <= hi {
            if let Some(date) = NaiveDate::from_num_days_from_ce_opt(v as i32) {
                ticks.push(v);
                labels.push(date.format("%Y-%m-%d").to_string());
            }
            v += step;
        }

        Self {
            min: lo,
            max: hi,
            ticks,
            labels,
        }
    }

    /// Map a data value onto the pixel interval `[px_min, px_max]`.
    pub fn to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = (value - self.min) / (self.max - self.min);
        frac.mul_add(px_max - px_min, px_min)
    }

    /// Whether `value` lies within the axis bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if (data_max - data_min).abs() < 1e-12 {
        let pad = if data_min.abs() > 1e-12 {
            data_min.abs() * 0.05
        } else {
            1.0
        };
        return nice_range(data_min - pad, data_max + pad, target_ticks);
    }
    let rough_step = (data_max - data_min) / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let min = (data_min / step).floor() * step;
    let max = (data_max / step).ceil() * step;
    (min, max, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    if step >= 1.0 {
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{}", v.round() as i64)
    } else {
        let decimals = (-step.log10().floor()) as usize;
        format!("{value:.decimals$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3.2, 2.0)]
    #[case(0.7, 0.5)]
    #[case(15.0, 10.0)]
    #[case(4.5, 5.0)]
    #[case(0.012, 0.01)]
    fn test_nice_step(#[case] rough: f64, #[case] expected: f64) {
        assert!((nice_step(rough) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_linear_covers_data() {
        let axis = Axis::linear(0.13, 0.91, 5);
        assert!(axis.min <= 0.13);
        assert!(axis.max >= 0.91);
        assert_eq!(axis.ticks.len(), axis.labels.len());
        assert_eq!(axis.labels.first().map(String::as_str), Some("0.0"));
    }

    #[test]
    fn test_flat_series_gets_padding() {
        let axis = Axis::linear(5.0, 5.0, 5);
        assert!(axis.min < 5.0 && axis.max > 5.0);
    }

    #[test]
    fn test_to_pixel() {
        let axis = Axis::linear(0.0, 100.0, 5);
        assert!((axis.to_pixel(50.0, 0.0, 500.0) - 250.0).abs() < 1e-9);
        // Inverted pixel range for y axes.
        assert!((axis.to_pixel(100.0, 400.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_date_axis() {
        let first = NaiveDate::from_ymd_opt(2012, 4, 1).unwrap();
        let last = NaiveDate::from_ymd_opt(2012, 7, 22).unwrap();
        let axis = Axis::dates(first, last, 6);
        assert_eq!(axis.labels[0], "2012-04-01");
        assert_eq!(axis.ticks.len(), 5);
        assert!(axis.contains(f64::from(
            NaiveDate::from_ymd_opt(2012, 5, 22).unwrap().num_days_from_ce()
        )));
    }
}
