//! Circular mean of day-of-year values

use std::f64::consts::PI;

const DOY_TO_RAD: f64 = 2.0 * PI / 365.0;

/// Compute the mean day-of-year of a set of values in [1, 365], treating
/// the year circularly.
///
/// Each defined value maps to an angle, the angles are averaged through
/// their sine/cosine sums, and the mean angle maps back to a whole day.
/// Missing (NaN) values are ignored; returns `None` when no value is
/// defined.
pub fn mean_doy<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let mut sum_sin = 0.0;
    let mut sum_cos = 0.0;
    let mut any_defined = false;

    for v in values {
        if !v.is_nan() {
            sum_sin += ((v - 1.0) * DOY_TO_RAD).sin();
            sum_cos += ((v - 1.0) * DOY_TO_RAD).cos();
            any_defined = true;
        }
    }

    if !any_defined {
        return None;
    }

    let mut mean_r = sum_sin.atan2(sum_cos);
    if mean_r < 0.0 {
        mean_r += 2.0 * PI;
    }

    let mut doy = 1.0 + (mean_r / DOY_TO_RAD).round();
    if doy > 365.0 {
        doy -= 365.0;
    }

    Some(doy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_doy_simple() {
        assert_eq!(mean_doy([100.0, 102.0]), Some(101.0));
    }

    #[test]
    fn test_mean_doy_wraps_year_end() {
        let doy = mean_doy([1.0, 365.0]).unwrap();
        assert!(doy == 1.0 || doy == 365.0, "expected wrap, got {doy}");

        // 360 and 10 are 15 days apart through the new year; the
        // midpoint lands just after it.
        let late = mean_doy([360.0, 10.0]).unwrap();
        assert_eq!(late, 3.0);
    }

    #[test]
    fn test_mean_doy_ignores_missing() {
        assert_eq!(mean_doy([f64::NAN, 50.0]), Some(50.0));
        assert_eq!(mean_doy([f64::NAN, f64::NAN]), None);
        assert_eq!(mean_doy(std::iter::empty()), None);
    }
}
