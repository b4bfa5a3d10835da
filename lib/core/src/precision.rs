//! Fixed-precision rounding for similarity scores
//!
//! Every score leaving a measure is rounded to [`PRECISION`] significant
//! digits so that rankings compare equal across runs and platforms.

/// Number of significant digits kept in a similarity score
pub const PRECISION: u32 = 5;

/// Round `value` to `digits` significant digits.
///
/// Zero and non-finite values are returned unchanged, as are values too
/// close to the subnormal range for the scaling factor to be representable.
#[inline]
#[must_use]
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let shift = digits as i32 - 1 - magnitude;
    let factor = 10f64.powi(shift.abs());
    if !factor.is_finite() {
        return value;
    }

    let rounded = if shift >= 0 {
        (value * factor).round() / factor
    } else {
        (value / factor).round() * factor
    };
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Round a similarity score to [`PRECISION`] significant digits
#[inline]
#[must_use]
pub fn round_score(value: f64) -> f64 {
    round_significant(value, PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_significant() {
        assert_eq!(round_score(0.526315789), 0.52632);
        assert_eq!(round_score(0.172413793), 0.17241);
        assert_eq!(round_score(1.0), 1.0);
        assert_eq!(round_score(0.99999999), 1.0);
        assert_eq!(round_score(-0.333333333), -0.33333);
        assert_eq!(round_significant(123456.0, 3), 123000.0);
    }

    #[test]
    fn test_round_subnormal_stays_finite() {
        assert_eq!(round_score(1e-320), 1e-320);
        assert_eq!(round_score(-5e-324), -5e-324);
        assert_eq!(round_score(f64::MIN_POSITIVE), f64::MIN_POSITIVE);
        // Small but scalable values still round
        assert!((round_score(1.234567e-300) - 1.2346e-300).abs() < 1e-309);
    }

    #[test]
    fn test_round_large_magnitudes() {
        let rounded = round_score(1.2345678e300);
        assert!(rounded.is_finite());
        assert!((rounded / 1.2346e300 - 1.0).abs() < 1e-12);
        assert!(round_score(f64::MAX).is_finite());
        assert!(round_score(-f64::MAX).is_finite());
    }

    #[test]
    fn test_round_passthrough() {
        assert_eq!(round_score(0.0), 0.0);
        assert!(round_score(f64::NAN).is_nan());
        assert_eq!(round_score(f64::INFINITY), f64::INFINITY);
    }
}
