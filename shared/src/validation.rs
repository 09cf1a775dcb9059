//! Defensive coercion and range checks for field data
//!
//! Report payloads come from several loosely-typed sources, so numeric
//! values are coerced rather than rejected. The range checks here never
//! block rendering; they feed the diagnostics output.

/// Replace NaN and infinities with zero
pub fn coerce_finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Percentage `numerator / denominator`, rounded to the nearest integer.
///
/// Returns 0 when the denominator is zero.
pub fn rounded_percent(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    (100.0 * numerator as f64 / denominator as f64).round() as u32
}

/// Mean of the values, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|v| coerce_finite(*v)).sum::<f64>() / values.len() as f64)
    }
}

/// Mean rounded to the nearest integer, 0 for an empty slice
pub fn rounded_mean(values: &[f64]) -> u32 {
    mean(values).map(|m| m.round().max(0.0) as u32).unwrap_or(0)
}

/// Validate a severity score is within the normalized 0-100 scale
pub fn validate_severity(severity: f64) -> Result<(), &'static str> {
    if !severity.is_finite() {
        return Err("Severity must be a finite number");
    }
    if !(0.0..=100.0).contains(&severity) {
        return Err("Severity must be between 0 and 100");
    }
    Ok(())
}

/// Validate WGS84 coordinates
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    if latitude == 0.0 && longitude == 0.0 {
        return Err("Coordinates are missing (0, 0)");
    }
    Ok(())
}

/// Validate a field area in hectares
pub fn validate_area_ha(area: f64) -> Result<(), &'static str> {
    if !area.is_finite() || area < 0.0 {
        return Err("Area must be a non-negative number of hectares");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_finite() {
        assert_eq!(coerce_finite(12.5), 12.5);
        assert_eq!(coerce_finite(f64::NAN), 0.0);
        assert_eq!(coerce_finite(f64::INFINITY), 0.0);
        assert_eq!(coerce_finite(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_rounded_percent() {
        assert_eq!(rounded_percent(1, 2), 50);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(5, 0), 0);
    }

    #[test]
    fn test_rounded_mean() {
        assert_eq!(rounded_mean(&[32.0, 28.0, 38.0]), 33);
        assert_eq!(rounded_mean(&[]), 0);
        assert_eq!(rounded_mean(&[f64::NAN, 10.0]), 5);
    }

    #[test]
    fn test_validate_severity() {
        assert!(validate_severity(0.0).is_ok());
        assert!(validate_severity(100.0).is_ok());
        assert!(validate_severity(-1.0).is_err());
        assert!(validate_severity(100.5).is_err());
        assert!(validate_severity(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(-12.55, -55.72).is_ok());
        assert!(validate_coordinates(0.0, 0.0).is_err());
        assert!(validate_coordinates(-95.0, -55.0).is_err());
        assert!(validate_coordinates(-12.0, 181.0).is_err());
    }

    #[test]
    fn test_validate_area() {
        assert!(validate_area_ha(120.5).is_ok());
        assert!(validate_area_ha(0.0).is_ok());
        assert!(validate_area_ha(-3.0).is_err());
    }
}
