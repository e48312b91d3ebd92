//! Parsing utilities for CLI arguments and configuration values.
//!
//! This module provides reusable parsing functions for the fan mode, pump
//! mode and curve formats accepted on the command line.

use crate::config::PumpMode;
use crate::error::{PlatinumError, Result};
use crate::protocol::{CURVE_POINTS, CurvePoint, CurveTable, FanMode};

// =============================================================================
// Fan Mode Parsing
// =============================================================================

/// Parse a fan mode string into a FanMode.
///
/// # Arguments
/// * `name` - "performance", "balanced", "quiet", "default", "custom",
///   "fixed-rpm:XXXX" or "fixed-pwm:XXX"
///
/// # Example
/// ```
/// use platinum_cooler::utils::parsing::parse_fan_mode;
/// use platinum_cooler::protocol::FanMode;
///
/// assert_eq!(parse_fan_mode("quiet").unwrap(), FanMode::Quiet);
/// assert_eq!(parse_fan_mode("fixed-rpm:1500").unwrap(), FanMode::FixedRpm(1500));
/// ```
pub fn parse_fan_mode(name: &str) -> Result<FanMode> {
    let lower = name.to_lowercase();

    if let Some(rest) = lower.strip_prefix("fixed-rpm:") {
        let rpm: u16 = rest.parse().map_err(|_| {
            PlatinumError::InvalidInput(
                "Invalid RPM value. Use 'fixed-rpm:XXXX' where XXXX is 0-65535".into(),
            )
        })?;
        return Ok(FanMode::FixedRpm(rpm));
    }

    if let Some(rest) = lower.strip_prefix("fixed-pwm:") {
        let pwm: u8 = rest.parse().map_err(|_| {
            PlatinumError::InvalidInput(
                "Invalid PWM value. Use 'fixed-pwm:XXX' where XXX is 0-255".into(),
            )
        })?;
        return Ok(FanMode::FixedPwm(pwm));
    }

    match lower.as_str() {
        "performance" => Ok(FanMode::Performance),
        "balanced" => Ok(FanMode::Balanced),
        "quiet" => Ok(FanMode::Quiet),
        "default" => Ok(FanMode::Default),
        "custom" => Ok(FanMode::Custom),
        _ => Err(PlatinumError::InvalidInput(format!(
            "Unknown fan mode '{}'. Use: performance, balanced, quiet, default, custom, \
             fixed-rpm:XXXX or fixed-pwm:XXX",
            name
        ))),
    }
}

// =============================================================================
// Pump Mode Parsing
// =============================================================================

/// Parse a pump mode name.
pub fn parse_pump_mode(name: &str) -> Result<PumpMode> {
    match name.to_lowercase().as_str() {
        "quiet" => Ok(PumpMode::Quiet),
        "balanced" => Ok(PumpMode::Balanced),
        "performance" | "extreme" => Ok(PumpMode::Performance),
        "default" => Ok(PumpMode::Default),
        _ => Err(PlatinumError::InvalidInput(format!(
            "Unknown pump mode '{}'. Use: quiet, balanced, performance or default",
            name
        ))),
    }
}

// =============================================================================
// Curve Parsing
// =============================================================================

/// Parse a curve of exactly five `temperature:speed` pairs.
///
/// Order is kept as given.
///
/// # Example
/// ```
/// use platinum_cooler::utils::parsing::parse_curve;
///
/// let curve = parse_curve("25:20,30:40,35:60,40:80,45:100").unwrap();
/// assert_eq!(curve.temperatures(), [25, 30, 35, 40, 45]);
/// ```
pub fn parse_curve(input: &str) -> Result<CurveTable> {
    let points = input
        .split(',')
        .map(|pair| parse_point(pair.trim()))
        .collect::<Result<Vec<_>>>()?;

    let points: [CurvePoint; CURVE_POINTS] = points.try_into().map_err(|p: Vec<CurvePoint>| {
        PlatinumError::InvalidInput(format!(
            "A curve needs exactly {} points, got {}",
            CURVE_POINTS,
            p.len()
        ))
    })?;

    Ok(CurveTable::new(points))
}

fn parse_point(pair: &str) -> Result<CurvePoint> {
    let invalid = || {
        PlatinumError::InvalidInput(format!(
            "Invalid curve point '{}'. Use 'temperature:speed', e.g. 30:40",
            pair
        ))
    };

    let (temp, speed) = pair.split_once(':').ok_or_else(invalid)?;
    let temperature = temp.trim().parse().map_err(|_| invalid())?;
    let speed = speed.trim().parse().map_err(|_| invalid())?;
    Ok(CurvePoint { temperature, speed })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fan_mode() {
        assert_eq!(parse_fan_mode("PERFORMANCE").unwrap(), FanMode::Performance);
        assert_eq!(parse_fan_mode("balanced").unwrap(), FanMode::Balanced);
        assert_eq!(
            parse_fan_mode("fixed-pwm:128").unwrap(),
            FanMode::FixedPwm(128)
        );
        assert_eq!(
            parse_fan_mode("Fixed-RPM:1200").unwrap(),
            FanMode::FixedRpm(1200)
        );
    }

    #[test]
    fn test_parse_fan_mode_invalid() {
        assert!(parse_fan_mode("turbo").is_err());
        assert!(parse_fan_mode("fixed-pwm:300").is_err());
        assert!(parse_fan_mode("fixed-rpm:").is_err());
    }

    #[test]
    fn test_parse_pump_mode() {
        assert_eq!(parse_pump_mode("quiet").unwrap(), PumpMode::Quiet);
        assert_eq!(parse_pump_mode("Extreme").unwrap(), PumpMode::Performance);
        assert!(parse_pump_mode("custom").is_err());
    }

    #[test]
    fn test_parse_curve_keeps_order() {
        let curve = parse_curve("40:80, 25:20,30:40,35:60,45:100").unwrap();
        assert_eq!(curve.temperatures(), [40, 25, 30, 35, 45]);
        assert_eq!(curve.speeds(), [80, 20, 40, 60, 100]);
    }

    #[test]
    fn test_parse_curve_wrong_length() {
        assert!(parse_curve("25:20,30:40").is_err());
        assert!(parse_curve("25:20,30:40,35:60,40:80,45:100,50:100").is_err());
    }

    #[test]
    fn test_parse_curve_bad_point() {
        assert!(parse_curve("25-20,30:40,35:60,40:80,45:100").is_err());
        assert!(parse_curve("25:x,30:40,35:60,40:80,45:100").is_err());
    }
}
