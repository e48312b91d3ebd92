//! Mode byte and curve table codec.
//!
//! Mode byte layout:
//!
//! ```text
//! bit 7    connected
//! bits 1-3 mode selector
//! bit 0    pin type (clear = 4-pin, set = 3-pin)
//! ```

use serde::{Deserialize, Serialize};

use crate::protocol::commands::CURVE_POINTS;

/// Set by the device on a channel with something plugged in.
pub const CONNECTED_BIT: u8 = 0x80;
/// Set for 3-pin fans.
pub const PIN_TYPE_BIT: u8 = 0x01;
const MODE_MASK: u8 = 0x0E;

// =============================================================================
// Modes
// =============================================================================

/// Fan/pump operating mode as written to the FanMode register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    Performance,
    Balanced,
    Quiet,
    Default,
    /// Fixed PWM duty (0-255).
    FixedPwm(u8),
    /// Fixed target speed in RPM.
    FixedRpm(u16),
    Custom,
}

impl FanMode {
    /// Value of the 3-bit mode selector.
    pub const fn selector(&self) -> u8 {
        match self {
            FanMode::Performance => 1,
            FanMode::Balanced => 2,
            FanMode::Quiet => 3,
            FanMode::Default => 4,
            FanMode::FixedPwm(_) => 5,
            FanMode::FixedRpm(_) => 6,
            FanMode::Custom => 7,
        }
    }

    /// Byte written to the FanMode register.
    pub const fn mode_byte(&self) -> u8 {
        self.selector() << 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            FanMode::Performance => "Performance",
            FanMode::Balanced => "Balanced",
            FanMode::Quiet => "Quiet",
            FanMode::Default => "Default",
            FanMode::FixedPwm(_) => "Fixed PWM",
            FanMode::FixedRpm(_) => "Fixed RPM",
            FanMode::Custom => "Custom Curve",
        }
    }
}

impl std::fmt::Display for FanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanMode::FixedPwm(pwm) => write!(f, "Fixed PWM ({})", pwm),
            FanMode::FixedRpm(rpm) => write!(f, "Fixed RPM ({})", rpm),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// Physical connector of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinType {
    ThreePin,
    FourPin,
}

impl std::fmt::Display for PinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PinType::ThreePin => write!(f, "3PIN"),
            PinType::FourPin => write!(f, "4PIN"),
        }
    }
}

/// Mode as reported back by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSetting {
    Performance,
    Balanced,
    Quiet,
    Default,
    /// Fixed PWM, as a percentage.
    FixedPwm { percent: u8 },
    FixedRpm { rpm: u16 },
    Custom,
    /// Selector 0, not assigned to any mode.
    Unknown(u8),
}

/// Decoded mode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeStatus {
    /// Nothing on the header, or the channel failed. Other bits are ignored.
    Disconnected,
    Connected {
        pin_type: PinType,
        setting: ModeSetting,
    },
}

impl ModeStatus {
    /// Decode a mode byte. `data` is the fixed PWM or RPM value that goes with
    /// it, when the caller read one.
    pub fn decode(mode: u8, data: Option<u16>) -> Self {
        if mode & CONNECTED_BIT == 0 {
            return ModeStatus::Disconnected;
        }

        let pin_type = if mode & PIN_TYPE_BIT == 0 {
            PinType::FourPin
        } else {
            PinType::ThreePin
        };
        let data = data.unwrap_or(0);

        let setting = match (mode & MODE_MASK) >> 1 {
            1 => ModeSetting::Performance,
            2 => ModeSetting::Balanced,
            3 => ModeSetting::Quiet,
            4 => ModeSetting::Default,
            5 => ModeSetting::FixedPwm {
                percent: pwm_percent(data),
            },
            6 => ModeSetting::FixedRpm { rpm: data },
            7 => ModeSetting::Custom,
            other => ModeSetting::Unknown(other),
        };

        ModeStatus::Connected { pin_type, setting }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ModeStatus::Connected { .. })
    }
}

impl std::fmt::Display for ModeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (pin, setting) = match self {
            ModeStatus::Disconnected => return write!(f, "Not connected or failed"),
            ModeStatus::Connected { pin_type, setting } => (pin_type, setting),
        };
        match setting {
            ModeSetting::Performance => write!(f, "Performance Mode ({pin})"),
            ModeSetting::Balanced => write!(f, "Balanced Mode ({pin})"),
            ModeSetting::Quiet => write!(f, "Quiet Mode ({pin})"),
            ModeSetting::Default => write!(f, "Default Mode ({pin})"),
            ModeSetting::FixedPwm { percent } => {
                write!(f, "Fixed PWM Mode ({pin}) set to {percent}%")
            }
            ModeSetting::FixedRpm { rpm } => write!(f, "Fixed RPM Mode ({pin}) set to {rpm}"),
            ModeSetting::Custom => write!(f, "Custom Curve Mode ({pin})"),
            ModeSetting::Unknown(sel) => write!(f, "Unknown Mode {sel} ({pin})"),
        }
    }
}

/// PWM duty (0-255) to percent, truncating like the firmware does.
pub fn pwm_percent(data: u16) -> u8 {
    ((data as u32 + 1) * 100 / 256) as u8
}

// =============================================================================
// Curve Table
// =============================================================================

/// One control point of a temperature to speed curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurvePoint {
    pub temperature: u8,
    pub speed: u8,
}

impl CurvePoint {
    pub const fn new(temperature: u8, speed: u8) -> Self {
        Self { temperature, speed }
    }
}

/// Five control points, uploaded as a temperature column and a speed column.
///
/// Points should be in ascending temperature order; that is left to the
/// caller, the order given is the order sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurveTable(pub [CurvePoint; CURVE_POINTS]);

impl CurveTable {
    pub const fn new(points: [CurvePoint; CURVE_POINTS]) -> Self {
        Self(points)
    }

    /// Build from `(temperature, speed)` pairs.
    pub const fn from_pairs(pairs: [(u8, u8); CURVE_POINTS]) -> Self {
        let mut points = [CurvePoint::new(0, 0); CURVE_POINTS];
        let mut i = 0;
        while i < CURVE_POINTS {
            points[i] = CurvePoint::new(pairs[i].0, pairs[i].1);
            i += 1;
        }
        Self(points)
    }

    pub fn points(&self) -> &[CurvePoint; CURVE_POINTS] {
        &self.0
    }

    pub fn temperatures(&self) -> [u8; CURVE_POINTS] {
        self.0.map(|p| p.temperature)
    }

    pub fn speeds(&self) -> [u8; CURVE_POINTS] {
        self.0.map(|p| p.speed)
    }
}

impl std::fmt::Display for CurveTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}C:{}", p.temperature, p.speed)?;
        }
        Ok(())
    }
}
