pub mod parsing;

// Re-export commonly used items
pub use parsing::{parse_curve, parse_fan_mode, parse_pump_mode};
