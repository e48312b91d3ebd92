//! Platinum Cooler Library
//!
//! A Rust driver for Corsair Hydro Platinum liquid coolers.
//!
//! # Features
//!
//! - Pack register reads/writes into 64-byte request frames
//! - Parse replies back into typed fields
//! - Decode fan/pump mode bytes
//! - Control fan modes, fixed speeds and pump curves
//!
//! # Example
//!
//! ```no_run
//! use platinum_cooler::config::{DeviceDescriptor, PumpMode};
//! use platinum_cooler::device::{FanControl, PlatinumDevice, PumpControl};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let descriptor = DeviceDescriptor::by_product_id(0x0C18).ok_or("unknown device")?;
//!     let cooler = PlatinumDevice::open(descriptor)?;
//!     println!("Connected! Firmware: {}", cooler.firmware_version()?);
//!
//!     // Read the first fan
//!     let mut fan = FanControl::new(0);
//!     cooler.fan_count(&mut fan)?;
//!     cooler.fan_mode(&mut fan)?;
//!     println!("Fan 0: {}", fan.mode_status());
//!
//!     // Quiet pump curve
//!     let mut pump = PumpControl::new(0);
//!     cooler.set_pump_mode(&mut pump, PumpMode::Quiet)?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod utils;

// Re-exports for convenience
pub use device::{FanControl, PlatinumDevice, PumpControl};
pub use error::{PlatinumError, Result};
pub use protocol::{CommandSequencer, RequestFrame};
