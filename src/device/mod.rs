//! Device abstraction layer for Platinum coolers.
//!
//! Provides the frame transport and the per-channel control interface.

pub mod platinum;
pub mod transport;

pub use platinum::{FanControl, PlatinumDevice, PumpControl};
pub use transport::{HidTransport, Transport};
