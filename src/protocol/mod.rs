//! USB protocol implementation for Platinum devices.
//!
//! This module contains the register catalogue, the command sequencer, the
//! request frame builder, the reply parser and the mode codec.

pub mod commands;
pub mod frame;
pub mod mode;
pub mod response;
pub mod sequencer;

pub use commands::*;
pub use frame::{RequestFrame, SubCommand};
pub use mode::*;
pub use response::{FieldSlot, FirmwareVersion, ParsedFields};
pub use sequencer::CommandSequencer;
