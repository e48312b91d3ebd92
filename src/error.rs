//! Custom error types for Platinum devices.
//!
//! This module provides fine-grained error handling for frame building,
//! transport access, and reply validation.

use thiserror::Error;

use crate::protocol::OpCode;

/// Main error type for Platinum device operations.
#[derive(Error, Debug)]
pub enum PlatinumError {
    /// A request could not be packed into a 64-byte frame.
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// The underlying write or read failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reply does not have the shape the queued sub-commands imply.
    #[error("Protocol mismatch: expected {expected} bytes, got {actual}")]
    ProtocolMismatch { expected: usize, actual: usize },

    /// No response offset table entry exists for this device variant.
    #[error("Unsupported device variant with {fan_count} fan(s)")]
    UnsupportedVariant { fan_count: u8 },

    /// Device descriptor file could not be parsed.
    #[error("Invalid device descriptor: {0}")]
    Config(#[from] serde_json::Error),

    /// Device descriptor file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic invalid input error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while packing sub-commands into a request frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Appending would run past the last usable byte of the frame.
    #[error("frame overflow: cursor at {cursor}, {needed} more bytes needed")]
    Overflow { cursor: usize, needed: usize },

    /// The payload does not match the width the opcode dictates.
    #[error("{opcode:?} takes {expected} payload byte(s), got {actual}")]
    PayloadWidth {
        opcode: OpCode,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised by a [`Transport`](crate::device::Transport) implementation.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HID communication error.
    #[error("HID communication error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// The device accepted fewer bytes than the frame holds.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Platinum operations.
pub type Result<T> = std::result::Result<T, PlatinumError>;
