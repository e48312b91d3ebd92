//! Reply parsing for Platinum devices.
//!
//! A reply is only meaningful next to the sub-commands that produced it. The
//! device answers each queued sub-command, in order, with one record:
//!
//! ```text
//! [id echo][opcode echo][data: 0, 1 or 2 bytes]
//! ```
//!
//! Write records carry no data but still take their header. Offsets verified
//! against captures: a lone read lands at byte 2, select + read at byte 4.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{PlatinumError, Result};
use crate::protocol::commands::{
    FRAME_LENGTH, RECORD_HEADER_LENGTH, Register, STATUS_PUMP_RPM, SubCommandSpec,
};

// =============================================================================
// Layout
// =============================================================================

/// Where one sub-command's data sits in the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub spec: SubCommandSpec,
    pub offset: usize,
    /// Zero for write-class sub-commands.
    pub width: usize,
}

/// Compute the data slot of each sub-command.
///
/// # Panics
/// If the layout runs past the end of the 64-byte reply. That can only come
/// from queuing more than a request frame can hold.
pub fn layout(commands: &[SubCommandSpec]) -> Vec<FieldSlot> {
    let mut cursor = 0usize;
    commands
        .iter()
        .map(|spec| {
            let offset = cursor + RECORD_HEADER_LENGTH;
            let width = spec.opcode.response_width();
            cursor = offset + width;
            assert!(
                cursor <= FRAME_LENGTH,
                "reply layout runs past byte {}: {:?}",
                FRAME_LENGTH - 1,
                commands
            );
            FieldSlot {
                spec: *spec,
                offset,
                width,
            }
        })
        .collect()
}

/// Read an unsigned little-endian field of 1, 2 or 3 bytes.
pub fn read_field(response: &[u8; FRAME_LENGTH], offset: usize, width: usize) -> u32 {
    let bytes = &response[offset..offset + width];
    match width {
        0 => 0,
        1 => bytes[0] as u32,
        2 => LittleEndian::read_u16(bytes) as u32,
        3 => LittleEndian::read_u24(bytes),
        _ => panic!("unsupported field width {width}"),
    }
}

/// Check that the transport delivered a whole frame.
pub fn validate_length(received: usize) -> Result<()> {
    if received != FRAME_LENGTH {
        return Err(PlatinumError::ProtocolMismatch {
            expected: FRAME_LENGTH,
            actual: received,
        });
    }
    Ok(())
}

// =============================================================================
// Parsed fields
// =============================================================================

/// Values extracted from a reply, one slot per queued sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    slots: Vec<FieldSlot>,
    values: Vec<Option<u32>>,
}

impl ParsedFields {
    /// First read value for `register`; `None` when it was only written.
    pub fn value(&self, register: Register) -> Option<u32> {
        self.slots
            .iter()
            .zip(&self.values)
            .find(|(slot, value)| slot.spec.register == register && value.is_some())
            .and_then(|(_, value)| *value)
    }
}

/// Extract every read field from `response`.
pub fn parse(response: &[u8; FRAME_LENGTH], commands: &[SubCommandSpec]) -> ParsedFields {
    let slots = layout(commands);
    let values = slots
        .iter()
        .map(|slot| {
            slot.spec
                .opcode
                .is_read()
                .then(|| read_field(response, slot.offset, slot.width))
        })
        .collect();
    ParsedFields { slots, values }
}

// =============================================================================
// Variant quirks
// =============================================================================

/// Live fan speed offsets (low, high) for the select + ReadRPM + MaxRecordedRPM
/// reply. These do not follow the record layout; they depend on how many fans
/// the unit drives. New variants need checking against a real capture.
pub fn fan_speed_offsets(fan_count: u8) -> Option<(usize, usize)> {
    match fan_count {
        1 => Some((0x0F, 0x10)),
        2 => Some((0x16, 0x17)),
        _ => None,
    }
}

/// Fan speed from a live speed reply.
pub fn fan_speed(response: &[u8; FRAME_LENGTH], fan_count: u8) -> Result<u16> {
    let (lo, hi) =
        fan_speed_offsets(fan_count).ok_or(PlatinumError::UnsupportedVariant { fan_count })?;
    Ok(u16::from_le_bytes([response[lo], response[hi]]))
}

/// Pump speed from a status report.
pub fn pump_speed(response: &[u8; FRAME_LENGTH]) -> u16 {
    let (lo, hi) = STATUS_PUMP_RPM;
    u16::from_le_bytes([response[lo], response[hi]])
}

// =============================================================================
// Firmware
// =============================================================================

/// Firmware version, packed as `[patch][major:4|minor:4]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl FirmwareVersion {
    /// Decode from the two-byte FirmwareId field (low byte = patch).
    pub fn from_field(field: u16) -> Self {
        let [patch, packed] = field.to_le_bytes();
        Self {
            major: (packed & 0xF0) >> 4,
            minor: packed & 0x0F,
            patch,
        }
    }

    /// Decode from a status report (bytes 2 and 3).
    pub fn parse(response: &[u8; FRAME_LENGTH]) -> Self {
        Self::from_field(u16::from_le_bytes([response[2], response[3]]))
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
