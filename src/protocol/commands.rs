//! Opcode and register definitions for the Platinum protocol.
//!
//! The register map is shared with the older CoolIt family: every sub-command
//! addresses one register with a read or write of a fixed width.

// =============================================================================
// Constants
// =============================================================================

/// USB transfer length for requests and replies.
pub const FRAME_LENGTH: usize = 64;

/// Last usable byte of a request frame (byte 0 holds the cursor).
pub const FRAME_CAPACITY: usize = FRAME_LENGTH - 1;

/// Bytes echoed by the device at the start of every reply record (id, opcode).
pub const RECORD_HEADER_LENGTH: usize = 2;

/// Corsair Vendor ID.
pub const CORSAIR_VID: u16 = 0x1B1C;

/// Number of control points in a curve table.
pub const CURVE_POINTS: usize = 5;

/// Length byte prepended to a curve table block (five values, each zero padded).
pub const TABLE_BLOCK_LENGTH: u8 = (CURVE_POINTS * 2) as u8;

/// First byte of a status query frame.
pub const STATUS_QUERY_MARKER: u8 = 0x3F;

/// Command byte of a status query frame.
pub const STATUS_QUERY_COMMAND: u8 = 0xFF;

/// Reply offsets of the pump speed in a status report (low, high).
pub const STATUS_PUMP_RPM: (usize, usize) = (0x1D, 0x1E);

/// Reported when the device gives no usable maximum speed.
pub const UNKNOWN_MAX_SPEED: u16 = 0xFFFF;

// =============================================================================
// OpCodes
// =============================================================================

/// Direction and width of a register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    WriteOneByte = 0x06,
    ReadOneByte = 0x07,
    WriteTwoBytes = 0x08,
    ReadTwoBytes = 0x09,
    WriteThreeBytes = 0x0A,
}

impl OpCode {
    /// Wire value.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Field width in bytes (1, 2 or 3).
    pub const fn width(self) -> usize {
        match self {
            OpCode::WriteOneByte | OpCode::ReadOneByte => 1,
            OpCode::WriteTwoBytes | OpCode::ReadTwoBytes => 2,
            OpCode::WriteThreeBytes => 3,
        }
    }

    pub const fn is_read(self) -> bool {
        matches!(self, OpCode::ReadOneByte | OpCode::ReadTwoBytes)
    }

    /// Payload bytes carried in the request.
    pub const fn request_width(self) -> usize {
        if self.is_read() { 0 } else { self.width() }
    }

    /// Data bytes carried in the reply record.
    pub const fn response_width(self) -> usize {
        if self.is_read() { self.width() } else { 0 }
    }
}

// =============================================================================
// Registers
// =============================================================================

/// Addressable registers in the device's control space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Not addressed directly: the firmware id comes back in the status report.
    FirmwareId = 0x01,
    FanSelect = 0x10,
    FanCount = 0x11,
    FanMode = 0x12,
    FanFixedPwm = 0x13,
    FanFixedRpm = 0x14,
    FanReadRpm = 0x16,
    FanMaxRecordedRpm = 0x17,
    RpmTable = 0x19,
    TempTable = 0x1A,
}

impl Register {
    /// Wire address.
    pub const fn address(self) -> u8 {
        self as u8
    }
}

// =============================================================================
// Catalogue
// =============================================================================

/// Logical operations used by the channel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SelectChannel,
    FanCount,
    ReadMode,
    WriteMode,
    ReadFixedRpm,
    WriteFixedRpm,
    ReadFixedPwm,
    WriteFixedPwm,
    ReadRpm,
    ReadMaxRecordedRpm,
    WriteTempTable,
    WriteRpmTable,
}

impl Operation {
    /// Register and opcode this operation is issued with.
    pub const fn spec(self) -> SubCommandSpec {
        let (register, opcode) = match self {
            Operation::SelectChannel => (Register::FanSelect, OpCode::WriteOneByte),
            Operation::FanCount => (Register::FanCount, OpCode::ReadOneByte),
            Operation::ReadMode => (Register::FanMode, OpCode::ReadOneByte),
            Operation::WriteMode => (Register::FanMode, OpCode::WriteOneByte),
            Operation::ReadFixedRpm => (Register::FanFixedRpm, OpCode::ReadTwoBytes),
            Operation::WriteFixedRpm => (Register::FanFixedRpm, OpCode::WriteTwoBytes),
            Operation::ReadFixedPwm => (Register::FanFixedPwm, OpCode::ReadOneByte),
            Operation::WriteFixedPwm => (Register::FanFixedPwm, OpCode::WriteOneByte),
            Operation::ReadRpm => (Register::FanReadRpm, OpCode::ReadTwoBytes),
            Operation::ReadMaxRecordedRpm => (Register::FanMaxRecordedRpm, OpCode::ReadTwoBytes),
            Operation::WriteTempTable => (Register::TempTable, OpCode::WriteThreeBytes),
            Operation::WriteRpmTable => (Register::RpmTable, OpCode::WriteThreeBytes),
        };
        SubCommandSpec { register, opcode }
    }
}

/// A sub-command as seen by the parser: which register, which opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubCommandSpec {
    pub register: Register,
    pub opcode: OpCode,
}

impl From<Operation> for SubCommandSpec {
    fn from(op: Operation) -> Self {
        op.spec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_widths() {
        assert_eq!(OpCode::ReadOneByte.request_width(), 0);
        assert_eq!(OpCode::ReadOneByte.response_width(), 1);
        assert_eq!(OpCode::ReadTwoBytes.response_width(), 2);
        assert_eq!(OpCode::WriteOneByte.request_width(), 1);
        assert_eq!(OpCode::WriteTwoBytes.request_width(), 2);
        assert_eq!(OpCode::WriteThreeBytes.request_width(), 3);
        assert_eq!(OpCode::WriteThreeBytes.response_width(), 0);
    }

    #[test]
    fn test_catalogue_entries() {
        let select = Operation::SelectChannel.spec();
        assert_eq!(select.register.address(), 0x10);
        assert_eq!(select.opcode.code(), 0x06);

        let rpm = Operation::WriteFixedRpm.spec();
        assert_eq!(rpm.register, Register::FanFixedRpm);
        assert_eq!(rpm.opcode, OpCode::WriteTwoBytes);

        assert!(Operation::ReadFixedPwm.spec().opcode.is_read());
        assert!(!Operation::WriteTempTable.spec().opcode.is_read());
    }
}
