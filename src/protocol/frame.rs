//! Request frame builder.
//!
//! A request is one 64-byte buffer. Byte 0 holds the cursor (bytes used in
//! 1..=63); the sub-commands follow back to back:
//!
//! ```text
//! [cursor] [id][opcode][register][payload 0-3] [id][opcode][register]...
//! ```
//!
//! Multi-byte payloads are little-endian.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::FrameError;
use crate::protocol::commands::{
    CURVE_POINTS, FRAME_CAPACITY, FRAME_LENGTH, OpCode, Operation, Register,
    STATUS_QUERY_COMMAND, STATUS_QUERY_MARKER, SubCommandSpec, TABLE_BLOCK_LENGTH,
};
use crate::protocol::sequencer::CommandSequencer;

/// Bytes of every sub-command before its payload (id, opcode, register).
const SUB_COMMAND_HEADER: usize = 3;

/// One sub-command as appended to a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubCommand {
    pub id: u8,
    pub opcode: OpCode,
    pub register: Register,
}

impl SubCommand {
    pub fn spec(&self) -> SubCommandSpec {
        SubCommandSpec {
            register: self.register,
            opcode: self.opcode,
        }
    }
}

/// A 64-byte request under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFrame {
    buf: [u8; FRAME_LENGTH],
    commands: Vec<SubCommand>,
}

impl Default for RequestFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestFrame {
    /// Zeroed frame with cursor 0.
    pub fn new() -> Self {
        Self {
            buf: [0u8; FRAME_LENGTH],
            commands: Vec::new(),
        }
    }

    /// Status query: `[0x3F][id][0xFF]`, answered with a full status report.
    pub fn status_query(seq: &CommandSequencer) -> Self {
        let mut frame = Self::new();
        frame.buf[0] = STATUS_QUERY_MARKER;
        frame.buf[1] = seq.next_id();
        frame.buf[2] = STATUS_QUERY_COMMAND;
        frame
    }

    /// Bytes used by sub-commands so far.
    pub fn cursor(&self) -> usize {
        self.buf[0] as usize
    }

    /// Bytes still available for sub-commands.
    pub fn remaining(&self) -> usize {
        FRAME_CAPACITY.saturating_sub(self.cursor())
    }

    pub fn commands(&self) -> &[SubCommand] {
        &self.commands
    }

    /// Register/opcode sequence, in append order, for the reply parser.
    pub fn specs(&self) -> Vec<SubCommandSpec> {
        self.commands.iter().map(SubCommand::spec).collect()
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LENGTH] {
        &self.buf
    }

    /// Append one sub-command.
    ///
    /// `payload` must be exactly as wide as the opcode's request width: empty
    /// for reads, 1, 2 or 3 bytes for writes. On error neither the frame nor
    /// the sequencer is touched.
    ///
    /// Returns the id assigned to the sub-command.
    pub fn append(
        &mut self,
        seq: &CommandSequencer,
        register: Register,
        opcode: OpCode,
        payload: &[u8],
    ) -> Result<u8, FrameError> {
        let expected = opcode.request_width();
        if payload.len() != expected {
            return Err(FrameError::PayloadWidth {
                opcode,
                expected,
                actual: payload.len(),
            });
        }
        self.write_record(seq, register, opcode, payload)
    }

    /// Append a catalogue operation.
    pub fn push(
        &mut self,
        seq: &CommandSequencer,
        op: Operation,
        payload: &[u8],
    ) -> Result<u8, FrameError> {
        let spec = op.spec();
        self.append(seq, spec.register, spec.opcode, payload)
    }

    /// Append a one-byte write of `value`.
    pub fn push_u8(
        &mut self,
        seq: &CommandSequencer,
        op: Operation,
        value: u8,
    ) -> Result<u8, FrameError> {
        self.push(seq, op, &[value])
    }

    /// Append a two-byte write of `value`, low byte first.
    pub fn push_u16(
        &mut self,
        seq: &CommandSequencer,
        op: Operation,
        value: u16,
    ) -> Result<u8, FrameError> {
        let mut payload = [0u8; 2];
        LittleEndian::write_u16(&mut payload, value);
        self.push(seq, op, &payload)
    }

    /// Append a curve table write.
    ///
    /// Table registers take a length-prefixed block through `WriteThreeBytes`:
    /// `[id][0x0A][register][10][v0 0 v1 0 v2 0 v3 0 v4 0]`. Value order is kept.
    pub fn append_table(
        &mut self,
        seq: &CommandSequencer,
        register: Register,
        values: &[u8; CURVE_POINTS],
    ) -> Result<u8, FrameError> {
        let mut block = [0u8; 1 + CURVE_POINTS * 2];
        block[0] = TABLE_BLOCK_LENGTH;
        for (i, value) in values.iter().enumerate() {
            block[1 + i * 2] = *value;
        }
        self.write_record(seq, register, OpCode::WriteThreeBytes, &block)
    }

    fn write_record(
        &mut self,
        seq: &CommandSequencer,
        register: Register,
        opcode: OpCode,
        payload: &[u8],
    ) -> Result<u8, FrameError> {
        let cursor = self.cursor();
        let needed = SUB_COMMAND_HEADER + payload.len();
        if cursor + needed > FRAME_CAPACITY {
            return Err(FrameError::Overflow { cursor, needed });
        }

        let id = seq.next_id();
        let start = cursor + 1;
        self.buf[start] = id;
        self.buf[start + 1] = opcode.code();
        self.buf[start + 2] = register.address();
        self.buf[start + SUB_COMMAND_HEADER..start + needed].copy_from_slice(payload);
        self.buf[0] = (cursor + needed) as u8;

        self.commands.push(SubCommand {
            id,
            opcode,
            register,
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FanMode;
    use proptest::prelude::*;

    #[test]
    fn test_new_frame_is_empty() {
        let frame = RequestFrame::new();
        assert_eq!(frame.cursor(), 0);
        assert!(frame.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(frame.remaining(), 63);
    }

    #[test]
    fn test_read_has_no_payload() {
        let seq = CommandSequencer::new();
        let mut frame = RequestFrame::new();
        frame.push(&seq, Operation::FanCount, &[]).unwrap();

        assert_eq!(&frame.as_bytes()[..4], &[3, 0x00, 0x07, 0x11]);
    }

    #[test]
    fn test_fixed_rpm_frame_layout() {
        let seq = CommandSequencer::new();
        let mut frame = RequestFrame::new();
        frame.push_u8(&seq, Operation::SelectChannel, 1).unwrap();
        frame
            .push_u8(&seq, Operation::WriteMode, FanMode::FixedRpm(1500).mode_byte())
            .unwrap();
        frame.push_u16(&seq, Operation::WriteFixedRpm, 1500).unwrap();

        let bytes = frame.as_bytes();
        assert_eq!(bytes[0], 13);
        assert_eq!(&bytes[1..5], &[0x00, 0x06, 0x10, 0x01]);
        assert_eq!(&bytes[5..9], &[0x01, 0x06, 0x12, 0x0C]);
        assert_eq!(&bytes[9..12], &[0x02, 0x08, 0x14]);
        assert_eq!(&bytes[12..14], &[0xDC, 0x05]);
        assert!(bytes[14..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_payload_width_checked() {
        let seq = CommandSequencer::new();
        let mut frame = RequestFrame::new();

        let err = frame
            .append(&seq, Register::FanFixedRpm, OpCode::WriteTwoBytes, &[1])
            .unwrap_err();
        assert_eq!(
            err,
            FrameError::PayloadWidth {
                opcode: OpCode::WriteTwoBytes,
                expected: 2,
                actual: 1
            }
        );

        assert!(
            frame
                .append(&seq, Register::FanMode, OpCode::ReadOneByte, &[0])
                .is_err()
        );
        assert_eq!(seq.peek(), 0);
    }

    #[test]
    fn test_three_byte_write() {
        let seq = CommandSequencer::new();
        let mut frame = RequestFrame::new();
        frame
            .append(&seq, Register::TempTable, OpCode::WriteThreeBytes, &[1, 2, 3])
            .unwrap();
        assert_eq!(&frame.as_bytes()[..7], &[6, 0x00, 0x0A, 0x1A, 1, 2, 3]);
    }

    #[test]
    fn test_table_block_keeps_order() {
        let seq = CommandSequencer::starting_at(7);
        let mut frame = RequestFrame::new();
        frame
            .append_table(&seq, Register::TempTable, &[25, 30, 35, 40, 45])
            .unwrap();

        assert_eq!(
            &frame.as_bytes()[..15],
            &[14, 7, 0x0A, 0x1A, 10, 25, 0, 30, 0, 35, 0, 40, 0, 45, 0]
        );
    }

    #[test]
    fn test_overflow_leaves_frame_untouched() {
        let seq = CommandSequencer::new();
        let mut frame = RequestFrame::new();
        // 20 reads of 3 bytes each fill 60 of 63 bytes
        for _ in 0..20 {
            frame.push(&seq, Operation::ReadMode, &[]).unwrap();
        }
        frame.push(&seq, Operation::ReadMode, &[]).unwrap();
        assert_eq!(frame.cursor(), 63);

        let before = frame.clone();
        let err = frame.push_u8(&seq, Operation::SelectChannel, 0).unwrap_err();
        assert_eq!(err, FrameError::Overflow { cursor: 63, needed: 4 });
        assert_eq!(frame, before);
        assert_eq!(seq.peek(), 21);
    }

    #[test]
    fn test_status_query() {
        let seq = CommandSequencer::starting_at(0x42);
        let frame = RequestFrame::status_query(&seq);
        assert_eq!(&frame.as_bytes()[..4], &[0x3F, 0x42, 0xFF, 0x00]);
        assert!(frame.commands().is_empty());
    }

    fn any_op() -> impl Strategy<Value = Operation> {
        prop_oneof![
            Just(Operation::SelectChannel),
            Just(Operation::FanCount),
            Just(Operation::ReadMode),
            Just(Operation::WriteMode),
            Just(Operation::ReadFixedRpm),
            Just(Operation::WriteFixedRpm),
            Just(Operation::WriteFixedPwm),
            Just(Operation::ReadRpm),
            Just(Operation::WriteTempTable),
        ]
    }

    proptest! {
        #[test]
        fn prop_cursor_is_sum_of_widths(ops in proptest::collection::vec(any_op(), 0..30)) {
            let seq = CommandSequencer::new();
            let mut frame = RequestFrame::new();
            let mut total = 0usize;

            for op in ops {
                let width = 3 + op.spec().opcode.request_width();
                let payload = vec![0xAB; op.spec().opcode.request_width()];
                let before = frame.clone();
                let result = frame.push(&seq, op, &payload);

                if total + width <= 63 {
                    prop_assert!(result.is_ok());
                    total += width;
                } else {
                    prop_assert!(
                        matches!(result, Err(FrameError::Overflow { .. })),
                        "expected overflow"
                    );
                    prop_assert_eq!(&frame, &before);
                }
                prop_assert_eq!(frame.cursor(), total);
            }
        }
    }
}
