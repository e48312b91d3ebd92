//! Platinum cooler device session.
//!
//! High-level interface for the fan and pump channels of Hydro Platinum
//! coolers. Every operation is one request frame followed by one reply.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::config::{DeviceDescriptor, PumpMode};
use crate::device::transport::{HidTransport, Transport};
use crate::error::{PlatinumError, Result};
use crate::protocol::response::{self, fan_speed_offsets, validate_length};
use crate::protocol::{
    CONNECTED_BIT, CommandSequencer, CurveTable, FRAME_LENGTH, FanMode, FirmwareVersion,
    ModeSetting, ModeStatus, Operation, PIN_TYPE_BIT, ParsedFields, Register, RequestFrame,
    UNKNOWN_MAX_SPEED,
};

// =============================================================================
// Channel State
// =============================================================================

/// State of one fan channel, filled in by the fan operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanControl {
    pub channel: u8,
    /// Fans driven by the unit (pump excluded).
    pub fan_count: u8,
    /// Raw mode byte.
    pub mode: u8,
    pub speed_rpm: u16,
    pub speed_pwm: u8,
    pub max_speed: u16,
}

impl FanControl {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            ..Default::default()
        }
    }

    /// Decode the mode byte together with the matching fixed value.
    pub fn mode_status(&self) -> ModeStatus {
        let data = match ModeStatus::decode(self.mode, None) {
            ModeStatus::Connected {
                setting: ModeSetting::FixedPwm { .. },
                ..
            } => self.speed_pwm as u16,
            ModeStatus::Connected {
                setting: ModeSetting::FixedRpm { .. },
                ..
            } => self.speed_rpm,
            _ => 0,
        };
        ModeStatus::decode(self.mode, Some(data))
    }
}

/// State of the pump channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpControl {
    pub channel: u8,
    /// Raw mode byte.
    pub mode: u8,
    pub speed: u16,
    pub max_speed: u16,
    pub table: CurveTable,
}

impl PumpControl {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            ..Default::default()
        }
    }

    pub fn mode_status(&self) -> ModeStatus {
        ModeStatus::decode(self.mode, None)
    }
}

// =============================================================================
// PlatinumDevice
// =============================================================================

/// Vendor name reported for every Platinum device.
pub const VENDOR_NAME: &str = "Corsair";

/// Device id reported for the family (the device has no id register).
pub const PLATINUM_DEVICE_ID: u8 = 0xFF;

/// Platinum cooler session.
///
/// The transport sits behind a mutex held for each write+read pair, so one
/// session can be shared between threads. The sequencer can be shared between
/// sessions.
///
/// # Example
///
/// ```no_run
/// use platinum_cooler::config::DeviceDescriptor;
/// use platinum_cooler::device::{FanControl, PlatinumDevice};
/// use platinum_cooler::protocol::FanMode;
///
/// let descriptor = DeviceDescriptor::by_product_id(0x0C18).unwrap();
/// let cooler = PlatinumDevice::open(descriptor)?;
/// println!("Firmware: {}", cooler.firmware_version()?);
///
/// let mut fan = FanControl::new(0);
/// cooler.set_fan_mode(&mut fan, FanMode::FixedRpm(1200))?;
/// # Ok::<(), platinum_cooler::error::PlatinumError>(())
/// ```
pub struct PlatinumDevice<T> {
    transport: Mutex<T>,
    sequencer: Arc<CommandSequencer>,
    descriptor: DeviceDescriptor,
}

impl PlatinumDevice<HidTransport> {
    /// Open the cooler described by `descriptor` over HID.
    pub fn open(descriptor: DeviceDescriptor) -> Result<Self> {
        let transport = HidTransport::open(&descriptor)?;
        Ok(Self::new(transport, descriptor))
    }
}

impl<T: Transport> PlatinumDevice<T> {
    /// Session with its own sequencer.
    pub fn new(transport: T, descriptor: DeviceDescriptor) -> Self {
        Self::with_sequencer(transport, descriptor, Arc::new(CommandSequencer::new()))
    }

    /// Session drawing ids from a shared sequencer.
    pub fn with_sequencer(
        transport: T,
        descriptor: DeviceDescriptor,
        sequencer: Arc<CommandSequencer>,
    ) -> Self {
        Self {
            transport: Mutex::new(transport),
            sequencer,
            descriptor,
        }
    }

    pub fn sequencer(&self) -> &Arc<CommandSequencer> {
        &self.sequencer
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Give the transport back.
    pub fn into_transport(self) -> T {
        self.transport
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn product(&self) -> &str {
        &self.descriptor.name
    }

    pub fn vendor(&self) -> &'static str {
        VENDOR_NAME
    }

    pub fn device_id(&self) -> u8 {
        PLATINUM_DEVICE_ID
    }

    /// Read the firmware version from a status report.
    pub fn firmware_version(&self) -> Result<FirmwareVersion> {
        let frame = RequestFrame::status_query(&self.sequencer);
        let reply = self.transact(&frame)?;

        let version = FirmwareVersion::parse(&reply);
        debug!(%version, "firmware");
        Ok(version)
    }

    // =========================================================================
    // Fans
    // =========================================================================

    /// Read how many fans the unit drives.
    pub fn fan_count(&self, ctrl: &mut FanControl) -> Result<()> {
        let mut frame = RequestFrame::new();
        frame.push(&self.sequencer, Operation::FanCount, &[])?;

        let fields = self.query(&frame)?;
        // the reported count includes the pump
        ctrl.fan_count = (field(&fields, Register::FanCount) as u8).saturating_sub(1);
        debug!(fan_count = ctrl.fan_count, "fan count");
        Ok(())
    }

    /// Read the mode byte of `ctrl.channel`.
    pub fn fan_mode(&self, ctrl: &mut FanControl) -> Result<()> {
        ctrl.mode = self.read_mode(ctrl.channel)?;
        Ok(())
    }

    /// Read the mode, then the fixed RPM target.
    pub fn fan_fixed_rpm(&self, ctrl: &mut FanControl) -> Result<()> {
        self.fan_mode(ctrl)?;
        ctrl.speed_rpm = self.read_fixed(ctrl.channel, Operation::ReadFixedRpm)? as u16;
        debug!(channel = ctrl.channel, rpm = ctrl.speed_rpm, "fixed rpm");
        Ok(())
    }

    /// Read the mode, then the fixed PWM duty.
    pub fn fan_fixed_pwm(&self, ctrl: &mut FanControl) -> Result<()> {
        self.fan_mode(ctrl)?;
        ctrl.speed_pwm = self.read_fixed(ctrl.channel, Operation::ReadFixedPwm)? as u8;
        debug!(channel = ctrl.channel, pwm = ctrl.speed_pwm, "fixed pwm");
        Ok(())
    }

    /// Switch `ctrl.channel` to `mode`, writing the fixed value when the mode
    /// takes one.
    pub fn set_fan_mode(&self, ctrl: &mut FanControl, mode: FanMode) -> Result<()> {
        let seq = &*self.sequencer;
        let mut frame = RequestFrame::new();
        frame.push_u8(seq, Operation::SelectChannel, ctrl.channel)?;
        frame.push_u8(seq, Operation::WriteMode, mode.mode_byte())?;
        match mode {
            FanMode::FixedRpm(rpm) => {
                frame.push_u16(seq, Operation::WriteFixedRpm, rpm)?;
                ctrl.speed_rpm = rpm;
            }
            FanMode::FixedPwm(pwm) => {
                frame.push_u8(seq, Operation::WriteFixedPwm, pwm)?;
                ctrl.speed_pwm = pwm;
            }
            _ => {}
        }

        self.transact(&frame)?;
        // the device reports the channel connected once it accepts a mode
        ctrl.mode = CONNECTED_BIT | (ctrl.mode & PIN_TYPE_BIT) | mode.mode_byte();
        debug!(channel = ctrl.channel, %mode, "fan mode set");
        Ok(())
    }

    /// Fixed RPM mode at `ctrl.speed_rpm`.
    pub fn set_fan_fixed_rpm(&self, ctrl: &mut FanControl) -> Result<()> {
        self.set_fan_mode(ctrl, FanMode::FixedRpm(ctrl.speed_rpm))
    }

    /// Fixed PWM mode at `ctrl.speed_pwm`.
    pub fn set_fan_fixed_pwm(&self, ctrl: &mut FanControl) -> Result<()> {
        self.set_fan_mode(ctrl, FanMode::FixedPwm(ctrl.speed_pwm))
    }

    /// Read the live speed of `ctrl.channel`.
    ///
    /// Needs `ctrl.fan_count` (see [`fan_count`](Self::fan_count)): where the
    /// speed sits in the reply depends on the variant.
    pub fn fan_speed(&self, ctrl: &mut FanControl) -> Result<()> {
        if fan_speed_offsets(ctrl.fan_count).is_none() {
            return Err(PlatinumError::UnsupportedVariant {
                fan_count: ctrl.fan_count,
            });
        }

        let seq = &*self.sequencer;
        let mut frame = RequestFrame::new();
        frame.push_u8(seq, Operation::SelectChannel, ctrl.channel)?;
        frame.push(seq, Operation::ReadRpm, &[])?;
        frame.push(seq, Operation::ReadMaxRecordedRpm, &[])?;

        let reply = self.transact(&frame)?;
        ctrl.speed_rpm = response::fan_speed(&reply, ctrl.fan_count)?;
        ctrl.max_speed = UNKNOWN_MAX_SPEED;
        debug!(channel = ctrl.channel, rpm = ctrl.speed_rpm, "fan speed");
        Ok(())
    }

    // =========================================================================
    // Pump
    // =========================================================================

    /// Read the mode byte of the pump channel.
    pub fn pump_mode(&self, ctrl: &mut PumpControl) -> Result<()> {
        ctrl.mode = self.read_mode(ctrl.channel)?;
        Ok(())
    }

    /// Upload `ctrl.table`: temperatures, then speeds, in one frame.
    pub fn set_pump_curve(&self, ctrl: &PumpControl) -> Result<()> {
        let seq = &*self.sequencer;
        let mut frame = RequestFrame::new();
        frame.append_table(
            seq,
            Operation::WriteTempTable.spec().register,
            &ctrl.table.temperatures(),
        )?;
        frame.append_table(
            seq,
            Operation::WriteRpmTable.spec().register,
            &ctrl.table.speeds(),
        )?;

        self.transact(&frame)?;
        debug!(channel = ctrl.channel, table = %ctrl.table, "pump curve set");
        Ok(())
    }

    /// Load the preset curve for `mode` (Custom keeps `ctrl.table`) and upload it.
    pub fn set_pump_mode(&self, ctrl: &mut PumpControl, mode: PumpMode) -> Result<()> {
        if let Some(table) = mode.preset() {
            ctrl.table = table;
        }
        self.set_pump_curve(ctrl)
    }

    /// Read the live pump speed from a status report.
    pub fn pump_speed(&self, ctrl: &mut PumpControl) -> Result<()> {
        let frame = RequestFrame::status_query(&self.sequencer);
        let reply = self.transact(&frame)?;

        ctrl.speed = response::pump_speed(&reply);
        ctrl.max_speed = UNKNOWN_MAX_SPEED;
        debug!(rpm = ctrl.speed, "pump speed");
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_mode(&self, channel: u8) -> Result<u8> {
        let seq = &*self.sequencer;
        let mut frame = RequestFrame::new();
        frame.push_u8(seq, Operation::SelectChannel, channel)?;
        frame.push(seq, Operation::ReadMode, &[])?;

        let fields = self.query(&frame)?;
        let mode = field(&fields, Register::FanMode) as u8;
        debug!(channel, "mode {:#04x}", mode);
        Ok(mode)
    }

    /// Select `channel` and read one fixed value in the same frame.
    fn read_fixed(&self, channel: u8, op: Operation) -> Result<u32> {
        let seq = &*self.sequencer;
        let mut frame = RequestFrame::new();
        frame.push_u8(seq, Operation::SelectChannel, channel)?;
        frame.push(seq, op, &[])?;

        let fields = self.query(&frame)?;
        Ok(field(&fields, op.spec().register))
    }

    fn query(&self, frame: &RequestFrame) -> Result<ParsedFields> {
        let reply = self.transact(frame)?;
        Ok(response::parse(&reply, &frame.specs()))
    }

    /// One write followed by one read, under the transport lock.
    fn transact(&self, frame: &RequestFrame) -> Result<[u8; FRAME_LENGTH]> {
        let mut transport = self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        trace!(request = ?frame.as_bytes(), "write");
        transport.write(self.descriptor.write_endpoint, frame.as_bytes())?;

        let mut reply = [0u8; FRAME_LENGTH];
        let read = transport.read(self.descriptor.read_endpoint, &mut reply)?;
        validate_length(read)?;
        trace!(reply = ?reply, "read");
        Ok(reply)
    }
}

fn field(fields: &ParsedFields, register: Register) -> u32 {
    fields.value(register).unwrap_or_default()
}

impl<T> std::fmt::Debug for PlatinumDevice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatinumDevice")
            .field("descriptor", &self.descriptor)
            .field("next_id", &self.sequencer.peek())
            .finish_non_exhaustive()
    }
}
