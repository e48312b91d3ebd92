//! Frame transport for Platinum devices.
//!
//! The protocol only needs two primitives: write one 64-byte frame, read one
//! 64-byte frame. [`HidTransport`] provides them over `hidapi`.

use hidapi::{HidApi, HidDevice};
use tracing::trace;

use crate::config::DeviceDescriptor;
use crate::error::{Result, TransportError};
use crate::protocol::FRAME_LENGTH;

/// Synchronous frame transport.
///
/// Endpoints are opaque identifiers taken from the device descriptor.
pub trait Transport {
    /// Send one frame.
    fn write(
        &mut self,
        endpoint: u8,
        frame: &[u8; FRAME_LENGTH],
    ) -> std::result::Result<(), TransportError>;

    /// Receive one frame, returning the number of bytes delivered.
    fn read(
        &mut self,
        endpoint: u8,
        frame: &mut [u8; FRAME_LENGTH],
    ) -> std::result::Result<usize, TransportError>;
}

/// HID transport.
///
/// hidapi picks the interrupt endpoints itself, so the endpoint arguments are
/// only logged.
pub struct HidTransport {
    device: HidDevice,
    timeout_ms: i32,
}

impl HidTransport {
    /// Open the device described by `descriptor` (first match on VID/PID).
    pub fn open(descriptor: &DeviceDescriptor) -> Result<Self> {
        let api = HidApi::new().map_err(TransportError::Hid)?;
        let device = api
            .open(descriptor.vendor_id, descriptor.product_id)
            .map_err(TransportError::Hid)?;
        Ok(Self::new(device, descriptor.timeout_ms))
    }

    /// Open a device by HID path.
    ///
    /// Useful when more than one cooler is connected.
    pub fn open_path(path: &std::ffi::CStr, timeout_ms: i32) -> Result<Self> {
        let api = HidApi::new().map_err(TransportError::Hid)?;
        let device = api.open_path(path).map_err(TransportError::Hid)?;
        Ok(Self::new(device, timeout_ms))
    }

    pub fn new(device: HidDevice, timeout_ms: i32) -> Self {
        Self { device, timeout_ms }
    }
}

impl Transport for HidTransport {
    fn write(
        &mut self,
        endpoint: u8,
        frame: &[u8; FRAME_LENGTH],
    ) -> std::result::Result<(), TransportError> {
        // Report ID 0 goes first; the device uses unnumbered reports
        let mut buf = [0u8; FRAME_LENGTH + 1];
        buf[1..].copy_from_slice(frame);

        let written = self.device.write(&buf)?;
        trace!(endpoint, written, "hid write");
        if written < FRAME_LENGTH {
            return Err(TransportError::ShortWrite {
                written,
                expected: FRAME_LENGTH,
            });
        }
        Ok(())
    }

    fn read(
        &mut self,
        endpoint: u8,
        frame: &mut [u8; FRAME_LENGTH],
    ) -> std::result::Result<usize, TransportError> {
        let read = self.device.read_timeout(frame, self.timeout_ms)?;
        trace!(endpoint, read, "hid read");
        Ok(read)
    }
}

impl std::fmt::Debug for HidTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HidTransport")
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
