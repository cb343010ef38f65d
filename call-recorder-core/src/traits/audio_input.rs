use std::ops::{Deref, DerefMut};

use crate::models::audio_models::{CaptureFormat, DeviceState};
use crate::models::error::CaptureError;

/// An open raw-sample capture device.
///
/// Owned by exactly one recorder session. `read` blocks until samples are
/// available, the device's internal timeout elapses (returns `Ok(0)`), or the
/// device is stopped.
pub trait AudioDeviceHandle: Send {
    /// Whether the device finished initializing after `open`.
    fn state(&self) -> DeviceState;

    /// Begin delivering samples.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Read interleaved PCM bytes into `buf`, returning how many were filled.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError>;

    /// Copy samples the device already buffered into `buf` without waiting.
    ///
    /// Called after recording ends to collect what was captured before the
    /// stop. Returns `Ok(0)` once nothing is left. Devices that do not buffer
    /// keep the default.
    fn read_pending(&mut self, _buf: &mut [u8]) -> Result<usize, CaptureError> {
        Ok(0)
    }

    /// Stop delivering samples. Pending reads return.
    fn stop(&mut self) -> Result<(), CaptureError>;

    /// Free the hardware resource. The handle is unusable afterwards.
    fn release(&mut self);
}

/// Interface for platform raw-buffer capture.
///
/// Implemented by:
/// - `CpalAudioInput` (call-recorder-cpal)
pub trait AudioInput: Send + Sync {
    /// Open a capture device for `format` with an internal buffer of at least
    /// `buffer_bytes`.
    fn open(
        &self,
        format: &CaptureFormat,
        buffer_bytes: usize,
    ) -> Result<Box<dyn AudioDeviceHandle>, CaptureError>;
}

/// Stops and releases the wrapped device when dropped, unless released first.
pub struct DeviceGuard {
    handle: Box<dyn AudioDeviceHandle>,
    released: bool,
}

impl DeviceGuard {
    pub fn new(handle: Box<dyn AudioDeviceHandle>) -> Self {
        Self {
            handle,
            released: false,
        }
    }

    /// Stop and release now.
    pub fn release(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.handle.stop() {
            log::warn!("Failed to stop capture device: {}", e);
        }
        self.handle.release();
    }
}

impl Deref for DeviceGuard {
    type Target = dyn AudioDeviceHandle;

    fn deref(&self) -> &Self::Target {
        &*self.handle
    }
}

impl DerefMut for DeviceGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.handle
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        self.shutdown();
    }
}
