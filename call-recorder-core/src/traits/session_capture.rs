use std::path::Path;

use crate::models::audio_models::CaptureFormat;
use crate::models::error::CaptureError;

/// A prepared recorder session that writes raw PCM straight to its output file.
pub trait CaptureSessionHandle: Send {
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop recording and close the output file. Returns the bytes written.
    fn stop(&mut self) -> Result<u64, CaptureError>;

    fn release(&mut self);
}

/// Interface for platform session capture: the platform owns the write loop.
///
/// Implemented by:
/// - `CpalSessionCapture` (call-recorder-cpal)
pub trait SessionCapture: Send + Sync {
    /// Prepare a session recording `format` into `output`.
    fn prepare(
        &self,
        format: &CaptureFormat,
        output: &Path,
    ) -> Result<Box<dyn CaptureSessionHandle>, CaptureError>;
}

/// Releases the wrapped session when dropped, unless finished first.
pub struct SessionGuard {
    handle: Box<dyn CaptureSessionHandle>,
    released: bool,
}

impl SessionGuard {
    pub fn new(handle: Box<dyn CaptureSessionHandle>) -> Self {
        Self {
            handle,
            released: false,
        }
    }

    pub fn start(&mut self) -> Result<(), CaptureError> {
        self.handle.start()
    }

    /// Stop, then release. Returns the bytes the session wrote.
    pub fn finish(mut self) -> Result<u64, CaptureError> {
        self.released = true;
        let result = self.handle.stop();
        self.handle.release();
        result
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.handle.stop() {
            log::warn!("Failed to stop capture session: {}", e);
        }
        self.handle.release();
    }
}
