//! Session capture over a `cpal` input stream.
//!
//! The stream callback appends PCM16 straight to the session's raw file,
//! so no writer thread is involved.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use call_recorder_core::models::audio_models::{CaptureFormat, DeviceState};
use call_recorder_core::models::error::CaptureError;
use call_recorder_core::traits::session_capture::{CaptureSessionHandle, SessionCapture};

use crate::stream::StreamThread;

/// `SessionCapture` backed by the default (or a named) `cpal` input device.
#[derive(Default)]
pub struct CpalSessionCapture {
    device_name: Option<String>,
}

impl CpalSessionCapture {
    pub fn default_device() -> Self {
        Self { device_name: None }
    }

    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }
}

impl SessionCapture for CpalSessionCapture {
    fn prepare(&self, format: &CaptureFormat, output: &Path) -> Result<Box<dyn CaptureSessionHandle>, CaptureError> {
        let sink = FileSink::create(output)?;
        let callback_sink = sink.clone();

        let stream = StreamThread::spawn(
            "cpal-call-session",
            self.device_name.clone(),
            format,
            Box::new(move |bytes: &[u8]| callback_sink.write(bytes)),
        )?;
        if stream.state() != DeviceState::Initialized {
            return Err(CaptureError::DeviceInitFailed(format!(
                "input stream not initialized for {} Hz / {} ch",
                format.sample_rate_hz,
                format.channel_count()
            )));
        }

        Ok(Box::new(CpalSession { stream, sink }))
    }
}

struct CpalSession {
    stream: StreamThread,
    sink: FileSink,
}

impl CaptureSessionHandle for CpalSession {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.stream.play()
    }

    fn stop(&mut self) -> Result<u64, CaptureError> {
        if let Err(e) = self.stream.pause() {
            log::warn!("Failed to pause input stream: {}", e);
        }
        let failed = self.stream.has_failed();
        // Closing joins the owner thread, so no callback runs after this.
        self.stream.close();

        let bytes = self.sink.finish()?;
        if failed {
            log::warn!("Input stream reported errors; recording may have gaps");
        }
        Ok(bytes)
    }

    fn release(&mut self) {
        self.stream.close();
    }
}

struct SinkState {
    writer: Option<BufWriter<File>>,
    bytes: u64,
    error: Option<CaptureError>,
}

/// Raw output file shared between the stream callback and the session.
#[derive(Clone)]
struct FileSink {
    inner: Arc<Mutex<SinkState>>,
}

impl FileSink {
    fn create(path: &Path) -> Result<Self, CaptureError> {
        let file = File::create(path).map_err(|e| CaptureError::storage("failed to create raw file", e))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(SinkState {
                writer: Some(BufWriter::new(file)),
                bytes: 0,
                error: None,
            })),
        })
    }

    /// Append `data`. The first failure closes the sink; later writes are ignored.
    fn write(&self, data: &[u8]) {
        let mut state = self.inner.lock();
        let Some(writer) = state.writer.as_mut() else {
            return;
        };
        match writer.write_all(data) {
            Ok(()) => state.bytes += data.len() as u64,
            Err(e) => {
                log::error!("Failed to write session audio: {}", e);
                state.writer = None;
                state.error = Some(CaptureError::storage("write failed", e));
            }
        }
    }

    /// Flush and close. Returns the bytes written, or the first write error.
    fn finish(&self) -> Result<u64, CaptureError> {
        let mut state = self.inner.lock();
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| CaptureError::storage("flush failed", e))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| CaptureError::storage("sync failed", e))?;
        }
        match state.error.take() {
            Some(e) => Err(e),
            None => Ok(state.bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn sink_appends_and_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("call.pcm");
        let sink = FileSink::create(&path).unwrap();

        sink.write(&[1, 2, 3, 4]);
        sink.clone().write(&[5, 6]);

        assert_eq!(sink.finish().unwrap(), 6);
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn writes_after_finish_are_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("call.pcm");
        let sink = FileSink::create(&path).unwrap();

        sink.write(&[9; 8]);
        assert_eq!(sink.finish().unwrap(), 8);
        sink.write(&[1; 8]);

        assert_eq!(sink.finish().unwrap(), 8);
        assert_eq!(fs::metadata(&path).unwrap().len(), 8);
    }

    #[test]
    fn create_fails_in_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let result = FileSink::create(&tmp.path().join("absent").join("call.pcm"));
        assert!(matches!(result, Err(CaptureError::StorageError(_))));
    }
}
