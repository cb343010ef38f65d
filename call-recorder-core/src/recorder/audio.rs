use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::base::RecorderCore;
use crate::models::audio_models::DeviceState;
use crate::models::config::RecorderConfig;
use crate::models::error::CaptureError;
use crate::models::session::RecordingSession;
use crate::storage::sample_writer::{SampleWriter, WriterOutcome};
use crate::traits::audio_input::{AudioInput, DeviceGuard};
use crate::traits::call_recorder::CallRecorder;
use crate::traits::recording_listener::RecordingListener;

struct ActiveCapture {
    session: RecordingSession,
    writer: thread::JoinHandle<(DeviceGuard, WriterOutcome)>,
}

/// Call recorder over raw sample-buffer capture.
///
/// Data flow:
/// ```text
/// [AudioInput] → [AudioDeviceHandle] → [SampleWriter thread] → <stem>.pcm
///                                                   stop → [WavEncoder] → <stem>.wav
/// ```
pub struct AudioCallRecorder<I: AudioInput> {
    input: I,
    core: RecorderCore,
    active: Mutex<Option<ActiveCapture>>,
}

impl<I: AudioInput> AudioCallRecorder<I> {
    pub fn new(
        input: I,
        config: RecorderConfig,
        listener: Arc<dyn RecordingListener>,
    ) -> Result<Self, CaptureError> {
        Ok(Self {
            input,
            core: RecorderCore::new(config, listener)?,
            active: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.core.config
    }

    /// Open and initialize the device, then start the writer thread.
    fn open_capture(&self, session: &RecordingSession) -> Result<thread::JoinHandle<(DeviceGuard, WriterOutcome)>, CaptureError> {
        let format = self.core.config.capture_format();
        let frame_bytes = self.core.config.frame_bytes;

        let mut device = DeviceGuard::new(self.input.open(&format, frame_bytes)?);
        if device.state() != DeviceState::Initialized {
            return Err(CaptureError::DeviceInitFailed(format!(
                "device did not initialize for {} Hz / {} ch",
                format.sample_rate_hz,
                format.channel_count()
            )));
        }

        let writer = SampleWriter::create(&session.raw_file_path, frame_bytes)?;
        device.start()?;

        // Only an initialized, started device flips the flag.
        self.core.recording.store(true, Ordering::SeqCst);

        let recording = Arc::clone(&self.core.recording);
        let listener = Arc::clone(&self.core.listener);
        let spawned = thread::Builder::new()
            .name("call-sample-writer".into())
            .spawn(move || {
                let mut device = device;
                let outcome = writer.run(&recording, &mut *device);
                if let Some(ref e) = outcome.error {
                    listener.on_error(e);
                }
                (device, outcome)
            });

        spawned.map_err(|e| {
            self.core.recording.store(false, Ordering::SeqCst);
            CaptureError::Unknown(format!("failed to spawn writer thread: {}", e))
        })
    }
}

impl<I: AudioInput> CallRecorder for AudioCallRecorder<I> {
    fn start_call_recording(&self) -> Result<(), CaptureError> {
        self.core.ensure_alive()?;
        if self.core.is_recording() {
            return Ok(());
        }
        let mut active = self.active.lock();
        if active.is_some() {
            return Ok(());
        }

        let session = self.core.begin_session()?;
        match self.open_capture(&session) {
            Ok(writer) => {
                self.core.mark_started(&session);
                *active = Some(ActiveCapture { session, writer });
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start call recording: {}", e);
                self.core.discard(&session);
                Err(e)
            }
        }
    }

    fn stop_call_recording(&self) -> Result<Option<RecordingSession>, CaptureError> {
        let mut active = self.active.lock();
        let Some(capture) = active.take() else {
            return Ok(None);
        };

        // Clear the flag first; the writer finishes its read, drains, and exits.
        self.core.recording.store(false, Ordering::SeqCst);
        let mut session = capture.session;

        let bytes = match capture.writer.join() {
            Ok((device, outcome)) => {
                device.release();
                outcome.bytes_written
            }
            Err(_) => {
                log::error!("Sample writer thread panicked");
                fs::metadata(&session.raw_file_path).map(|m| m.len()).unwrap_or(0)
            }
        };
        session.set_bytes_captured(bytes)?;

        log::info!("Call recording stopped after {} bytes", bytes);
        Ok(Some(self.core.finalize(session)))
    }

    fn is_recording(&self) -> bool {
        self.core.is_recording()
    }

    fn destroy(&self) {
        self.core.destroy();
    }
}
