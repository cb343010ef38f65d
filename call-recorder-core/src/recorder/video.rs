use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use super::base::RecorderCore;
use crate::models::config::RecorderConfig;
use crate::models::error::CaptureError;
use crate::models::session::RecordingSession;
use crate::traits::call_recorder::CallRecorder;
use crate::traits::recording_listener::RecordingListener;
use crate::traits::session_capture::{SessionCapture, SessionGuard};

struct ActiveSession {
    session: RecordingSession,
    guard: SessionGuard,
}

/// Call recorder over platform session capture.
///
/// The platform session writes the raw file itself; this recorder only
/// drives its lifecycle and runs the shared conversion on stop.
pub struct VideoCallRecorder<C: SessionCapture> {
    capture: C,
    core: RecorderCore,
    active: Mutex<Option<ActiveSession>>,
}

impl<C: SessionCapture> VideoCallRecorder<C> {
    pub fn new(
        capture: C,
        config: RecorderConfig,
        listener: Arc<dyn RecordingListener>,
    ) -> Result<Self, CaptureError> {
        Ok(Self {
            capture,
            core: RecorderCore::new(config, listener)?,
            active: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.core.config
    }

    fn open_session(&self, session: &RecordingSession) -> Result<SessionGuard, CaptureError> {
        let format = self.core.config.capture_format();
        let mut guard = SessionGuard::new(self.capture.prepare(&format, &session.raw_file_path)?);
        guard.start()?;
        Ok(guard)
    }
}

impl<C: SessionCapture> CallRecorder for VideoCallRecorder<C> {
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
        match self.open_session(&session) {
            Ok(guard) => {
                self.core.recording.store(true, Ordering::SeqCst);
                self.core.mark_started(&session);
                *active = Some(ActiveSession { session, guard });
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start session recording: {}", e);
                self.core.discard(&session);
                Err(e)
            }
        }
    }

    fn stop_call_recording(&self) -> Result<Option<RecordingSession>, CaptureError> {
        let mut active = self.active.lock();
        let Some(ActiveSession { mut session, guard }) = active.take() else {
            return Ok(None);
        };

        self.core.recording.store(false, Ordering::SeqCst);

        let bytes = match guard.finish() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Capture session did not stop cleanly: {}", e);
                self.core.listener.on_error(&e);
                fs::metadata(&session.raw_file_path).map(|m| m.len()).unwrap_or(0)
            }
        };
        session.set_bytes_captured(bytes)?;

        log::info!("Session recording stopped after {} bytes", bytes);
        Ok(Some(self.core.finalize(session)))
    }

    fn is_recording(&self) -> bool {
        self.core.is_recording()
    }

    fn destroy(&self) {
        self.core.destroy();
    }
}
