use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::RecorderConfig;
use crate::models::error::CaptureError;
use crate::models::recording_metadata::RecordingMetadata;
use crate::models::session::RecordingSession;
use crate::processing::wav_encoder::{self, WavSpec};
use crate::storage::metadata;
use crate::storage::recordings_dir::{RecordingsDir, WAV_EXTENSION};
use crate::traits::recording_listener::RecordingListener;
use crate::util::cancel::CancelToken;

/// State and finalize path shared by both recorder variants.
pub(crate) struct RecorderCore {
    pub(crate) config: RecorderConfig,
    pub(crate) dir: RecordingsDir,
    pub(crate) listener: Arc<dyn RecordingListener>,
    pub(crate) recording: Arc<AtomicBool>,
    cancel: CancelToken,
    broadcasts: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl RecorderCore {
    pub(crate) fn new(config: RecorderConfig, listener: Arc<dyn RecordingListener>) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(Self {
            dir: RecordingsDir::new(config.recordings_dir.clone()),
            config,
            listener,
            recording: Arc::new(AtomicBool::new(false)),
            cancel: CancelToken::new(),
            broadcasts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), CaptureError> {
        if self.cancel.is_cancelled() {
            return Err(CaptureError::Destroyed);
        }
        Ok(())
    }

    /// Create the session record and pick its raw file path.
    pub(crate) fn begin_session(&self) -> Result<RecordingSession, CaptureError> {
        self.dir.ensure()?;
        let started_at = chrono::Local::now();
        let stem = self.dir.allocate_stem(&started_at);
        let format = self.config.capture_format();
        Ok(RecordingSession::new(self.dir.raw_path(&stem), started_at, &format))
    }

    /// Remove the raw file of a session that never started.
    pub(crate) fn discard(&self, session: &RecordingSession) {
        if session.raw_file_path.exists() {
            if let Err(e) = fs::remove_file(&session.raw_file_path) {
                log::warn!("Failed to remove {}: {}", session.raw_file_path.display(), e);
            }
        }
    }

    pub(crate) fn mark_started(&self, session: &RecordingSession) {
        log::info!("Call recording started: {}", session.raw_file_path.display());
        self.listener.on_recording_state_changed(true);
    }

    /// Convert the stopped session's raw file and, on success, schedule the
    /// finished event. Returns the session in its terminal state.
    pub(crate) fn finalize(&self, mut session: RecordingSession) -> RecordingSession {
        self.listener.on_recording_state_changed(false);

        if let Err(e) = session.begin_conversion() {
            log::error!("Cannot convert session {}: {}", session.id, e);
            return session;
        }

        let wav_path = session.raw_file_path.with_extension(WAV_EXTENSION);
        let spec = WavSpec {
            channels: session.channel_count,
            sample_rate: session.sample_rate_hz,
            bits_per_sample: session.bits_per_sample,
        };

        match wav_encoder::encode_file(&session.raw_file_path, &wav_path, &spec) {
            Ok(data_bytes) => {
                if let Err(e) = session.complete(wav_path.clone()) {
                    log::error!("Cannot complete session {}: {}", session.id, e);
                    return session;
                }
                log::info!("Call recording saved: {} ({} bytes)", wav_path.display(), data_bytes);
                self.write_sidecar(&session, &wav_path, data_bytes);
                self.schedule_finished(self.dir.path().to_path_buf());
            }
            Err(e) => {
                log::error!(
                    "Conversion failed, keeping raw capture {}: {}",
                    session.raw_file_path.display(),
                    e
                );
                self.listener.on_error(&e);
                if let Err(e) = session.fail(e) {
                    log::error!("Cannot fail session {}: {}", session.id, e);
                }
            }
        }
        session
    }

    fn write_sidecar(&self, session: &RecordingSession, wav_path: &Path, data_bytes: u64) {
        let checksum = match metadata::sha256_file(wav_path) {
            Ok(sum) => sum,
            Err(e) => {
                log::warn!("Failed to checksum {}: {}", wav_path.display(), e);
                String::new()
            }
        };
        let meta = RecordingMetadata::new(session, data_bytes, checksum);
        if let Err(e) = metadata::write_metadata(&meta, wav_path) {
            log::warn!("Failed to write metadata for {}: {}", wav_path.display(), e);
        }
    }

    /// Emit `on_recording_finished` after the settle delay unless destroyed first.
    fn schedule_finished(&self, directory: PathBuf) {
        let token = self.cancel.clone();
        let listener = Arc::clone(&self.listener);
        let delay = self.config.settle_delay;

        let spawned = thread::Builder::new()
            .name("recording-finished".into())
            .spawn(move || {
                if token.wait_timeout(delay) {
                    log::debug!("Finished event for {} cancelled", directory.display());
                    return;
                }
                listener.on_recording_finished(&directory);
            });

        match spawned {
            Ok(handle) => {
                let mut broadcasts = self.broadcasts.lock();
                broadcasts.retain(|h| !h.is_finished());
                broadcasts.push(handle);
            }
            Err(e) => log::error!("Failed to schedule finished event: {}", e),
        }
    }

    pub(crate) fn destroy(&self) {
        if self.is_recording() {
            log::warn!("Recorder destroyed while recording; capture continues until stopped");
        }
        self.cancel.cancel();

        let current = thread::current().id();
        let handles: Vec<_> = self.broadcasts.lock().drain(..).collect();
        for handle in handles {
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }
}
