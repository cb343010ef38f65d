use std::path::Path;

use crate::models::error::CaptureError;

/// Receiver for recorder notifications.
///
/// Called from the thread that drives the recorder, or from the recorder's
/// broadcast thread for `on_recording_finished`. Implementations marshal to
/// the UI thread if needed.
pub trait RecordingListener: Send + Sync {
    /// Recording started (`true`) or stopped (`false`).
    fn on_recording_state_changed(&self, recording: bool);

    /// A recording was finalized into `directory`.
    fn on_recording_finished(&self, directory: &Path);

    /// A capture or conversion error was handled by the recorder.
    fn on_error(&self, error: &CaptureError);
}

/// Listener that only logs.
pub struct LogListener;

impl RecordingListener for LogListener {
    fn on_recording_state_changed(&self, recording: bool) {
        log::info!("recording state: {}", if recording { "recording call" } else { "waiting for call" });
    }

    fn on_recording_finished(&self, directory: &Path) {
        log::info!("recording finished in {}", directory.display());
    }

    fn on_error(&self, error: &CaptureError) {
        log::error!("recording error: {}", error);
    }
}
