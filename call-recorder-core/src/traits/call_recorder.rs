use crate::models::error::CaptureError;
use crate::models::session::RecordingSession;

/// Records one call at a time.
///
/// Variants differ in capture strategy and are picked at construction:
/// `AudioCallRecorder` (raw buffer capture) and `VideoCallRecorder`
/// (platform session capture).
pub trait CallRecorder: Send + Sync {
    /// Start capturing. No-op when already recording.
    fn start_call_recording(&self) -> Result<(), CaptureError>;

    /// Stop capturing and convert the raw file.
    ///
    /// Returns `None` when nothing was recording, otherwise the finished
    /// session (completed or failed).
    fn stop_call_recording(&self) -> Result<Option<RecordingSession>, CaptureError>;

    /// Safe to call from any thread.
    fn is_recording(&self) -> bool;

    /// Cancel pending background work. Stop first; an in-flight device read is
    /// not interrupted.
    fn destroy(&self);
}
