use crate::models::audio_mode::AudioMode;
use crate::models::error::CaptureError;

/// Pull-style access to the platform's current audio mode.
///
/// Used by `ModePoller` where no mode-change listener exists.
pub trait AudioModeSource: Send {
    fn current_mode(&self) -> Result<AudioMode, CaptureError>;
}

impl<F> AudioModeSource for F
where
    F: Fn() -> Result<AudioMode, CaptureError> + Send,
{
    fn current_mode(&self) -> Result<AudioMode, CaptureError> {
        self()
    }
}
