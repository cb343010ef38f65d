use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::audio_models::CaptureFormat;
use super::error::CaptureError;
use super::state::SessionState;

/// One start-to-stop recording lifecycle.
///
/// Owned by the recorder while capturing. State only moves forward, and a
/// session in a terminal state rejects every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    pub id: String,
    pub started_at: DateTime<Local>,
    pub raw_file_path: PathBuf,
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
    final_file_path: Option<PathBuf>,
    bytes_captured: u64,
    state: SessionState,
}

impl RecordingSession {
    pub fn new(raw_file_path: PathBuf, started_at: DateTime<Local>, format: &CaptureFormat) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            raw_file_path,
            sample_rate_hz: format.sample_rate_hz,
            channel_count: format.channel_count(),
            bits_per_sample: format.bits_per_sample(),
            final_file_path: None,
            bytes_captured: 0,
            state: SessionState::Capturing,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn final_file_path(&self) -> Option<&Path> {
        self.final_file_path.as_deref()
    }

    pub fn bytes_captured(&self) -> u64 {
        self.bytes_captured
    }

    /// Bytes per second of the raw stream.
    pub fn byte_rate(&self) -> u64 {
        self.sample_rate_hz as u64 * self.channel_count as u64 * self.bits_per_sample as u64 / 8
    }

    /// Record the byte count reported by the capture backend.
    pub fn set_bytes_captured(&mut self, bytes: u64) -> Result<(), CaptureError> {
        if !self.state.is_capturing() {
            return Err(self.rejected("capturing"));
        }
        self.bytes_captured = bytes;
        Ok(())
    }

    pub fn begin_conversion(&mut self) -> Result<(), CaptureError> {
        self.transition(SessionState::Converting)
    }

    pub fn complete(&mut self, final_file_path: PathBuf) -> Result<(), CaptureError> {
        self.transition(SessionState::Completed)?;
        self.final_file_path = Some(final_file_path);
        Ok(())
    }

    pub fn fail(&mut self, error: CaptureError) -> Result<(), CaptureError> {
        self.transition(SessionState::Failed(error))
    }

    fn transition(&mut self, next: SessionState) -> Result<(), CaptureError> {
        if !self.state.can_transition_to(&next) {
            return Err(self.rejected(next.name()));
        }
        self.state = next;
        Ok(())
    }

    fn rejected(&self, to: &'static str) -> CaptureError {
        CaptureError::InvalidTransition {
            from: self.state.name(),
            to,
        }
    }
}
