use serde::{Deserialize, Serialize};

use super::session::RecordingSession;

/// Metadata written as a JSON sidecar next to a finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub started_at: String,
    pub finished_at: String,
    pub file_path: String,
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
    pub duration_secs: f64,
    pub checksum: String,
}

impl RecordingMetadata {
    /// Describe a completed session. `data_bytes` is the size of the WAV body.
    pub fn new(session: &RecordingSession, data_bytes: u64, checksum: String) -> Self {
        let byte_rate = session.byte_rate();
        let duration_secs = if byte_rate == 0 {
            0.0
        } else {
            data_bytes as f64 / byte_rate as f64
        };

        Self {
            id: session.id.clone(),
            started_at: session.started_at.to_rfc3339(),
            finished_at: chrono::Local::now().to_rfc3339(),
            file_path: session
                .final_file_path()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default(),
            sample_rate_hz: session.sample_rate_hz,
            channel_count: session.channel_count,
            bits_per_sample: session.bits_per_sample,
            duration_secs,
            checksum,
        }
    }
}
