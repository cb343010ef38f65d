//! # call-recorder-core
//!
//! Platform-agnostic call recording core library.
//!
//! Watches the device audio mode for the start and end of a call, streams
//! the call audio to a raw PCM file while it lasts, and converts the capture
//! to a canonical WAV file once the call ends. Platform backends implement
//! the `AudioInput` or `SessionCapture` trait and plug into the generic
//! recorders.
//!
//! ## Architecture
//!
//! ```text
//! call-recorder-core (this crate)
//! ├── traits/       ← CallRecorder, AudioInput, SessionCapture, AudioModeSource, RecordingListener, SettingsStore
//! ├── models/       ← CaptureError, AudioMode, RecordingSession, SessionState, RecorderConfig, etc.
//! ├── detector/     ← CallDetector (edge-triggered), ModePoller (polling fallback)
//! ├── recorder/     ← AudioCallRecorder, VideoCallRecorder
//! ├── processing/   ← WAV header + encoder, PCM sample conversion
//! ├── storage/      ← SampleWriter, RecordingsDir, metadata sidecar, settings stores
//! └── util/         ← CancelToken
//! ```

pub mod detector;
pub mod models;
pub mod processing;
pub mod recorder;
pub mod storage;
pub mod traits;
pub mod util;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use detector::call_detector::{CallDetector, Transition};
pub use detector::poller::ModePoller;
pub use models::audio_mode::{AudioMode, AudioModeSample};
pub use models::audio_models::{AudioSourceKind, CaptureFormat, ChannelLayout, DeviceState, PcmEncoding};
pub use models::config::{DetectorConfig, RecorderConfig};
pub use models::error::CaptureError;
pub use models::recording_metadata::RecordingMetadata;
pub use models::session::RecordingSession;
pub use models::state::{DetectorState, SessionState};
pub use processing::wav_encoder::{encode_file, WavSpec};
pub use recorder::audio::AudioCallRecorder;
pub use recorder::video::VideoCallRecorder;
pub use storage::recordings_dir::RecordingsDir;
pub use storage::sample_writer::{SampleWriter, WriterOutcome};
pub use storage::settings::{JsonSettingsStore, MemorySettingsStore};
pub use traits::audio_input::{AudioDeviceHandle, AudioInput, DeviceGuard};
pub use traits::call_recorder::CallRecorder;
pub use traits::mode_source::AudioModeSource;
pub use traits::recording_listener::{LogListener, RecordingListener};
pub use traits::session_capture::{CaptureSessionHandle, SessionCapture, SessionGuard};
pub use traits::settings_store::SettingsStore;
pub use util::cancel::CancelToken;
