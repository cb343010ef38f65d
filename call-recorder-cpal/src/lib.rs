//! # call-recorder-cpal
//!
//! `cpal` capture backend for call-recorder.
//!
//! Provides:
//! - `CpalAudioInput`: raw buffer capture; samples are queued for the core `SampleWriter`
//! - `CpalSessionCapture`: session capture; the stream callback writes the raw file itself
//! - `devices`: input device enumeration
//!
//! `cpal::Stream` is not `Send`, so every stream lives on its own owner
//! thread and is driven through a command channel.
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use call_recorder_core::{AudioCallRecorder, LogListener, RecorderConfig};
//! use call_recorder_cpal::CpalAudioInput;
//!
//! let recorder = AudioCallRecorder::new(
//!     CpalAudioInput::default_device(),
//!     RecorderConfig::default(),
//!     Arc::new(LogListener),
//! )?;
//! ```

pub mod cpal_input;
pub mod cpal_session;
pub mod devices;
mod stream;

pub use cpal_input::CpalAudioInput;
pub use cpal_session::CpalSessionCapture;
