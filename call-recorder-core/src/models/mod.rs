pub mod audio_mode;
pub mod audio_models;
pub mod config;
pub mod error;
pub mod recording_metadata;
pub mod session;
pub mod state;
