pub mod audio_input;
pub mod call_recorder;
pub mod mode_source;
pub mod recording_listener;
pub mod session_capture;
pub mod settings_store;
