pub mod metadata;
pub mod recordings_dir;
pub mod sample_writer;
pub mod settings;
