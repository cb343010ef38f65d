pub mod audio;
mod base;
pub mod video;
