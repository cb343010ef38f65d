use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::models::error::CaptureError;

/// Timestamp format used for recording file names.
pub const FILE_STEM_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

pub const RAW_EXTENSION: &str = "pcm";
pub const WAV_EXTENSION: &str = "wav";

/// The dedicated directory that holds raw and finished recordings.
///
/// Files are named by the session start time: `<stem>.pcm` while capturing,
/// `<stem>.wav` once converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingsDir {
    root: PathBuf,
}

impl RecordingsDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> Result<(), CaptureError> {
        fs::create_dir_all(&self.root).map_err(|e| CaptureError::storage("failed to create recordings directory", e))
    }

    pub fn file_stem(at: &DateTime<Local>) -> String {
        at.format(FILE_STEM_FORMAT).to_string()
    }

    pub fn raw_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.{}", stem, RAW_EXTENSION))
    }

    pub fn wav_path(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.{}", stem, WAV_EXTENSION))
    }

    /// Pick a stem for a session starting at `at` that collides with no
    /// existing raw or finished file. Two calls within one second get
    /// `_1`, `_2`, ... suffixes.
    pub fn allocate_stem(&self, at: &DateTime<Local>) -> String {
        let base = Self::file_stem(at);
        let mut stem = base.clone();
        let mut n = 1;
        while self.raw_path(&stem).exists() || self.wav_path(&stem).exists() {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        stem
    }

    /// Finished `.wav` recordings, oldest first.
    pub fn list_recordings(&self) -> Result<Vec<PathBuf>, CaptureError> {
        self.list_with_extension(WAV_EXTENSION)
    }

    /// Raw captures that never converted, oldest first.
    pub fn list_unconverted(&self) -> Result<Vec<PathBuf>, CaptureError> {
        self.list_with_extension(RAW_EXTENSION)
    }

    fn list_with_extension(&self, extension: &str) -> Result<Vec<PathBuf>, CaptureError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CaptureError::storage("failed to list recordings", e)),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
            .collect();
        files.sort();
        Ok(files)
    }
}
