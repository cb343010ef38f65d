use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::models::error::CaptureError;
use crate::traits::audio_input::AudioDeviceHandle;

/// How a writer loop ended.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterOutcome {
    pub bytes_written: u64,
    pub frames: u64,
    /// First read or write error; the loop stops on it.
    pub error: Option<CaptureError>,
}

/// Streams raw device frames into the session's `.pcm` file.
///
/// Single producer (the device) and single consumer (the file): both sides
/// are synchronous and paced by the device's own buffering, so no queue sits
/// between them.
pub struct SampleWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    frame_bytes: usize,
    bytes_written: u64,
    frames: u64,
}

impl SampleWriter {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path, frame_bytes: usize) -> Result<Self, CaptureError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CaptureError::storage("failed to create directory", e))?;
        }
        let file = File::create(path).map_err(|e| CaptureError::storage("failed to create raw file", e))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::with_capacity(frame_bytes * 4, file),
            frame_bytes,
            bytes_written: 0,
            frames: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append one frame buffer.
    pub fn write_frame(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        self.writer
            .write_all(data)
            .map_err(|e| CaptureError::storage("write failed", e))?;
        self.bytes_written += data.len() as u64;
        self.frames += 1;
        Ok(())
    }

    /// Read from `device` and append until `recording` is cleared or an error
    /// occurs, then flush and close the file.
    pub fn run(mut self, recording: &AtomicBool, device: &mut dyn AudioDeviceHandle) -> WriterOutcome {
        let mut buf = vec![0u8; self.frame_bytes];
        let mut error = None;

        while recording.load(Ordering::SeqCst) {
            let read = match device.read(&mut buf) {
                Ok(n) => n,
                Err(e) => {
                    log::error!("Capture read failed, ending session capture: {}", e);
                    error = Some(e);
                    break;
                }
            };
            if read == 0 {
                continue;
            }
            if let Err(e) = self.write_frame(&buf[..read]) {
                log::error!("Failed to write audio data to {}: {}", self.path.display(), e);
                error = Some(e);
                break;
            }
        }

        if error.is_none() {
            error = self.drain(device, &mut buf).err();
        }

        let bytes_written = self.bytes_written;
        let frames = self.frames;
        if let Err(e) = self.finish() {
            log::error!("Failed to close raw capture file: {}", e);
            error.get_or_insert(e);
        }

        WriterOutcome {
            bytes_written,
            frames,
            error,
        }
    }

    /// Append whatever the device still holds once recording has ended.
    fn drain(&mut self, device: &mut dyn AudioDeviceHandle, buf: &mut [u8]) -> Result<(), CaptureError> {
        let before = self.bytes_written;
        loop {
            let read = match device.read_pending(buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    log::debug!("Stopped draining capture device: {}", e);
                    break;
                }
            };
            if let Err(e) = self.write_frame(&buf[..read]) {
                log::error!("Failed to write audio data to {}: {}", self.path.display(), e);
                return Err(e);
            }
        }
        if self.bytes_written > before {
            log::debug!("Drained {} buffered bytes after stop", self.bytes_written - before);
        }
        Ok(())
    }

    /// Flush buffered frames and sync the file.
    pub fn finish(self) -> Result<u64, CaptureError> {
        let file = self
            .writer
            .into_inner()
            .map_err(|e| CaptureError::storage("failed to flush raw file", e.into_error()))?;
        file.sync_all()
            .map_err(|e| CaptureError::storage("failed to sync raw file", e))?;
        Ok(self.bytes_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::test_support::ScriptedDevice;

    #[test]
    fn writes_frames_until_flag_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.pcm");
        let recording = Arc::new(AtomicBool::new(true));
        let mut device = ScriptedDevice::with_frames(vec![vec![1u8; 8], vec![2u8; 8], vec![3u8; 4]]);
        device.clear_flag_when_drained(Arc::clone(&recording));

        let writer = SampleWriter::create(&path, 8).unwrap();
        let outcome = writer.run(&recording, &mut device);

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.bytes_written, 20);
        assert_eq!(outcome.frames, 3);
        let data = fs::read(&path).unwrap();
        assert_eq!(&data[..8], &[1u8; 8]);
        assert_eq!(&data[16..], &[3u8; 4]);
    }

    #[test]
    fn cleared_flag_skips_blocking_reads_but_drains_buffered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.pcm");
        let recording = AtomicBool::new(false);
        let mut device = ScriptedDevice::with_frames(vec![vec![9u8; 8], vec![8u8; 4]]);

        let outcome = SampleWriter::create(&path, 8).unwrap().run(&recording, &mut device);

        assert_eq!(outcome.error, None);
        assert_eq!(outcome.bytes_written, 12);
        assert_eq!(outcome.frames, 2);
        assert_eq!(device.reads(), 0);
        let data = fs::read(&path).unwrap();
        assert_eq!(&data[..8], &[9u8; 8]);
        assert_eq!(&data[8..], &[8u8; 4]);
    }

    #[test]
    fn idle_device_leaves_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idle.pcm");
        let recording = AtomicBool::new(false);
        let mut device = ScriptedDevice::with_frames(Vec::new());

        let outcome = SampleWriter::create(&path, 8).unwrap().run(&recording, &mut device);

        assert_eq!(outcome.bytes_written, 0);
        assert_eq!(device.reads(), 0);
        assert!(path.exists());
    }

    #[test]
    fn read_error_ends_loop_and_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pcm");
        let recording = AtomicBool::new(true);
        let mut device = ScriptedDevice::with_frames(vec![vec![5u8; 4]]);
        device.fail_after_frames(CaptureError::DeviceNotAvailable);

        let outcome = SampleWriter::create(&path, 4).unwrap().run(&recording, &mut device);

        assert_eq!(outcome.error, Some(CaptureError::DeviceNotAvailable));
        assert_eq!(outcome.bytes_written, 4);
        assert_eq!(fs::read(&path).unwrap(), vec![5u8; 4]);
    }

    #[test]
    fn create_makes_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recorded").join("nested.pcm");
        let writer = SampleWriter::create(&path, 4).unwrap();
        assert_eq!(writer.path(), path.as_path());
        assert_eq!(writer.finish().unwrap(), 0);
        assert!(path.exists());
    }
}
