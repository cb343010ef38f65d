//! Raw PCM to WAV conversion.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::processing::wav_format::{self, MAX_DATA_SIZE};

/// Parameters of the raw interleaved PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl WavSpec {
    pub fn block_align(&self) -> u32 {
        self.channels as u32 * self.bits_per_sample as u32 / 8
    }
}

/// Path of the in-progress output for `wav_path`.
pub fn partial_path(wav_path: &Path) -> PathBuf {
    let mut name = wav_path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    wav_path.with_file_name(name)
}

/// Wrap the raw PCM file at `raw_path` in a canonical WAV container at `wav_path`.
///
/// The body is copied verbatim into `<wav_path>.part`, synced, then renamed
/// into place, so `wav_path` never holds a partial file. On success the raw
/// file is deleted; on failure it is left untouched and the partial output is
/// removed. Returns the number of data bytes written.
///
/// A trailing partial frame is dropped.
pub fn encode_file(raw_path: &Path, wav_path: &Path, spec: &WavSpec) -> Result<u64, CaptureError> {
    let block_align = spec.block_align() as u64;
    if block_align == 0 {
        return Err(CaptureError::EncodingFailed(format!("invalid block size for {:?}", spec)));
    }

    let raw_len = fs::metadata(raw_path)
        .map_err(|e| CaptureError::storage("failed to stat raw file", e))?
        .len();
    let data_len = raw_len - raw_len % block_align;
    if data_len != raw_len {
        log::warn!(
            "Dropping {} trailing bytes of partial frame from {}",
            raw_len - data_len,
            raw_path.display()
        );
    }
    if data_len > MAX_DATA_SIZE {
        return Err(CaptureError::EncodingFailed(format!(
            "{} bytes of audio exceed the WAV size limit",
            data_len
        )));
    }

    let header =
        wav_format::generate_wav_header(spec.sample_rate, spec.bits_per_sample, spec.channels, data_len as u32)?;

    let part_path = partial_path(wav_path);
    if let Err(e) = write_wav(raw_path, &part_path, &header, data_len) {
        if part_path.is_file() {
            let _ = fs::remove_file(&part_path);
        }
        return Err(e);
    }

    if let Err(e) = fs::rename(&part_path, wav_path) {
        let _ = fs::remove_file(&part_path);
        return Err(CaptureError::storage("failed to finalize wav file", e));
    }

    if let Err(e) = fs::remove_file(raw_path) {
        log::warn!("Converted {} but could not delete it: {}", raw_path.display(), e);
    }

    log::debug!("Encoded {} bytes into {}", data_len, wav_path.display());
    Ok(data_len)
}

fn write_wav(
    raw_path: &Path,
    out_path: &Path,
    header: &[u8; wav_format::WAV_HEADER_SIZE],
    data_len: u64,
) -> Result<(), CaptureError> {
    let raw = File::open(raw_path).map_err(|e| CaptureError::storage("failed to open raw file", e))?;
    let out = File::create(out_path).map_err(|e| CaptureError::storage("failed to create wav file", e))?;
    let mut writer = BufWriter::new(out);

    writer
        .write_all(header)
        .map_err(|e| CaptureError::storage("failed to write wav header", e))?;

    let copied = io::copy(&mut raw.take(data_len), &mut writer)
        .map_err(|e| CaptureError::storage("failed to copy audio data", e))?;
    if copied != data_len {
        return Err(CaptureError::StorageError(format!(
            "raw file shrank during conversion: expected {} bytes, copied {}",
            data_len, copied
        )));
    }

    let out = writer
        .into_inner()
        .map_err(|e| CaptureError::storage("failed to flush wav file", e.into_error()))?;
    out.sync_all()
        .map_err(|e| CaptureError::storage("failed to sync wav file", e))?;
    Ok(())
}
