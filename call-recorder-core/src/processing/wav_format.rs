//! WAV file format utilities.
//!
//! Generates and parses the canonical 44-byte RIFF/WAVE header for PCM data.

use crate::models::error::CaptureError;

/// Size of the canonical WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Largest data chunk a 44-byte header can describe.
pub const MAX_DATA_SIZE: u64 = u32::MAX as u64 - 36;

/// Fields of a parsed canonical WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Fails with `EncodingFailed` when a derived field does not fit its slot.
pub fn generate_wav_header(
    sample_rate: u32,
    bit_depth: u16,
    channels: u16,
    data_size: u32,
) -> Result<[u8; WAV_HEADER_SIZE], CaptureError> {
    let overflow = || {
        CaptureError::EncodingFailed(format!(
            "{} Hz / {} ch / {} bit does not fit a WAV header",
            sample_rate, channels, bit_depth
        ))
    };
    let byte_rate = sample_rate
        .checked_mul(channels as u32)
        .and_then(|v| v.checked_mul(bit_depth as u32))
        .map(|v| v / 8)
        .ok_or_else(overflow)?;
    let block_align = channels.checked_mul(bit_depth).map(|v| v / 8).ok_or_else(overflow)?;
    let chunk_size = data_size.checked_add(36).ok_or_else(overflow)?;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}

/// Parse a canonical 44-byte header from the start of `bytes`.
pub fn parse_wav_header(bytes: &[u8]) -> Result<WavHeader, CaptureError> {
    if bytes.len() < WAV_HEADER_SIZE {
        return Err(CaptureError::EncodingFailed(format!(
            "header needs {} bytes, got {}",
            WAV_HEADER_SIZE,
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(CaptureError::EncodingFailed("missing RIFF/WAVE magic".into()));
    }
    if &bytes[12..16] != b"fmt " || read_u32(bytes, 16) != 16 {
        return Err(CaptureError::EncodingFailed("unexpected fmt chunk".into()));
    }
    if &bytes[36..40] != b"data" {
        return Err(CaptureError::EncodingFailed("missing data chunk".into()));
    }

    Ok(WavHeader {
        riff_size: read_u32(bytes, 4),
        audio_format: read_u16(bytes, 20),
        channels: read_u16(bytes, 22),
        sample_rate: read_u32(bytes, 24),
        byte_rate: read_u32(bytes, 28),
        block_align: read_u16(bytes, 32),
        bits_per_sample: read_u16(bytes, 34),
        data_size: read_u32(bytes, 40),
    })
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
