//! Sample conversion helpers for capture backends that deliver non-PCM16 audio.

/// Convert f32 samples in `[-1.0, 1.0]` to signed 16-bit little-endian bytes.
///
/// Out-of-range samples are clamped.
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let value = (clamped * i16::MAX as f32) as i16;
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Serialize i16 samples as little-endian bytes.
pub fn i16_to_pcm16(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Convert u16 samples (offset binary) to signed 16-bit little-endian bytes.
pub fn u16_to_pcm16(samples: &[u16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let value = (sample as i32 - 32768) as i16;
        data.extend_from_slice(&value.to_le_bytes());
    }
    data
}

/// Adapt interleaved samples from `from` channels to `to` channels.
///
/// Mono is duplicated to stereo; multi-channel input keeps its first `to`
/// channels.
pub fn remap_channels<T: Copy>(samples: &[T], from: u16, to: u16) -> Vec<T> {
    if from == to || from == 0 {
        return samples.to_vec();
    }
    let from = from as usize;
    let to = to as usize;
    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        for ch in 0..to {
            out.push(frame[ch.min(from - 1)]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pcm: &[u8], i: usize) -> i16 {
        i16::from_le_bytes([pcm[i * 2], pcm[i * 2 + 1]])
    }

    #[test]
    fn converts_f32_to_pcm16() {
        let pcm = f32_to_pcm16(&[0.0, 1.0, -1.0, 0.5]);

        assert_eq!(pcm.len(), 8);
        assert_eq!(sample(&pcm, 0), 0);
        assert_eq!(sample(&pcm, 1), i16::MAX);
        // -1.0 maps to -32767, not -32768
        assert_eq!(sample(&pcm, 2), -i16::MAX);
        assert_eq!(sample(&pcm, 3), 16383);
    }

    #[test]
    fn clamps_out_of_range() {
        let pcm = f32_to_pcm16(&[2.0, -3.0]);
        assert_eq!(sample(&pcm, 0), i16::MAX);
        assert_eq!(sample(&pcm, 1), -i16::MAX);
    }

    #[test]
    fn u16_midpoint_is_silence() {
        let pcm = u16_to_pcm16(&[32768, 0, 65535]);
        assert_eq!(sample(&pcm, 0), 0);
        assert_eq!(sample(&pcm, 1), i16::MIN);
        assert_eq!(sample(&pcm, 2), i16::MAX);
    }

    #[test]
    fn i16_is_little_endian() {
        assert_eq!(i16_to_pcm16(&[0x0102]), vec![0x02, 0x01]);
    }

    #[test]
    fn mono_duplicates_to_stereo() {
        assert_eq!(remap_channels(&[1, 2, 3], 1, 2), vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn stereo_keeps_left_for_mono() {
        assert_eq!(remap_channels(&[1, 9, 2, 9], 2, 1), vec![1, 2]);
    }

    #[test]
    fn same_layout_passthrough() {
        assert_eq!(remap_channels(&[5, 6], 2, 2), vec![5, 6]);
    }

    #[test]
    fn remaps_before_float_conversion() {
        let pcm = f32_to_pcm16(&remap_channels(&[0.5f32], 1, 2));
        assert_eq!(sample(&pcm, 0), 16383);
        assert_eq!(sample(&pcm, 1), 16383);
    }
}
