use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

use super::audio_models::{AudioSourceKind, CaptureFormat, ChannelLayout, PcmEncoding};
use crate::traits::settings_store::SettingsStore;

/// Settings keys read by [`RecorderConfig::from_settings`].
pub mod keys {
    pub const SAMPLE_RATE: &str = "sample_rate";
    pub const CHANNELS: &str = "channels";
    pub const AUDIO_SOURCE: &str = "audio_source";
}

/// Sample rates accepted by [`RecorderConfig::validate`].
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8000..=192_000;

/// Configuration for a call recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    /// Capture source (default: voice recognition, which skips echo
    /// cancellation and AGC on most devices).
    pub audio_source: AudioSourceKind,

    /// Sample rate in Hz (default: 44100).
    pub sample_rate_hz: u32,

    /// Channel layout (default: stereo).
    pub channel_layout: ChannelLayout,

    /// Raw sample encoding (default: 16-bit PCM).
    pub encoding: PcmEncoding,

    /// Directory where raw and converted recordings are written.
    pub recordings_dir: PathBuf,

    /// Size of one device read in bytes (default: 4096).
    pub frame_bytes: usize,

    /// Delay between a successful conversion and the finished event (default: 5s).
    pub settle_delay: Duration,
}

impl RecorderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate_hz) {
            return Err(format!(
                "sample rate {} Hz outside {}..={} Hz",
                self.sample_rate_hz,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            ));
        }
        if self.frame_bytes == 0 {
            return Err("frame size must be positive".into());
        }
        let block_align = self.capture_format().block_align() as usize;
        if self.frame_bytes % block_align != 0 {
            return Err(format!(
                "frame size {} is not a multiple of the {}-byte block",
                self.frame_bytes, block_align
            ));
        }
        Ok(())
    }

    pub fn capture_format(&self) -> CaptureFormat {
        CaptureFormat {
            source: self.audio_source,
            sample_rate_hz: self.sample_rate_hz,
            channels: self.channel_layout,
            encoding: self.encoding,
        }
    }

    /// Overlay values from a key-value settings store on top of `base`.
    ///
    /// Missing or out-of-range values keep the `base` value.
    pub fn from_settings(store: &dyn SettingsStore, base: RecorderConfig) -> Self {
        let mut config = base;

        if let Some(rate) = store.get_int(keys::SAMPLE_RATE) {
            match u32::try_from(rate) {
                Ok(rate) if SAMPLE_RATE_RANGE.contains(&rate) => config.sample_rate_hz = rate,
                _ => log::warn!("ignoring invalid sample rate setting: {}", rate),
            }
        }

        if let Some(channels) = store.get_int(keys::CHANNELS) {
            match ChannelLayout::from_channel_count(channels) {
                Some(layout) => config.channel_layout = layout,
                None => log::warn!("ignoring invalid channel setting: {}", channels),
            }
        }

        if let Some(code) = store.get_int(keys::AUDIO_SOURCE) {
            match AudioSourceKind::from_code(code) {
                Some(source) => config.audio_source = source,
                None => log::warn!("ignoring invalid audio source setting: {}", code),
            }
        }

        config
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            audio_source: AudioSourceKind::VoiceRecognition,
            sample_rate_hz: 44100,
            channel_layout: ChannelLayout::Stereo,
            encoding: PcmEncoding::Pcm16,
            recordings_dir: PathBuf::from("recorded"),
            frame_bytes: 4096,
            settle_delay: Duration::from_secs(5),
        }
    }
}

/// Configuration for the audio-mode poller.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Interval between mode samples (default: 1000 ms).
    pub poll_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::settings::MemorySettingsStore;

    #[test]
    fn defaults_are_valid() {
        let config = RecorderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate_hz, 44100);
        assert_eq!(config.channel_layout, ChannelLayout::Stereo);
        assert_eq!(config.audio_source, AudioSourceKind::VoiceRecognition);
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(DetectorConfig::default().poll_interval, Duration::from_millis(1000));
    }

    #[test]
    fn frame_size_must_hold_whole_frames() {
        let config = RecorderConfig {
            frame_bytes: 4097,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_rate_must_be_in_range() {
        for rate in [0, 7999, 192_001, 200_000_000] {
            let config = RecorderConfig {
                sample_rate_hz: rate,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{} Hz", rate);
        }
        for rate in [8000, 16000, 48000, 192_000] {
            let config = RecorderConfig {
                sample_rate_hz: rate,
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "{} Hz", rate);
        }
    }

    #[test]
    fn out_of_range_rate_setting_keeps_default() {
        let store = MemorySettingsStore::new();
        store.set_int(keys::SAMPLE_RATE, 200_000_000).unwrap();

        let config = RecorderConfig::from_settings(&store, RecorderConfig::default());
        assert_eq!(config.sample_rate_hz, 44100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn settings_override_defaults() {
        let store = MemorySettingsStore::new();
        store.set_int(keys::SAMPLE_RATE, 16000).unwrap();
        store.set_int(keys::CHANNELS, 1).unwrap();
        store.set_int(keys::AUDIO_SOURCE, AudioSourceKind::Mic.code()).unwrap();

        let config = RecorderConfig::from_settings(&store, RecorderConfig::default());
        assert_eq!(config.sample_rate_hz, 16000);
        assert_eq!(config.channel_layout, ChannelLayout::Mono);
        assert_eq!(config.audio_source, AudioSourceKind::Mic);
    }

    #[test]
    fn invalid_settings_are_ignored() {
        let store = MemorySettingsStore::new();
        store.set_int(keys::SAMPLE_RATE, -1).unwrap();
        store.set_int(keys::CHANNELS, 5).unwrap();
        store.set_int(keys::AUDIO_SOURCE, 99).unwrap();

        let config = RecorderConfig::from_settings(&store, RecorderConfig::default());
        assert_eq!(config, RecorderConfig::default());
    }
}
