use serde::{Deserialize, Serialize};

/// Capture source selector passed to the platform when opening an input.
///
/// Integer codes follow the platform's `AudioSource` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSourceKind {
    Default,
    Mic,
    VoiceUplink,
    VoiceDownlink,
    VoiceCall,
    Camcorder,
    VoiceRecognition,
    VoiceCommunication,
}

impl AudioSourceKind {
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Default,
            1 => Self::Mic,
            2 => Self::VoiceUplink,
            3 => Self::VoiceDownlink,
            4 => Self::VoiceCall,
            5 => Self::Camcorder,
            6 => Self::VoiceRecognition,
            7 => Self::VoiceCommunication,
            _ => return None,
        })
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Default => 0,
            Self::Mic => 1,
            Self::VoiceUplink => 2,
            Self::VoiceDownlink => 3,
            Self::VoiceCall => 4,
            Self::Camcorder => 5,
            Self::VoiceRecognition => 6,
            Self::VoiceCommunication => 7,
        }
    }
}

/// Audio channel layout of the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn channel_count(&self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }

    pub fn from_channel_count(count: i64) -> Option<Self> {
        match count {
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            _ => None,
        }
    }
}

/// Sample encoding of the raw capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PcmEncoding {
    /// Signed 16-bit little-endian.
    Pcm16,
}

impl PcmEncoding {
    pub fn bits_per_sample(&self) -> u16 {
        match self {
            Self::Pcm16 => 16,
        }
    }
}

/// Format of one capture, handed to the device when it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFormat {
    pub source: AudioSourceKind,
    pub sample_rate_hz: u32,
    pub channels: ChannelLayout,
    pub encoding: PcmEncoding,
}

impl CaptureFormat {
    pub fn channel_count(&self) -> u16 {
        self.channels.channel_count()
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.encoding.bits_per_sample()
    }

    /// Bytes per interleaved frame (one sample for every channel).
    pub fn block_align(&self) -> u16 {
        self.channel_count() * self.bits_per_sample() / 8
    }

    pub fn byte_rate(&self) -> u64 {
        self.sample_rate_hz as u64 * self.block_align() as u64
    }
}

/// State an opened capture device reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Uninitialized,
    Initialized,
}
