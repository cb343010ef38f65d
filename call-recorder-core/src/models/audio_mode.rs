use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The platform's current audio routing classification.
///
/// Integer codes follow the platform audio manager (`MODE_*` constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioMode {
    Invalid,
    Normal,
    Ringtone,
    InCall,
    InCommunication,
    CallScreening,
    CallRedirect,
    CommunicationRedirect,
    Other(i32),
}

impl AudioMode {
    pub fn from_code(code: i32) -> Self {
        match code {
            -2 => Self::Invalid,
            0 => Self::Normal,
            1 => Self::Ringtone,
            2 => Self::InCall,
            3 => Self::InCommunication,
            4 => Self::CallScreening,
            5 => Self::CallRedirect,
            6 => Self::CommunicationRedirect,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Invalid => -2,
            Self::Normal => 0,
            Self::Ringtone => 1,
            Self::InCall => 2,
            Self::InCommunication => 3,
            Self::CallScreening => 4,
            Self::CallRedirect => 5,
            Self::CommunicationRedirect => 6,
            Self::Other(code) => *code,
        }
    }

    /// True for a telephony call or a VOIP call.
    pub fn is_call_active(&self) -> bool {
        matches!(self, Self::InCall | Self::InCommunication)
    }
}

/// One observation of the audio mode. Consumed immediately, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioModeSample {
    pub mode: AudioMode,
    pub timestamp: DateTime<Utc>,
}

impl AudioModeSample {
    pub fn now(mode: AudioMode) -> Self {
        Self {
            mode,
            timestamp: Utc::now(),
        }
    }
}
