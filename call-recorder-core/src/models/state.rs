use super::error::CaptureError;

/// Recording session state machine.
///
/// State transitions:
/// ```text
/// capturing → converting → completed / failed
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Capturing,
    Converting,
    Completed,
    Failed(CaptureError),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Capturing => "capturing",
            Self::Converting => "converting",
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }

    /// Whether `next` is the legal successor of this state.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Capturing, Self::Converting)
                | (Self::Converting, Self::Completed)
                | (Self::Converting, Self::Failed(_))
        )
    }
}

/// Call detector state. Long-lived; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    InCall,
}
