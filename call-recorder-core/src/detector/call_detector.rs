use std::sync::Arc;

use crate::models::audio_mode::{AudioMode, AudioModeSample};
use crate::models::state::DetectorState;
use crate::traits::call_recorder::CallRecorder;

/// Edge produced by one mode observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Stopped,
    None,
}

/// Watches audio-mode changes and drives a [`CallRecorder`].
///
/// Edge-triggered on the previous mode only:
/// ```text
/// idle ──(InCall|InCommunication, previous not in a call)──▶ in_call   start
/// in_call ──(Normal, previous InCall|InCommunication)──▶ idle          stop
/// ```
/// Any other mode is recorded as the previous mode and otherwise ignored.
/// Single-threaded: call from the listener callback or the poll loop only.
pub struct CallDetector {
    recorder: Arc<dyn CallRecorder>,
    previous: Option<AudioMode>,
    state: DetectorState,
}

impl CallDetector {
    pub fn new(recorder: Arc<dyn CallRecorder>) -> Self {
        Self {
            recorder,
            previous: None,
            state: DetectorState::Idle,
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn previous_mode(&self) -> Option<AudioMode> {
        self.previous
    }

    pub fn recorder(&self) -> &Arc<dyn CallRecorder> {
        &self.recorder
    }

    pub fn on_sample(&mut self, sample: AudioModeSample) -> Transition {
        log::trace!("audio mode {:?} at {}", sample.mode, sample.timestamp);
        self.on_mode_changed(sample.mode)
    }

    /// Observe `mode`, firing the recorder on a call edge.
    pub fn on_mode_changed(&mut self, mode: AudioMode) -> Transition {
        let was_in_call = self.previous.is_some_and(|m| m.is_call_active());

        let transition = if mode.is_call_active() && !was_in_call {
            Transition::Started
        } else if mode == AudioMode::Normal && was_in_call {
            Transition::Stopped
        } else {
            Transition::None
        };
        self.previous = Some(mode);

        match transition {
            Transition::Started => {
                log::info!("Call detected ({:?}), starting recording", mode);
                self.state = DetectorState::InCall;
                if let Err(e) = self.recorder.start_call_recording() {
                    log::error!("Could not start call recording: {}", e);
                }
            }
            Transition::Stopped => {
                log::info!("Call ended, stopping recording");
                self.state = DetectorState::Idle;
                match self.recorder.stop_call_recording() {
                    Ok(Some(session)) => log::debug!("Session {} ended {}", session.id, session.state().name()),
                    Ok(None) => log::debug!("Call ended with no active recording"),
                    Err(e) => log::error!("Could not stop call recording: {}", e),
                }
            }
            Transition::None => log::debug!("Audio mode {:?}, no transition", mode),
        }

        transition
    }
}
