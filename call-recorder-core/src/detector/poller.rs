use std::thread;

use crate::detector::call_detector::CallDetector;
use crate::models::audio_mode::AudioModeSample;
use crate::models::config::DetectorConfig;
use crate::models::error::CaptureError;
use crate::traits::mode_source::AudioModeSource;
use crate::util::cancel::CancelToken;

/// Fixed-interval audio-mode poll loop, for platforms without a mode-change
/// listener.
///
/// Runs on its own thread and feeds every sample to the owned detector.
/// Sampling errors are logged per tick and the loop continues. Cancellation
/// interrupts the sleep between ticks.
pub struct ModePoller {
    cancel: CancelToken,
    handle: Option<thread::JoinHandle<CallDetector>>,
}

impl ModePoller {
    pub fn spawn<S>(source: S, mut detector: CallDetector, config: &DetectorConfig) -> Result<Self, CaptureError>
    where
        S: AudioModeSource + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let interval = config.poll_interval;

        let handle = thread::Builder::new()
            .name("audio-mode-poller".into())
            .spawn(move || {
                log::debug!("Audio mode poller started ({:?} interval)", interval);
                while !token.is_cancelled() {
                    match source.current_mode() {
                        Ok(mode) => {
                            detector.on_sample(AudioModeSample::now(mode));
                        }
                        Err(e) => log::warn!("Failed to sample audio mode: {}", e),
                    }
                    if token.wait_timeout(interval) {
                        break;
                    }
                }
                log::debug!("Audio mode poller stopped");
                detector
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn poller thread: {}", e)))?;

        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel at the next tick boundary and hand back the detector.
    pub fn stop(mut self) -> Option<CallDetector> {
        self.cancel.cancel();
        self.handle.take().and_then(|h| h.join().ok())
    }
}

impl Drop for ModePoller {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
