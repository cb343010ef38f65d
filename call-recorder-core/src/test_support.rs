//! Scripted fakes shared by the unit tests.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::audio_models::{CaptureFormat, DeviceState};
use crate::models::error::CaptureError;
use crate::models::session::RecordingSession;
use crate::traits::audio_input::{AudioDeviceHandle, AudioInput};
use crate::traits::call_recorder::CallRecorder;
use crate::traits::recording_listener::RecordingListener;
use crate::traits::session_capture::{CaptureSessionHandle, SessionCapture};

/// Poll `cond` for up to five seconds.
pub fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

// =============================================================================
// CallRecorder that counts calls
// =============================================================================

#[derive(Default)]
pub struct CountingRecorder {
    starts: AtomicUsize,
    stops: AtomicUsize,
    recording: AtomicBool,
    fail: bool,
}

impl CountingRecorder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl CallRecorder for CountingRecorder {
    fn start_call_recording(&self) -> Result<(), CaptureError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CaptureError::DeviceNotAvailable);
        }
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_call_recording(&self) -> Result<Option<RecordingSession>, CaptureError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CaptureError::StorageError("scripted".into()));
        }
        self.recording.store(false, Ordering::SeqCst);
        Ok(None)
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn destroy(&self) {}
}

// =============================================================================
// Raw capture device
// =============================================================================

#[derive(Default)]
pub struct DeviceStats {
    pub opened: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub released: AtomicUsize,
    pub reads: AtomicUsize,
}

impl DeviceStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Device that plays back scripted frames, then optionally repeats one frame
/// forever (paced at 1 ms per read) or fails.
pub struct ScriptedDevice {
    frames: VecDeque<Vec<u8>>,
    repeat: Option<Vec<u8>>,
    fail: Option<CaptureError>,
    stop_flag: Option<Arc<AtomicBool>>,
    state: DeviceState,
    stats: Arc<DeviceStats>,
}

impl ScriptedDevice {
    pub fn with_frames(frames: Vec<Vec<u8>>) -> Self {
        Self {
            frames: frames.into(),
            repeat: None,
            fail: None,
            stop_flag: None,
            state: DeviceState::Initialized,
            stats: Arc::new(DeviceStats::default()),
        }
    }

    pub fn streaming(frame: Vec<u8>, stats: Arc<DeviceStats>) -> Self {
        Self {
            repeat: Some(frame),
            stats,
            ..Self::with_frames(Vec::new())
        }
    }

    /// Clear `flag` once the scripted frames run out.
    pub fn clear_flag_when_drained(&mut self, flag: Arc<AtomicBool>) {
        self.stop_flag = Some(flag);
    }

    /// Return `error` once the scripted frames run out.
    pub fn fail_after_frames(&mut self, error: CaptureError) {
        self.fail = Some(error);
    }

    pub fn reads(&self) -> usize {
        DeviceStats::get(&self.stats.reads)
    }
}

impl AudioDeviceHandle for ScriptedDevice {
    fn state(&self) -> DeviceState {
        self.state
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.stats.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        let frame = match self.frames.pop_front() {
            Some(frame) => frame,
            None => {
                if let Some(e) = self.fail.take() {
                    return Err(e);
                }
                if let Some(flag) = &self.stop_flag {
                    flag.store(false, Ordering::SeqCst);
                    return Ok(0);
                }
                match &self.repeat {
                    Some(frame) => {
                        thread::sleep(Duration::from_millis(1));
                        frame.clone()
                    }
                    None => return Ok(0),
                }
            }
        };
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        Ok(n)
    }

    /// Hands out the remaining scripted frames; the repeat frame is live
    /// input and never counts as buffered.
    fn read_pending(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(0);
        };
        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        Ok(n)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.stats.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// `AudioInput` handing out streaming `ScriptedDevice`s.
pub struct ScriptedAudioInput {
    pub stats: Arc<DeviceStats>,
    pub frame: Vec<u8>,
    pub init_state: DeviceState,
    pub open_error: Option<CaptureError>,
    pub fail_after_frames: Option<(usize, CaptureError)>,
}

impl ScriptedAudioInput {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(DeviceStats::default()),
            frame: vec![0x11; 64],
            init_state: DeviceState::Initialized,
            open_error: None,
            fail_after_frames: None,
        }
    }
}

impl AudioInput for ScriptedAudioInput {
    fn open(&self, _format: &CaptureFormat, _buffer_bytes: usize) -> Result<Box<dyn AudioDeviceHandle>, CaptureError> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.open_error {
            return Err(e.clone());
        }
        let mut device = ScriptedDevice::streaming(self.frame.clone(), Arc::clone(&self.stats));
        device.state = self.init_state;
        if let Some((count, error)) = &self.fail_after_frames {
            device.repeat = None;
            device.frames = std::iter::repeat(self.frame.clone()).take(*count).collect();
            device.fail = Some(error.clone());
        }
        Ok(Box::new(device))
    }
}

// =============================================================================
// Session capture
// =============================================================================

#[derive(Default)]
pub struct SessionStats {
    pub prepared: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub released: AtomicUsize,
}

/// Session capture that writes a fixed payload to its output on start.
pub struct FakeSessionCapture {
    pub stats: Arc<SessionStats>,
    pub payload: Vec<u8>,
    pub start_error: Option<CaptureError>,
}

impl FakeSessionCapture {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(SessionStats::default()),
            payload: vec![0x22; 256],
            start_error: None,
        }
    }
}

struct FakeSession {
    output: PathBuf,
    file: Option<File>,
    payload: Vec<u8>,
    start_error: Option<CaptureError>,
    stats: Arc<SessionStats>,
}

impl CaptureSessionHandle for FakeSession {
    fn start(&mut self) -> Result<(), CaptureError> {
        if let Some(e) = self.start_error.take() {
            return Err(e);
        }
        self.stats.started.fetch_add(1, Ordering::SeqCst);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.output)
            .map_err(|e| CaptureError::storage("open", e))?;
        file.write_all(&self.payload).map_err(|e| CaptureError::storage("write", e))?;
        self.file = Some(file);
        Ok(())
    }

    fn stop(&mut self) -> Result<u64, CaptureError> {
        self.stats.stopped.fetch_add(1, Ordering::SeqCst);
        self.file.take();
        Ok(self.payload.len() as u64)
    }

    fn release(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl SessionCapture for FakeSessionCapture {
    fn prepare(&self, _format: &CaptureFormat, output: &Path) -> Result<Box<dyn CaptureSessionHandle>, CaptureError> {
        self.stats.prepared.fetch_add(1, Ordering::SeqCst);
        File::create(output).map_err(|e| CaptureError::storage("create", e))?;
        Ok(Box::new(FakeSession {
            output: output.to_path_buf(),
            file: None,
            payload: self.payload.clone(),
            start_error: self.start_error.clone(),
            stats: Arc::clone(&self.stats),
        }))
    }
}

// =============================================================================
// Listener
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StateChanged(bool),
    Finished(PathBuf),
    Error(CaptureError),
}

#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn finished(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Finished(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<CaptureError> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error(err) => Some(err),
                _ => None,
            })
            .collect()
    }
}

impl RecordingListener for EventLog {
    fn on_recording_state_changed(&self, recording: bool) {
        self.events.lock().push(Event::StateChanged(recording));
    }

    fn on_recording_finished(&self, directory: &Path) {
        self.events.lock().push(Event::Finished(directory.to_path_buf()));
    }

    fn on_error(&self, error: &CaptureError) {
        self.events.lock().push(Event::Error(error.clone()));
    }
}
