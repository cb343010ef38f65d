//! Raw buffer capture over a `cpal` input stream.
//!
//! The stream callback converts each buffer to PCM16 and pushes it onto a
//! bounded queue; `read` pops from the queue on the caller's writer thread.
//! After recording ends, `read_pending` pauses the stream and empties the
//! queue so buffers captured before the stop reach the file.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};

use call_recorder_core::models::audio_models::{CaptureFormat, DeviceState};
use call_recorder_core::models::error::CaptureError;
use call_recorder_core::traits::audio_input::{AudioDeviceHandle, AudioInput};

use crate::stream::StreamThread;

/// Callback buffers held before the oldest are dropped.
const QUEUE_DEPTH: usize = 256;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// `AudioInput` backed by the default (or a named) `cpal` input device.
pub struct CpalAudioInput {
    device_name: Option<String>,
    read_timeout: Duration,
}

impl CpalAudioInput {
    /// Capture from the host's default input device.
    pub fn default_device() -> Self {
        Self {
            device_name: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Capture from the input device called `name`.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// How long `read` waits for samples before returning `Ok(0)`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for CpalAudioInput {
    fn default() -> Self {
        Self::default_device()
    }
}

impl AudioInput for CpalAudioInput {
    fn open(&self, format: &CaptureFormat, buffer_bytes: usize) -> Result<Box<dyn AudioDeviceHandle>, CaptureError> {
        let (tx, rx) = bounded::<Vec<u8>>(QUEUE_DEPTH);
        let dropped = Arc::new(AtomicU64::new(0));

        let overflow = Arc::clone(&dropped);
        let sink = Box::new(move |bytes: &[u8]| {
            if tx.try_send(bytes.to_vec()).is_err() {
                overflow.fetch_add(bytes.len() as u64, Ordering::Relaxed);
            }
        });

        let stream = StreamThread::spawn("cpal-call-input", self.device_name.clone(), format, sink)?;
        Ok(Box::new(CpalDeviceHandle {
            stream,
            reader: ChunkReader::new(rx, buffer_bytes, self.read_timeout),
            dropped,
            draining: false,
        }))
    }
}

struct CpalDeviceHandle {
    stream: StreamThread,
    reader: ChunkReader,
    dropped: Arc<AtomicU64>,
    draining: bool,
}

impl AudioDeviceHandle for CpalDeviceHandle {
    fn state(&self) -> DeviceState {
        self.stream.state()
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.stream.play()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        if self.stream.has_failed() {
            return Err(CaptureError::DeviceNotAvailable);
        }
        self.reader.read(buf)
    }

    fn read_pending(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        // Pause first so the queue stops growing and the drain ends.
        if !self.draining {
            self.draining = true;
            if let Err(e) = self.stream.pause() {
                log::warn!("Failed to pause input stream before drain: {}", e);
            }
        }
        Ok(self.reader.try_read(buf))
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > 0 {
            log::warn!("Capture queue overflowed, {} bytes dropped", dropped);
        }
        self.stream.pause()
    }

    fn release(&mut self) {
        self.stream.close();
    }
}

/// Splits queued callback buffers into caller-sized reads.
struct ChunkReader {
    rx: Receiver<Vec<u8>>,
    pending: Vec<u8>,
    offset: usize,
    timeout: Duration,
}

impl ChunkReader {
    fn new(rx: Receiver<Vec<u8>>, capacity: usize, timeout: Duration) -> Self {
        Self {
            rx,
            pending: Vec::with_capacity(capacity),
            offset: 0,
            timeout,
        }
    }

    /// Copy queued bytes into `buf`. `Ok(0)` on timeout; an error once the
    /// stream is gone and the queue is empty.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        if self.offset >= self.pending.len() {
            match self.rx.recv_timeout(self.timeout) {
                Ok(chunk) => self.refill(chunk),
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::DeviceNotAvailable),
            }
        }
        Ok(self.copy_out(buf))
    }

    /// Like `read` but never waits; an empty or closed queue yields 0.
    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        if self.offset >= self.pending.len() {
            match self.rx.try_recv() {
                Ok(chunk) => self.refill(chunk),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return 0,
            }
        }
        self.copy_out(buf)
    }

    fn refill(&mut self, chunk: Vec<u8>) {
        self.pending = chunk;
        self.offset = 0;
    }

    fn copy_out(&mut self, buf: &mut [u8]) -> usize {
        let n = (self.pending.len() - self.offset).min(buf.len());
        buf[..n].copy_from_slice(&self.pending[self.offset..self.offset + n]);
        self.offset += n;
        n
    }
}
