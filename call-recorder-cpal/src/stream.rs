//! Owner thread for a `cpal` input stream.
//!
//! The stream is built, played, paused, and dropped on one dedicated thread.
//! Callers hold a `StreamThread` that is `Send` and talks to that thread
//! over a command channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, SizedSample, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Sender};

use call_recorder_core::models::audio_models::{CaptureFormat, DeviceState};
use call_recorder_core::models::error::CaptureError;
use call_recorder_core::processing::pcm::{f32_to_pcm16, i16_to_pcm16, remap_channels, u16_to_pcm16};

use crate::devices::find_input_device;

/// Receives PCM16 little-endian bytes in the requested channel layout.
pub(crate) type DataSink = Box<dyn FnMut(&[u8]) + Send + 'static>;

type Reply = Sender<Result<(), CaptureError>>;

enum Command {
    Play(Reply),
    Pause(Reply),
}

/// One supported input configuration, reduced to what selection needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ConfigCandidate {
    pub channels: u16,
    pub min_rate: u32,
    pub max_rate: u32,
    pub format: SampleFormat,
}

impl From<&cpal::SupportedStreamConfigRange> for ConfigCandidate {
    fn from(range: &cpal::SupportedStreamConfigRange) -> Self {
        Self {
            channels: range.channels(),
            min_rate: range.min_sample_rate().0,
            max_rate: range.max_sample_rate().0,
            format: range.sample_format(),
        }
    }
}

fn format_rank(format: SampleFormat) -> Option<u8> {
    match format {
        SampleFormat::I16 => Some(0),
        SampleFormat::F32 => Some(1),
        SampleFormat::U16 => Some(2),
        _ => None,
    }
}

/// Pick a configuration that supports `rate` exactly.
///
/// Prefers the requested channel count, then formats needing the least
/// conversion. Channel mismatches are remapped in the callback.
pub(crate) fn select_config(candidates: &[ConfigCandidate], rate: u32, channels: u16) -> Option<ConfigCandidate> {
    candidates
        .iter()
        .filter(|c| c.min_rate <= rate && rate <= c.max_rate && c.channels > 0)
        .filter_map(|c| format_rank(c.format).map(|rank| (c, rank)))
        .min_by_key(|(c, rank)| (c.channels != channels, *rank))
        .map(|(c, _)| *c)
}

/// Handle to a stream owned by a dedicated thread.
pub(crate) struct StreamThread {
    commands: Option<Sender<Command>>,
    handle: Option<thread::JoinHandle<()>>,
    state: DeviceState,
    failed: Arc<AtomicBool>,
}

impl StreamThread {
    /// Spawn the owner thread and build the stream on it.
    ///
    /// A missing device is an error. A device that cannot be configured for
    /// `format` yields a handle in `DeviceState::Uninitialized`.
    pub(crate) fn spawn(
        name: &str,
        device_name: Option<String>,
        format: &CaptureFormat,
        sink: DataSink,
    ) -> Result<Self, CaptureError> {
        let (command_tx, command_rx) = unbounded::<Command>();
        let (init_tx, init_rx) = bounded::<Result<(), CaptureError>>(1);
        let failed = Arc::new(AtomicBool::new(false));
        let format = *format;
        let stream_failed = Arc::clone(&failed);

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let stream = match build_stream(device_name.as_deref(), &format, sink, stream_failed) {
                    Ok(stream) => {
                        let _ = init_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };

                for command in command_rx.iter() {
                    match command {
                        Command::Play(reply) => {
                            let result = stream
                                .play()
                                .map_err(|e| CaptureError::DeviceInitFailed(format!("play failed: {}", e)));
                            let _ = reply.send(result);
                        }
                        Command::Pause(reply) => {
                            let result = stream
                                .pause()
                                .map_err(|e| CaptureError::Unknown(format!("pause failed: {}", e)));
                            let _ = reply.send(result);
                        }
                    }
                }
                // Every sender is gone: drop the stream on its own thread.
                drop(stream);
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn stream thread: {}", e)))?;

        let init = init_rx
            .recv()
            .unwrap_or_else(|_| Err(CaptureError::Unknown("stream thread exited during init".into())));

        let state = match init {
            Ok(()) => DeviceState::Initialized,
            Err(CaptureError::DeviceNotAvailable) => {
                let _ = handle.join();
                return Err(CaptureError::DeviceNotAvailable);
            }
            Err(e) => {
                log::error!("Input stream did not initialize: {}", e);
                DeviceState::Uninitialized
            }
        };

        Ok(Self {
            commands: Some(command_tx),
            handle: Some(handle),
            state,
            failed,
        })
    }

    pub(crate) fn state(&self) -> DeviceState {
        self.state
    }

    /// Whether the stream reported an error since it was built.
    pub(crate) fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    pub(crate) fn play(&self) -> Result<(), CaptureError> {
        self.request(Command::Play)
    }

    pub(crate) fn pause(&self) -> Result<(), CaptureError> {
        self.request(Command::Pause)
    }

    fn request(&self, make: fn(Reply) -> Command) -> Result<(), CaptureError> {
        if self.state != DeviceState::Initialized {
            return Err(CaptureError::DeviceInitFailed("stream not initialized".into()));
        }
        let commands = self.commands.as_ref().ok_or(CaptureError::DeviceNotAvailable)?;
        let (reply_tx, reply_rx) = bounded(1);
        commands
            .send(make(reply_tx))
            .map_err(|_| CaptureError::DeviceNotAvailable)?;
        reply_rx.recv().unwrap_or(Err(CaptureError::DeviceNotAvailable))
    }

    /// Drop the stream and join its thread. Idempotent.
    pub(crate) fn close(&mut self) {
        self.commands.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Stream owner thread panicked");
            }
        }
    }
}

impl Drop for StreamThread {
    fn drop(&mut self) {
        self.close();
    }
}

fn build_stream(
    device_name: Option<&str>,
    format: &CaptureFormat,
    sink: DataSink,
    failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, CaptureError> {
    let device = find_input_device(device_name)?;
    log::debug!(
        "Input device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );

    let candidates: Vec<ConfigCandidate> = device
        .supported_input_configs()
        .map_err(|e| CaptureError::DeviceInitFailed(format!("failed to query input configs: {}", e)))?
        .map(|range| ConfigCandidate::from(&range))
        .collect();

    let target_channels = format.channel_count();
    let chosen = select_config(&candidates, format.sample_rate_hz, target_channels).ok_or_else(|| {
        CaptureError::DeviceInitFailed(format!(
            "no input config supports {} Hz",
            format.sample_rate_hz
        ))
    })?;

    let config = StreamConfig {
        channels: chosen.channels,
        sample_rate: SampleRate(format.sample_rate_hz),
        buffer_size: BufferSize::Default,
    };
    let from = chosen.channels;
    log::debug!(
        "Stream config: {} Hz, {:?}, {} channels (delivering {})",
        format.sample_rate_hz,
        chosen.format,
        from,
        target_channels
    );

    match chosen.format {
        SampleFormat::I16 => build_typed(&device, &config, sink, failed, move |data: &[i16]| {
            i16_to_pcm16(&remap_channels(data, from, target_channels))
        }),
        SampleFormat::F32 => build_typed(&device, &config, sink, failed, move |data: &[f32]| {
            f32_to_pcm16(&remap_channels(data, from, target_channels))
        }),
        SampleFormat::U16 => build_typed(&device, &config, sink, failed, move |data: &[u16]| {
            u16_to_pcm16(&remap_channels(data, from, target_channels))
        }),
        other => Err(CaptureError::DeviceInitFailed(format!(
            "unsupported sample format {:?}",
            other
        ))),
    }
}

fn build_typed<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut sink: DataSink,
    failed: Arc<AtomicBool>,
    convert: F,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    F: Fn(&[T]) -> Vec<u8> + Send + 'static,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| sink(&convert(data)),
            move |err| {
                log::error!("Input stream error: {}", err);
                failed.store(true, Ordering::SeqCst);
            },
            None,
        )
        .map_err(|e| CaptureError::DeviceInitFailed(format!("failed to build input stream: {}", e)))
}
