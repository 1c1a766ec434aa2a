//! One-shot audio playback via cpal, on a dedicated worker thread.
//!
//! cpal streams are not `Send`, so a worker thread owns them and is
//! driven by commands over a channel. At most one utterance plays at a
//! time: a new play command preempts the active one, and a stop command
//! halts output immediately. The completion callback fires on every exit
//! path (finished, stopped, preempted, device error).

use crate::config::AudioConfig;
use crate::error::{AdvisoryError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Completion callback invoked when an utterance stops being audible.
pub type DoneCallback = Box<dyn FnOnce() + Send>;

/// Destination for synthesized speech.
///
/// The production implementation is [`PlaybackWorker`]; tests substitute
/// their own sink to observe play/stop calls without a device.
pub trait SpeechSink: Send + Sync {
    /// Start playing `samples`; `done` fires when playback ends for any
    /// reason.
    fn play(&self, samples: Vec<f32>, sample_rate: u32, done: DoneCallback);

    /// Stop the active utterance, if any.
    fn stop(&self);
}

enum Command {
    Play {
        samples: Vec<f32>,
        sample_rate: u32,
        done: DoneCallback,
    },
    Stop,
}

/// Speaker playback worker. Cheap to clone handles are not needed; the
/// orchestrator shares it behind an `Arc`.
pub struct PlaybackWorker {
    tx: Sender<Command>,
}

impl PlaybackWorker {
    /// Spawn the worker thread.
    pub fn spawn(config: &AudioConfig) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let output_device = config.output_device.clone();
        std::thread::Builder::new()
            .name("speech-playback".into())
            .spawn(move || run_worker(&rx, output_device.as_deref()))
            .map_err(|e| error!("failed to spawn playback worker: {e}"))
            .ok();
        Self { tx }
    }
}

impl SpeechSink for PlaybackWorker {
    fn play(&self, samples: Vec<f32>, sample_rate: u32, done: DoneCallback) {
        if self
            .tx
            .send(Command::Play {
                samples,
                sample_rate,
                done,
            })
            .is_err()
        {
            error!("playback worker is gone; dropping utterance");
        }
    }

    fn stop(&self) {
        let _ = self.tx.send(Command::Stop);
    }
}

fn run_worker(rx: &Receiver<Command>, output_device: Option<&str>) {
    let mut next: Option<Command> = None;
    loop {
        let command = match next.take() {
            Some(command) => command,
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => return,
            },
        };

        let Command::Play {
            samples,
            sample_rate,
            done,
        } = command
        else {
            // Stop with nothing playing.
            continue;
        };

        next = play_utterance(output_device, samples, sample_rate, rx);
        done();
    }
}

/// Play one utterance to completion, returning early if a new command
/// arrives. A preempting play command is handed back to the worker loop.
fn play_utterance(
    output_device: Option<&str>,
    samples: Vec<f32>,
    sample_rate: u32,
    rx: &Receiver<Command>,
) -> Option<Command> {
    let stream = match build_output_stream(output_device, samples, sample_rate) {
        Ok(stream) => stream,
        Err(e) => {
            error!("playback failed: {e}");
            return None;
        }
    };
    let (stream, finished) = stream;

    if let Err(e) = stream.play() {
        error!("failed to start output stream: {e}");
        return None;
    }

    loop {
        std::thread::sleep(std::time::Duration::from_millis(10));
        if finished.lock().map(|f| *f).unwrap_or(true) {
            return None;
        }
        match rx.try_recv() {
            Ok(Command::Stop) => {
                debug!("playback stopped");
                return None;
            }
            Ok(preempting @ Command::Play { .. }) => return Some(preempting),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return None,
        }
    }
}

type FinishedFlag = Arc<Mutex<bool>>;

fn build_output_stream(
    output_device: Option<&str>,
    samples: Vec<f32>,
    sample_rate: u32,
) -> Result<(cpal::Stream, FinishedFlag)> {
    let host = cpal::default_host();

    let device = if let Some(name) = output_device {
        host.output_devices()
            .map_err(|e| AdvisoryError::Audio(format!("cannot enumerate devices: {e}")))?
            .find(|d| {
                d.description()
                    .ok()
                    .map(|desc| desc.name() == name)
                    .unwrap_or(false)
            })
            .ok_or_else(|| AdvisoryError::Audio(format!("output device '{name}' not found")))?
    } else {
        host.default_output_device()
            .ok_or_else(|| AdvisoryError::Audio("no default output device".into()))?
    };

    let device_name = device
        .description()
        .map(|d| d.name().to_owned())
        .unwrap_or_else(|_| "<unknown>".into());
    info!("using output device: {device_name}");

    let stream_config = StreamConfig {
        channels: 1,
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };

    let finished: FinishedFlag = Arc::new(Mutex::new(false));
    let finished_clone = Arc::clone(&finished);
    let mut position = 0usize;

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                for sample in data.iter_mut() {
                    if position < samples.len() {
                        *sample = samples[position];
                        position += 1;
                    } else {
                        *sample = 0.0;
                        if let Ok(mut f) = finished_clone.lock() {
                            *f = true;
                        }
                    }
                }
            },
            move |err| {
                error!("audio output stream error: {err}");
            },
            None,
        )
        .map_err(|e| AdvisoryError::Audio(format!("failed to build output stream: {e}")))?;

    Ok((stream, finished))
}
