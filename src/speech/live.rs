//! Live bidirectional voice session with the realtime model.
//!
//! On start the session opens a capture stream at the upload rate, a
//! playback stream at the output rate, and a websocket to the realtime
//! endpoint. Captured frames are converted to PCM16, base64-encoded,
//! and streamed out continuously; inbound audio chunks are decoded and
//! scheduled back-to-back through the [`PlaybackScheduler`] so playback
//! queues seamlessly. Explicit stop, task errors, and a server-initiated
//! close all release both device streams and zero the scheduling state.

use crate::config::{AudioConfig, GatewayConfig};
use crate::error::{AdvisoryError, Result};
use crate::profile::Language;
use crate::speech::capture::CpalCapture;
use crate::speech::pcm;
use crate::speech::scheduler::PlaybackScheduler;
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Playback timeline shared between the scheduling side (inbound task)
/// and the consuming side (audio output callback). All mutation goes
/// through this one object.
struct Timeline {
    scheduler: PlaybackScheduler,
    /// Samples played since the stream started.
    cursor: u64,
    /// Chunks admitted but not yet fully played, in start order.
    chunks: VecDeque<LiveChunk>,
}

struct LiveChunk {
    id: u64,
    start: u64,
    samples: Vec<f32>,
    offset: usize,
}

impl Timeline {
    fn new() -> Self {
        Self {
            scheduler: PlaybackScheduler::new(),
            cursor: 0,
            chunks: VecDeque::new(),
        }
    }

    /// Admit a decoded chunk at the next back-to-back start position.
    fn schedule(&mut self, samples: Vec<f32>) {
        let chunk = self.scheduler.schedule(samples.len() as u64, self.cursor);
        self.chunks.push_back(LiveChunk {
            id: chunk.id,
            start: chunk.start,
            samples,
            offset: 0,
        });
    }

    /// Produce the next output sample and advance the cursor.
    fn next_sample(&mut self) -> f32 {
        let t = self.cursor;
        self.cursor += 1;

        loop {
            let Some(front) = self.chunks.front_mut() else {
                return 0.0;
            };
            if t < front.start {
                return 0.0;
            }
            if front.offset < front.samples.len() {
                let sample = front.samples[front.offset];
                front.offset += 1;
                if front.offset == front.samples.len() {
                    let id = front.id;
                    self.chunks.pop_front();
                    self.scheduler.complete(id);
                }
                return sample;
            }
            let id = front.id;
            self.chunks.pop_front();
            self.scheduler.complete(id);
        }
    }

    /// Drop all queued audio and zero the scheduling state.
    fn reset(&mut self) {
        self.scheduler.reset();
        self.chunks.clear();
        self.cursor = 0;
    }
}

/// An active live voice session.
///
/// Owns exactly its resources: the capture thread, the playback thread,
/// the two websocket tasks, and the playback timeline. Constructed only
/// on a successful session open; torn down completely by [`stop`],
/// a task error, or a server close.
///
/// [`stop`]: LiveVoiceSession::stop
pub struct LiveVoiceSession {
    cancel: CancellationToken,
    timeline: Arc<Mutex<Timeline>>,
    capture_thread: Option<std::thread::JoinHandle<()>>,
    playback_thread: Option<std::thread::JoinHandle<()>>,
    outbound: tokio::task::JoinHandle<()>,
    inbound: tokio::task::JoinHandle<()>,
}

impl LiveVoiceSession {
    /// Open a live session: connect, send the setup turn, then start
    /// capture, playback, and the two streaming tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the websocket cannot be opened, the setup
    /// message cannot be sent, or no capture device is available.
    pub async fn start(
        audio: &AudioConfig,
        gateway: &GatewayConfig,
        api_key: &str,
        language: Language,
    ) -> Result<Self> {
        let url = format!("{}?key={api_key}", gateway.live_url);
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| AdvisoryError::Session(format!("failed to connect: {e}")))?;
        info!("live session connected: {}", gateway.live_model);

        let (mut ws_tx, mut ws_rx) = ws.split();

        let voice = if language == Language::Hi { "Kore" } else { "Zephyr" };
        let setup = json!({
            "setup": {
                "model": gateway.live_model,
                "generationConfig": {
                    "responseModalities": ["AUDIO"],
                    "speechConfig": {
                        "voiceConfig": {"prebuiltVoiceConfig": {"voiceName": voice}},
                    },
                },
                "systemInstruction": {
                    "parts": [{
                        "text": format!(
                            "You are Kisan-Bhai, the friendly AI Farmer advisor. Talking in {}.",
                            language.code(),
                        )
                    }]
                },
            }
        });
        ws_tx
            .send(Message::Text(setup.to_string().into()))
            .await
            .map_err(|e| AdvisoryError::Session(format!("failed to send setup: {e}")))?;

        // Device streams come up only after the session is open, so a
        // connection failure never leaves a dangling capture stream.
        let capture = CpalCapture::new(audio)?;
        let cancel = CancellationToken::new();
        let timeline = Arc::new(Mutex::new(Timeline::new()));

        let (frame_tx, mut frame_rx) = mpsc::channel::<Vec<f32>>(32);
        let capture_thread = capture.spawn(frame_tx, cancel.clone())?;
        let playback_thread =
            spawn_playback(audio, Arc::clone(&timeline), cancel.clone())?;

        let upload_rate = audio.input_sample_rate;
        let outbound_cancel = cancel.clone();
        let outbound = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = outbound_cancel.cancelled() => break,
                    frame = frame_rx.recv() => {
                        let Some(frame) = frame else { break };
                        let payload = pcm::encode_base64(&pcm::f32_to_pcm16(&frame));
                        let message = json!({
                            "realtimeInput": {
                                "mediaChunks": [{
                                    "mimeType": format!("audio/pcm;rate={upload_rate}"),
                                    "data": payload,
                                }],
                            }
                        });
                        if let Err(e) = ws_tx.send(Message::Text(message.to_string().into())).await {
                            warn!("live uplink closed: {e}");
                            outbound_cancel.cancel();
                            break;
                        }
                    }
                }
            }
        });

        let inbound_cancel = cancel.clone();
        let inbound_timeline = Arc::clone(&timeline);
        let inbound = tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = inbound_cancel.cancelled() => break,
                    message = ws_rx.next() => {
                        match message {
                            Some(Ok(Message::Text(text))) => {
                                handle_server_message(text.as_bytes(), &inbound_timeline);
                            }
                            Some(Ok(Message::Binary(bytes))) => {
                                handle_server_message(&bytes, &inbound_timeline);
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                info!("live session closed by server");
                                inbound_cancel.cancel();
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                error!("live downlink error: {e}");
                                inbound_cancel.cancel();
                                break;
                            }
                        }
                    }
                }
            }
            if let Ok(mut timeline) = inbound_timeline.lock() {
                timeline.reset();
            }
        });

        Ok(Self {
            cancel,
            timeline,
            capture_thread: Some(capture_thread),
            playback_thread: Some(playback_thread),
            outbound,
            inbound,
        })
    }

    /// Whether the session is still running (not stopped or closed).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop the session: halt both device streams, close the streaming
    /// tasks, and reset playback scheduling state to zero.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        let _ = (&mut self.outbound).await;
        let _ = (&mut self.inbound).await;
        if let Some(thread) = self.capture_thread.take() {
            let _ = thread.join();
        }
        if let Some(thread) = self.playback_thread.take() {
            let _ = thread.join();
        }
        if let Ok(mut timeline) = self.timeline.lock() {
            timeline.reset();
        }
        info!("live session stopped");
    }
}

impl Drop for LiveVoiceSession {
    fn drop(&mut self) {
        // Belt-and-braces: the worker threads watch this token, so the
        // device streams are released even without an explicit stop.
        self.cancel.cancel();
    }
}

/// Decode and schedule the audio payload of one server message, if any.
fn handle_server_message(raw: &[u8], timeline: &Arc<Mutex<Timeline>>) {
    let Ok(message) = serde_json::from_slice::<serde_json::Value>(raw) else {
        debug!("ignoring unparsable server message");
        return;
    };
    let Some(payload) =
        message["serverContent"]["modelTurn"]["parts"][0]["inlineData"]["data"].as_str()
    else {
        return;
    };
    let Ok(bytes) = pcm::decode_base64(payload) else {
        warn!("dropping undecodable audio chunk");
        return;
    };
    let samples = pcm::pcm16_to_f32(&bytes);
    if samples.is_empty() {
        return;
    }
    if let Ok(mut timeline) = timeline.lock() {
        timeline.schedule(samples);
    }
}

/// Spawn the playback thread: an output stream draining the timeline
/// until cancellation.
fn spawn_playback(
    audio: &AudioConfig,
    timeline: Arc<Mutex<Timeline>>,
    cancel: CancellationToken,
) -> Result<std::thread::JoinHandle<()>> {
    let output_device = audio.output_device.clone();
    let sample_rate = audio.output_sample_rate;
    std::thread::Builder::new()
        .name("live-playback".into())
        .spawn(move || run_playback(output_device.as_deref(), sample_rate, &timeline, &cancel))
        .map_err(|e| AdvisoryError::Audio(format!("failed to spawn playback thread: {e}")))
}

fn run_playback(
    output_device: Option<&str>,
    sample_rate: u32,
    timeline: &Arc<Mutex<Timeline>>,
    cancel: &CancellationToken,
) {
    let host = cpal::default_host();
    let device = match output_device {
        Some(name) => host
            .output_devices()
            .ok()
            .and_then(|mut devices| {
                devices.find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
            }),
        None => host.default_output_device(),
    };
    let Some(device) = device else {
        error!("no output device for live playback");
        return;
    };

    let stream_config = StreamConfig {
        channels: 1,
        sample_rate,
        buffer_size: cpal::BufferSize::Default,
    };

    let callback_timeline = Arc::clone(timeline);
    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
            let Ok(mut timeline) = callback_timeline.lock() else {
                data.fill(0.0);
                return;
            };
            for sample in data.iter_mut() {
                *sample = timeline.next_sample();
            }
        },
        move |err| {
            error!("live playback stream error: {err}");
        },
        None,
    );

    let stream = match stream {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to build live playback stream: {e}");
            return;
        }
    };

    if let Err(e) = stream.play() {
        error!("failed to start live playback stream: {e}");
        return;
    }

    info!("live playback started at {sample_rate}Hz");
    while !cancel.is_cancelled() {
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    drop(stream);
    info!("live playback stopped");
}
