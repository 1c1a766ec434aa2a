//! Microphone capture for the live voice session via cpal.
//!
//! Captures at the device's native sample rate, downsamples to the
//! configured upload rate (default 16 kHz) in software, and emits
//! fixed-size frames. The audio callback never blocks: frames are
//! handed off with `try_send` and dropped (with a debug log) when the
//! channel is full.

use crate::config::AudioConfig;
use crate::error::{AdvisoryError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Audio capture from the system microphone.
pub struct CpalCapture {
    device: cpal::Device,
    stream_config: StreamConfig,
    target_sample_rate: u32,
    frame_size: usize,
}

impl CpalCapture {
    /// Create a new capture instance.
    ///
    /// Uses the device's default configuration for maximum compatibility,
    /// then downsamples to the target rate in software.
    ///
    /// # Errors
    ///
    /// Returns an error if no input device is available.
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(ref name) = config.input_device {
            host.input_devices()
                .map_err(|e| AdvisoryError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| {
                    d.description()
                        .ok()
                        .map(|desc| desc.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| AdvisoryError::Audio(format!("input device '{name}' not found")))?
        } else {
            host.default_input_device()
                .ok_or_else(|| AdvisoryError::Audio("no default input device".into()))?
        };

        let device_name = device
            .description()
            .map(|d| d.name().to_owned())
            .unwrap_or_else(|_| "<unknown>".into());
        info!("using input device: {device_name}");

        let default_config = device
            .default_input_config()
            .map_err(|e| AdvisoryError::Audio(format!("no default input config: {e}")))?;

        let native_rate = default_config.sample_rate();
        let native_channels = default_config.channels();

        let stream_config = StreamConfig {
            channels: native_channels,
            sample_rate: native_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        if native_rate != config.input_sample_rate {
            info!(
                "will downsample from {}Hz to {}Hz",
                native_rate, config.input_sample_rate
            );
        }

        Ok(Self {
            device,
            stream_config,
            target_sample_rate: config.input_sample_rate,
            frame_size: config.frame_size,
        })
    }

    /// Spawn the capture thread (cpal streams are not `Send`).
    ///
    /// Emits `frame_size`-sample frames on `tx` until the cancellation
    /// token fires, then releases the device stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(
        self,
        tx: mpsc::Sender<Vec<f32>>,
        cancel: CancellationToken,
    ) -> Result<std::thread::JoinHandle<()>> {
        std::thread::Builder::new()
            .name("live-capture".into())
            .spawn(move || self.run(&tx, &cancel))
            .map_err(|e| AdvisoryError::Audio(format!("failed to spawn capture thread: {e}")))
    }

    fn run(&self, tx: &mpsc::Sender<Vec<f32>>, cancel: &CancellationToken) {
        let native_rate = self.stream_config.sample_rate;
        let native_channels = self.stream_config.channels;
        let target_rate = self.target_sample_rate;
        let frame_size = self.frame_size;
        let tx = tx.clone();
        let mut pending: Vec<f32> = Vec::with_capacity(frame_size * 2);

        let stream = self.device.build_input_stream(
            &self.stream_config,
            move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                let mono = if native_channels > 1 {
                    to_mono(data, native_channels)
                } else {
                    data.to_vec()
                };

                let samples = if native_rate != target_rate {
                    resample(&mono, native_rate, target_rate)
                } else {
                    mono
                };

                pending.extend_from_slice(&samples);
                while pending.len() >= frame_size {
                    let frame: Vec<f32> = pending.drain(..frame_size).collect();
                    if tx.try_send(frame).is_err() {
                        debug!("capture channel full, dropping frame");
                    }
                }
            },
            move |err| {
                error!("audio input stream error: {err}");
            },
            None,
        );

        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                error!("failed to build input stream: {e}");
                return;
            }
        };

        if let Err(e) = stream.play() {
            error!("failed to start input stream: {e}");
            return;
        }

        info!(
            "live capture started: native {}Hz -> target {}Hz",
            native_rate, target_rate
        );

        while !cancel.is_cancelled() {
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        drop(stream);
        info!("live capture stopped");
    }
}

/// Convert interleaved multi-channel audio to mono by averaging channels.
fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let ch = channels as usize;
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Simple linear-interpolation resampler.
///
/// Sufficient for speech: energy sits below 8 kHz, so no anti-alias
/// filter is needed when going down to 16 kHz.
fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = src_rate as f64 / dst_rate as f64;
    let out_len = (samples.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] as f64 * (1.0 - frac) + samples[idx + 1] as f64 * frac
        } else {
            samples[idx.min(samples.len() - 1)] as f64
        };

        output.push(sample as f32);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_averages_to_mono() {
        let mono = to_mono(&[0.2, 0.4, -0.2, -0.4], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn resample_halves_length_for_double_rate() {
        let samples: Vec<f32> = (0..480).map(|i| i as f32 / 480.0).collect();
        let out = resample(&samples, 32_000, 16_000);
        assert_eq!(out.len(), 240);
    }

    #[test]
    fn resample_is_identity_at_equal_rates() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16_000, 16_000), samples);
    }
}
