/*
 *  audio.rs
 *
 *  cabinet-glow - lights for the cabinet
 *  (c) 2020-26 Stuart Hunter
 *
 *  Loopback capture feeding the VU meter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default gain applied to the mean sample magnitude
pub const DEFAULT_SCALE_FACTOR: f32 = 1.3;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no loopback capture device found")]
    NoDevice,
    #[error("device configuration error: {0}")]
    Config(String),
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to build capture stream: {0}")]
    Build(String),
    #[error("failed to start capture stream: {0}")]
    Play(String),
    #[error("capture thread: {0}")]
    Thread(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Off means VU meter games fall back to a solid color without touching the sound card
    pub enabled: bool,
    pub scale_factor: f32,
    /// Substring of the capture device name to prefer over auto detection
    pub device_hint: Option<String>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self { enabled: true, scale_factor: DEFAULT_SCALE_FACTOR, device_hint: None }
    }
}

#[derive(Debug, Default)]
struct AmplitudeSlot {
    value: f32,
    failed: Option<String>,
}

/// Single-slot amplitude shared by the capture callback and the VU generator
///
/// Values are 0..=100. Once the stream reports an error the cell is marked
/// failed and stays that way.
#[derive(Debug, Clone, Default)]
pub struct AmplitudeCell {
    slot: Arc<Mutex<AmplitudeSlot>>,
}

impl AmplitudeCell {
    pub fn new() -> Self {
        Self::default()
    }

    // a panicked writer leaves a plain f32 behind, nothing to repair
    fn lock(&self) -> MutexGuard<'_, AmplitudeSlot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self) -> f32 {
        self.lock().value
    }

    pub fn set(&self, value: f32) {
        self.lock().value = value.clamp(0.0, 100.0);
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.lock().failed = Some(reason.into());
    }

    pub fn failure(&self) -> Option<String> {
        self.lock().failed.clone()
    }
}

/// Mean absolute magnitude of a block of samples already on the 16-bit scale
pub fn block_magnitude<I>(samples: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), s| (sum + s.abs(), n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Map a block magnitude to the 0..=100 meter level
pub fn level(magnitude: f64, scale_factor: f32) -> f32 {
    (magnitude * scale_factor as f64 / 50.0).min(100.0) as f32
}

/// Choose a capture device among `inputs` for the given output device.
///
/// An explicit hint wins; otherwise an input carrying the output's name,
/// otherwise anything that looks like a monitor or loopback source.
pub fn pick_loopback(output_name: Option<&str>, hint: Option<&str>, inputs: &[String]) -> Option<usize> {
    let lower: Vec<String> = inputs.iter().map(|n| n.to_lowercase()).collect();

    if let Some(hint) = hint {
        let hint = hint.to_lowercase();
        return lower.iter().position(|n| n.contains(&hint));
    }
    if let Some(out) = output_name {
        let out = out.to_lowercase();
        if let Some(i) = lower.iter().position(|n| n.contains(&out)) {
            return Some(i);
        }
    }
    lower
        .iter()
        .position(|n| n.contains("monitor") || n.contains("loopback"))
}

fn select_device(host: &cpal::Host, hint: Option<&str>) -> Result<cpal::Device, AudioError> {
    let output = host.default_output_device();
    let output_name = output.as_ref().and_then(|d| d.name().ok());

    if hint.is_none() {
        // WASAPI hosts can open the render endpoint for capture directly
        if let Some(dev) = output {
            if dev.default_input_config().is_ok() {
                return Ok(dev);
            }
        }
    }

    let inputs: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| AudioError::Config(e.to_string()))?
        .collect();
    let names: Vec<String> = inputs
        .iter()
        .map(|d| d.name().unwrap_or_default())
        .collect();
    debug!("capture candidates: {:?}", names);

    let idx = pick_loopback(output_name.as_deref(), hint, &names).ok_or(AudioError::NoDevice)?;
    inputs.into_iter().nth(idx).ok_or(AudioError::NoDevice)
}

fn open_stream(settings: &AudioSettings, cell: &AmplitudeCell) -> Result<(cpal::Stream, String), AudioError> {
    let host = cpal::default_host();
    let device = select_device(&host, settings.device_hint.as_deref())?;
    let name = device.name().unwrap_or_else(|_| "unknown".to_string());

    let supported = device
        .default_input_config()
        .map_err(|e| AudioError::Config(e.to_string()))?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    info!(
        "audio capture: {} @ {}Hz, {} ch, {:?}",
        name, config.sample_rate.0, config.channels, sample_format
    );

    let scale = settings.scale_factor;
    let err_cell = cell.clone();
    let err_fn = move |e: cpal::StreamError| {
        error!("audio stream error: {}", e);
        err_cell.mark_failed(e.to_string());
    };

    let sink = cell.clone();
    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mag = block_magnitude(data.iter().map(|s| *s as f64 * 32768.0));
                sink.set(level(mag, scale));
            },
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mag = block_magnitude(data.iter().map(|s| *s as f64));
                sink.set(level(mag, scale));
            },
            err_fn,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let mag = block_magnitude(data.iter().map(|s| *s as f64 - 32768.0));
                sink.set(level(mag, scale));
            },
            err_fn,
            None,
        ),
        other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
    }
    .map_err(|e| AudioError::Build(e.to_string()))?;

    stream.play().map_err(|e| AudioError::Play(e.to_string()))?;
    Ok((stream, name))
}

/// Running loopback capture
///
/// The stream lives on a dedicated thread for its whole life; dropping the
/// sampler stops the stream and joins that thread.
pub struct AudioSampler {
    cell: AmplitudeCell,
    device: String,
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioSampler {
    /// Open the capture device and start streaming. Blocks until the stream
    /// is playing or has failed to start.
    pub fn start(settings: AudioSettings) -> Result<Self, AudioError> {
        let cell = AmplitudeCell::new();
        let thread_cell = cell.clone();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<String, AudioError>>(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                let stream = match open_stream(&settings, &thread_cell) {
                    Ok((stream, name)) => {
                        let _ = ready_tx.send(Ok(name));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                // parked until stop() or the sender is dropped
                let _ = stop_rx.recv();
                drop(stream);
                debug!("audio capture thread exiting");
            })
            .map_err(|e| AudioError::Thread(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(device)) => Ok(Self {
                cell,
                device,
                stop_tx: Some(stop_tx),
                thread: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(AudioError::Thread("capture thread exited before start".into()))
            }
        }
    }

    pub fn amplitude(&self) -> AmplitudeCell {
        self.cell.clone()
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("audio capture thread panicked");
            }
            info!("audio capture on {} stopped", self.device);
        }
    }
}

impl Drop for AudioSampler {
    fn drop(&mut self) {
        self.stop();
    }
}
