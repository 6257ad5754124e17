//! Tone playback engine
//!
//! A cpal output stream fed by a small voice mixer. Each call to
//! [`AudioPlayerHandle::play_tone`] renders one fire-and-forget voice: a
//! sampler function evaluated per sample, shaped by an exponential
//! fade-in/out envelope, summed with whatever else is sounding. The stream
//! lives on a dedicated thread (cpal streams are not `Send`), so the handle
//! itself can be shared freely between the REPL and the playback scheduler.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

/// A per-sample amplitude function in [-1, 1], indexed by sample count.
pub type Sampler = Box<dyn FnMut(u64) -> f32 + Send>;

/// Default voice volume, a comfortable preview level.
pub const DEFAULT_VOLUME: f32 = 0.2;

/// Default fade-in/out length in seconds, just enough to avoid clicks.
pub const DEFAULT_FADE: f32 = 0.025;

/// Envelope floor for the exponential ramps; zero is unreachable on an
/// exponential curve, so fades start and end here.
const ENVELOPE_FLOOR: f32 = 0.00001;

/// One sounding tone.
struct Voice {
    sampler: Sampler,
    pos: u64,
    len: u64,
    volume: f32,
    fade: u64,
}

impl Voice {
    fn envelope(&self) -> f32 {
        if self.fade == 0 {
            return self.volume;
        }
        let ratio = self.volume / ENVELOPE_FLOOR;
        let pos = self.pos as f32;
        let len = self.len as f32;
        let fade = self.fade as f32;
        if pos < fade {
            ENVELOPE_FLOOR * ratio.powf(pos / fade)
        } else if pos > len - fade {
            ENVELOPE_FLOOR * ratio.powf((len - pos) / fade)
        } else {
            self.volume
        }
    }

    fn next_sample(&mut self) -> f32 {
        let value = (self.sampler)(self.pos) * self.envelope();
        self.pos += 1;
        value
    }

    fn finished(&self) -> bool {
        self.pos >= self.len
    }
}

/// Shared mixer state between the handle and the stream callback.
#[derive(Default)]
struct Mixer {
    voices: Vec<Voice>,
}

impl Mixer {
    fn next_frame(&mut self) -> f32 {
        let mut sum = 0.0;
        for voice in &mut self.voices {
            sum += voice.next_sample();
        }
        self.voices.retain(|v| !v.finished());
        sum.clamp(-1.0, 1.0)
    }
}

pub struct AudioPlayerHandle {
    state: Arc<Mutex<Mixer>>,
    sample_rate: f32,
    /// Dropping this ends the stream thread.
    _keepalive: Sender<()>,
}

impl AudioPlayerHandle {
    /// Open the default output device and start a silent stream.
    pub fn new() -> Result<Self> {
        let state = Arc::new(Mutex::new(Mixer::default()));
        let (ready_tx, ready_rx) = bounded(1);
        let (keepalive, shutdown_rx) = bounded::<()>(0);

        let thread_state = state.clone();
        thread::spawn(move || run_stream_thread(thread_state, ready_tx, shutdown_rx));

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| anyhow!("Audio thread exited before reporting readiness"))??;

        Ok(AudioPlayerHandle {
            state,
            sample_rate,
            _keepalive: keepalive,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Play a tone with the default volume and fade envelope.
    pub fn play_tone(&self, sampler: Sampler, duration_secs: f64) -> Result<()> {
        self.play_tone_with(sampler, duration_secs, DEFAULT_VOLUME, DEFAULT_FADE)
    }

    /// Play a tone: `sampler` is evaluated once per sample for
    /// `duration_secs`, scaled by `volume`, with exponential fades of
    /// `fade_secs` at both ends (pass 0.0 to play flat).
    pub fn play_tone_with(
        &self,
        sampler: Sampler,
        duration_secs: f64,
        volume: f32,
        fade_secs: f32,
    ) -> Result<()> {
        let len = (duration_secs * self.sample_rate as f64) as u64;
        if len == 0 {
            return Ok(());
        }
        let fade = ((fade_secs * self.sample_rate) as u64).min(len / 2);
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow!("Failed to lock mixer state: {}", e))?;
        state.voices.push(Voice {
            sampler,
            pos: 0,
            len,
            volume,
            fade,
        });
        Ok(())
    }

    /// Number of voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.state.lock().map(|s| s.voices.len()).unwrap_or(0)
    }
}

/// Owns the cpal stream for the lifetime of the handle.
fn run_stream_thread(
    state: Arc<Mutex<Mixer>>,
    ready_tx: Sender<Result<f32>>,
    shutdown_rx: Receiver<()>,
) {
    match open_stream(state) {
        Ok((stream, sample_rate)) => {
            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(anyhow!("Failed to start stream: {}", e)));
                return;
            }
            let _ = ready_tx.send(Ok(sample_rate));
            // Park until the handle is dropped; the stream dies with us.
            let _ = shutdown_rx.recv();
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
        }
    }
}

fn open_stream(state: Arc<Mutex<Mixer>>) -> Result<(Stream, f32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;
    let config = device.default_output_config()?;

    let sample_format = config.sample_format();
    let config: StreamConfig = config.into();
    let sample_rate = config.sample_rate.0 as f32;

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, state)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, state)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, state)?,
        _ => return Err(anyhow!("Unsupported sample format: {:?}", sample_format)),
    };

    Ok((stream, sample_rate))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    state: Arc<Mutex<Mixer>>,
) -> Result<Stream>
where
    T: Sample + SizedSample + Send + 'static + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    let err_fn = |err| eprintln!("an error occurred on the output audio stream: {:?}", err);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut mixer = state.lock().unwrap();
                for frame in data.chunks_mut(channels) {
                    let value: T = cpal::Sample::from_sample(mixer.next_frame());
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(len: u64, volume: f32, fade: u64) -> Voice {
        Voice {
            sampler: Box::new(|_| 1.0),
            pos: 0,
            len,
            volume,
            fade,
        }
    }

    #[test]
    fn test_envelope_fades_in_and_out() {
        let mut v = voice(1000, 0.5, 100);

        // Starts at the floor, reaches full volume after the fade.
        assert!(v.envelope() < 0.001);
        v.pos = 100;
        assert!((v.envelope() - 0.5).abs() < 0.001);
        v.pos = 500;
        assert!((v.envelope() - 0.5).abs() < 0.001);

        // Tail fades back toward the floor.
        v.pos = 999;
        assert!(v.envelope() < 0.01);
    }

    #[test]
    fn test_zero_fade_plays_flat() {
        let mut v = voice(100, 0.3, 0);
        assert_eq!(v.envelope(), 0.3);
        v.pos = 99;
        assert_eq!(v.envelope(), 0.3);
    }

    #[test]
    fn test_voice_finishes_after_duration() {
        let mut v = voice(3, 0.2, 0);
        for _ in 0..3 {
            assert!(!v.finished());
            v.next_sample();
        }
        assert!(v.finished());
    }

    #[test]
    fn test_mixer_sums_and_clamps() {
        let mut mixer = Mixer::default();
        for _ in 0..10 {
            mixer.voices.push(voice(10, 1.0, 0));
        }
        // Ten unit voices at full volume clamp to 1.0.
        assert_eq!(mixer.next_frame(), 1.0);

        // Finished voices are dropped.
        let mut mixer = Mixer::default();
        mixer.voices.push(voice(1, 0.2, 0));
        mixer.next_frame();
        assert!(mixer.voices.is_empty());
    }

    #[test]
    fn test_audio_player_creation() {
        // This may fail on systems without audio devices (like CI).
        match AudioPlayerHandle::new() {
            Ok(player) => {
                assert!(player.sample_rate() > 0.0);
            }
            Err(_) => {
                println!("AudioPlayerHandle creation failed - likely no audio device available");
            }
        }
    }
}
