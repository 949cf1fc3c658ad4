//! Audio playback for one resource at a time
//!
//! [`PlayerState`] is the pure state machine (load phase, play/pause,
//! position clamped to duration); [`ClipPlayer`] binds it to decoded
//! samples and a cpal output stream. Decoding happens at load time, so
//! everything except the stream itself is testable without hardware.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Load phase of a playback resource
///
/// `Failed` is terminal for the resource and deliberately distinguishable
/// from `Loading`, so a view can show an error instead of spinning forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Bytes not yet decoded; duration unknown
    Loading,
    /// Decoded and playable
    Ready,
    /// Decode or device failure; resource will never play
    Failed,
}

/// Pure playback state for a single audio resource
#[derive(Debug)]
pub struct PlayerState {
    load: LoadPhase,
    playing: bool,
    position_secs: f32,
    duration_secs: f32,
}

impl PlayerState {
    /// Fresh state: loading, paused, duration unknown
    #[must_use]
    pub const fn new() -> Self {
        Self {
            load: LoadPhase::Loading,
            playing: false,
            position_secs: 0.0,
            duration_secs: 0.0,
        }
    }

    /// Current load phase
    #[must_use]
    pub const fn load_phase(&self) -> LoadPhase {
        self.load
    }

    /// True while audio is playing
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playhead position in seconds
    #[must_use]
    pub const fn position_secs(&self) -> f32 {
        self.position_secs
    }

    /// Total duration in seconds; 0 until ready
    #[must_use]
    pub const fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    /// Mark the resource decoded with a known duration
    pub fn ready(&mut self, duration_secs: f32) {
        self.load = LoadPhase::Ready;
        self.duration_secs = duration_secs;
        self.position_secs = 0.0;
        self.playing = false;
    }

    /// Mark the resource failed; it stays paused at position 0
    pub fn fail(&mut self) {
        self.load = LoadPhase::Failed;
        self.playing = false;
        self.position_secs = 0.0;
        self.duration_secs = 0.0;
    }

    /// Flip play/pause; returns the new playing flag, or `None` when the
    /// resource is not ready
    pub fn toggle(&mut self) -> Option<bool> {
        if !matches!(self.load, LoadPhase::Ready) {
            return None;
        }
        self.playing = !self.playing;
        Some(self.playing)
    }

    /// Report playhead progress, clamped to `[0, duration]`
    pub fn progress(&mut self, secs: f32) {
        if matches!(self.load, LoadPhase::Ready) {
            self.position_secs = secs.clamp(0.0, self.duration_secs);
        }
    }

    /// Move the playhead, clamped to `[0, duration]`; no-op unless ready
    pub fn seek(&mut self, secs: f32) {
        if matches!(self.load, LoadPhase::Ready) {
            self.position_secs = secs.clamp(0.0, self.duration_secs);
        }
    }

    /// End of stream: pause and rewind to the start
    pub fn ended(&mut self) {
        self.playing = false;
        self.position_secs = 0.0;
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback notifications drained by the owning view each tick
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playhead advanced to this position (seconds)
    Progress(f32),
    /// Playback reached the end of the resource
    Ended,
    /// The resource failed to load or play
    Error(String),
}

/// Playhead shared with the audio callback
struct PlaybackCursor {
    pos: AtomicUsize,
    ended: AtomicBool,
}

/// Plays one decoded audio resource through the default output device
pub struct ClipPlayer {
    state: PlayerState,
    source: Option<String>,
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
    cursor: Arc<PlaybackCursor>,
    stream: Option<Stream>,
    pending: Vec<PlayerEvent>,
}

impl ClipPlayer {
    /// Create a player with nothing loaded
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PlayerState::new(),
            source: None,
            samples: Arc::new(Vec::new()),
            sample_rate: 0,
            cursor: Arc::new(PlaybackCursor {
                pos: AtomicUsize::new(0),
                ended: AtomicBool::new(false),
            }),
            stream: None,
            pending: Vec::new(),
        }
    }

    /// Playback state snapshot
    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Source identifier of the loaded resource
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// True once a decode or device failure made this resource unplayable
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self.state.load_phase(), LoadPhase::Failed)
    }

    /// Decode and attach an audio resource (WAV or MP3 bytes)
    ///
    /// Idempotent when `source` is already loaded and ready. Loading a new
    /// source releases the previous stream handle first. A decode failure
    /// leaves the player in the failed phase and queues a
    /// [`PlayerEvent::Error`].
    pub fn load(&mut self, source: &str, bytes: &[u8]) {
        if self.source.as_deref() == Some(source)
            && self.state.load_phase() == LoadPhase::Ready
        {
            return;
        }

        // Release the previous resource before touching state
        self.stream = None;
        self.cursor.pos.store(0, Ordering::Relaxed);
        self.cursor.ended.store(false, Ordering::Relaxed);
        self.source = Some(source.to_string());
        self.state = PlayerState::new();

        match decode_audio(bytes) {
            Ok((samples, sample_rate)) => {
                #[allow(clippy::cast_precision_loss)]
                let duration = samples.len() as f32 / sample_rate.max(1) as f32;
                self.samples = Arc::new(samples);
                self.sample_rate = sample_rate;
                self.state.ready(duration);
                tracing::debug!(source, duration, sample_rate, "audio resource loaded");
            }
            Err(e) => {
                self.samples = Arc::new(Vec::new());
                self.sample_rate = 0;
                self.state.fail();
                tracing::warn!(source, error = %e, "audio resource failed to load");
                self.pending.push(PlayerEvent::Error(e.to_string()));
            }
        }
    }

    /// Flip play/pause
    ///
    /// A no-op while loading or failed. The output stream is created on the
    /// first play and reused across pauses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Playback`] if the output device refuses the stream;
    /// the player is marked failed in that case
    pub fn toggle(&mut self) -> Result<()> {
        let Some(now_playing) = self.state.toggle() else {
            return Ok(());
        };

        if now_playing {
            if self.stream.is_none() {
                match self.build_stream() {
                    Ok(stream) => self.stream = Some(stream),
                    Err(e) => {
                        self.state.fail();
                        self.pending.push(PlayerEvent::Error(e.to_string()));
                        return Err(e);
                    }
                }
            }
            if let Some(stream) = &self.stream {
                stream
                    .play()
                    .map_err(|e| Error::Playback(e.to_string()))?;
            }
        } else if let Some(stream) = &self.stream {
            stream
                .pause()
                .map_err(|e| Error::Playback(e.to_string()))?;
        }

        Ok(())
    }

    /// Move the playhead to `secs`, clamped to the clip length
    pub fn seek(&mut self, secs: f32) {
        if self.state.load_phase() != LoadPhase::Ready {
            return;
        }
        self.state.seek(secs);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let sample = (self.state.position_secs() * self.sample_rate as f32) as usize;
        self.cursor
            .pos
            .store(sample.min(self.samples.len()), Ordering::Relaxed);
        self.cursor.ended.store(false, Ordering::Relaxed);
    }

    /// Advance the observed state and drain playback events
    ///
    /// Call once per UI tick. Emits `Progress` while playing, `Ended` once
    /// when the clip runs out (position rewinds to 0), and any queued
    /// `Error`.
    pub fn tick(&mut self) -> Vec<PlayerEvent> {
        let mut events = std::mem::take(&mut self.pending);

        if self.state.load_phase() != LoadPhase::Ready {
            return events;
        }

        if self.cursor.ended.swap(false, Ordering::Relaxed) {
            if let Some(stream) = &self.stream {
                // Best effort; the stream is kept for replays
                if let Err(e) = stream.pause() {
                    tracing::warn!(error = %e, "failed to pause drained stream");
                }
            }
            self.cursor.pos.store(0, Ordering::Relaxed);
            self.state.ended();
            events.push(PlayerEvent::Ended);
            return events;
        }

        if self.state.is_playing() {
            #[allow(clippy::cast_precision_loss)]
            let secs =
                self.cursor.pos.load(Ordering::Relaxed) as f32 / self.sample_rate.max(1) as f32;
            self.state.progress(secs);
            events.push(PlayerEvent::Progress(self.state.position_secs()));
        }

        events
    }

    fn build_stream(&self) -> Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Playback("no output device".to_string()))?;

        let rate = self.sample_rate;
        let supported_config = device
            .supported_output_configs()
            .map_err(|e| Error::Playback(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(rate)
                    && c.max_sample_rate() >= SampleRate(rate)
            })
            .or_else(|| {
                // Fallback: stereo at the clip rate
                device.supported_output_configs().ok()?.find(|c| {
                    c.channels() == 2
                        && c.min_sample_rate() <= SampleRate(rate)
                        && c.max_sample_rate() >= SampleRate(rate)
                })
            })
            .ok_or_else(|| Error::Playback("no suitable output config".to_string()))?;

        let config: StreamConfig = supported_config.with_sample_rate(SampleRate(rate)).config();
        let channels = config.channels as usize;

        let samples = Arc::clone(&self.samples);
        let cursor = Arc::clone(&self.cursor);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = cursor.pos.load(Ordering::Relaxed);
                    for frame in data.chunks_mut(channels) {
                        let sample = if pos < samples.len() {
                            let s = samples[pos];
                            pos += 1;
                            s
                        } else {
                            cursor.ended.store(true, Ordering::Relaxed);
                            0.0
                        };
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                    cursor.pos.store(pos, Ordering::Relaxed);
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Playback(e.to_string()))?;

        Ok(stream)
    }
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode WAV or MP3 bytes to mono f32 samples and their sample rate
///
/// # Errors
///
/// Returns [`Error::Playback`] for empty, unrecognized, or corrupt data
pub fn decode_audio(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    if bytes.is_empty() {
        return Err(Error::Playback("empty audio data".to_string()));
    }
    if bytes.starts_with(b"RIFF") {
        decode_wav(bytes)
    } else {
        decode_mp3(bytes)
    }
}

/// Decode WAV bytes to mono f32 samples
fn decode_wav(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| Error::Playback(format!("WAV decode error: {e}")))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Playback(format!("WAV decode error: {e}")))?,
        hound::SampleFormat::Int => {
            let max = f32::from(1u16 << (spec.bits_per_sample.clamp(8, 16) - 1));
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| f32::from(v) / max))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Playback(format!("WAV decode error: {e}")))?
        }
    };

    // Downmix to mono by averaging channels
    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len().max(1) as f32)
        .collect();

    Ok((samples, spec.sample_rate))
}

/// Decode MP3 bytes to mono f32 samples
fn decode_mp3(bytes: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(bytes));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = u32::try_from(frame.sample_rate).unwrap_or(0);
                }

                if frame.channels == 2 {
                    // Stereo: average channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Playback(format!("MP3 decode error: {e}"))),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(Error::Playback("no audio frames decoded".to_string()));
    }

    Ok((samples, sample_rate))
}
