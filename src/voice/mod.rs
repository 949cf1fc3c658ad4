//! Voice processing module
//!
//! Handles microphone capture, the recording session state machine, and
//! audio playback. Transcription and synthesis live on the backend (see
//! `backend`).

mod capture;
mod playback;
mod session;

pub use capture::{AudioClip, CAPTURE_SAMPLE_RATE, MicCapture, rms_level, samples_to_wav};
pub use playback::{ClipPlayer, LoadPhase, PlayerEvent, PlayerState, decode_audio};
pub use session::{RecorderPhase, RecorderSession, format_secs};
