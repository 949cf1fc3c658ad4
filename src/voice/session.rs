//! Recording session state machine
//!
//! One session per recorder widget. The widget drives [`MicCapture`] and
//! reports transitions here; the session alone decides which transitions
//! are legal, so the phase logic is testable without audio hardware.
//!
//! [`MicCapture`]: super::MicCapture

use super::AudioClip;

/// Phase of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    /// No capture in progress, no clip held
    Idle,
    /// Microphone is live, elapsed time ticking
    Recording,
    /// Capture finished, clip available for preview or upload
    Stopped,
}

/// Tracks the lifecycle of one microphone capture
///
/// `Idle → Recording → Stopped → Idle` (via reset). Illegal transitions are
/// silent no-ops, so overlapping captures cannot occur.
#[derive(Debug)]
pub struct RecorderSession {
    phase: RecorderPhase,
    elapsed_secs: u32,
    clip: Option<AudioClip>,
}

impl RecorderSession {
    /// Create a session in the idle phase
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: RecorderPhase::Idle,
            elapsed_secs: 0,
            clip: None,
        }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> RecorderPhase {
        self.phase
    }

    /// Seconds recorded so far (frozen once stopped)
    #[must_use]
    pub const fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// The captured clip; `Some` only in the stopped phase
    #[must_use]
    pub const fn clip(&self) -> Option<&AudioClip> {
        self.clip.as_ref()
    }

    /// True while the microphone should be live
    #[must_use]
    pub const fn is_recording(&self) -> bool {
        matches!(self.phase, RecorderPhase::Recording)
    }

    /// Begin a new capture
    ///
    /// Clears any previous clip and resets elapsed time. Returns `false`
    /// without touching state when already recording.
    pub fn start(&mut self) -> bool {
        if self.phase == RecorderPhase::Recording {
            return false;
        }
        self.clip = None;
        self.elapsed_secs = 0;
        self.phase = RecorderPhase::Recording;
        true
    }

    /// Advance elapsed time by one second; only ticks while recording
    pub fn tick(&mut self) {
        if matches!(self.phase, RecorderPhase::Recording) {
            self.elapsed_secs += 1;
        }
    }

    /// Finish the capture with the clip taken from the adapter
    ///
    /// Freezes elapsed time. Returns `false` without touching state when not
    /// recording, so a double stop has no additional effect.
    pub fn stop(&mut self, clip: AudioClip) -> bool {
        if self.phase != RecorderPhase::Recording {
            return false;
        }
        self.clip = Some(clip);
        self.phase = RecorderPhase::Stopped;
        true
    }

    /// Discard the clip and re-arm for another take
    ///
    /// Only meaningful from the stopped phase; a no-op elsewhere.
    pub fn reset(&mut self) {
        if self.phase == RecorderPhase::Stopped {
            self.clip = None;
            self.elapsed_secs = 0;
            self.phase = RecorderPhase::Idle;
        }
    }

    /// Take ownership of the clip, leaving the session stopped and empty-handed
    pub fn take_clip(&mut self) -> Option<AudioClip> {
        self.clip.take()
    }

    /// Elapsed time rendered as `m:ss`
    #[must_use]
    pub fn format_elapsed(&self) -> String {
        format_secs(self.elapsed_secs)
    }
}

impl Default for RecorderSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Render whole seconds as `m:ss`
#[must_use]
pub fn format_secs(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip() -> AudioClip {
        AudioClip::new(vec![0.1, -0.1, 0.2], 16_000)
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = RecorderSession::new();
        assert_eq!(session.phase(), RecorderPhase::Idle);
        assert_eq!(session.elapsed_secs(), 0);
        assert!(session.clip().is_none());
    }

    #[test]
    fn start_enters_recording_with_fresh_counters() {
        let mut session = RecorderSession::new();
        assert!(session.start());
        assert_eq!(session.phase(), RecorderPhase::Recording);
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[test]
    fn start_while_recording_is_rejected_silently() {
        let mut session = RecorderSession::new();
        session.start();
        session.tick();
        assert!(!session.start());
        // Rejected start must not reset the running capture
        assert_eq!(session.elapsed_secs(), 1);
        assert_eq!(session.phase(), RecorderPhase::Recording);
    }

    #[test]
    fn tick_only_counts_while_recording() {
        let mut session = RecorderSession::new();
        session.tick();
        assert_eq!(session.elapsed_secs(), 0);

        session.start();
        session.tick();
        session.tick();
        assert_eq!(session.elapsed_secs(), 2);

        session.stop(clip());
        session.tick();
        assert_eq!(session.elapsed_secs(), 2);
    }

    #[test]
    fn stop_freezes_elapsed_and_stores_clip() {
        let mut session = RecorderSession::new();
        session.start();
        session.tick();
        assert!(session.stop(clip()));
        assert_eq!(session.phase(), RecorderPhase::Stopped);
        assert_eq!(session.elapsed_secs(), 1);
        assert_eq!(session.clip(), Some(&clip()));
    }

    #[test]
    fn stop_twice_is_a_noop_the_second_time() {
        let mut session = RecorderSession::new();
        session.start();
        session.stop(clip());

        let other = AudioClip::new(vec![0.9], 16_000);
        assert!(!session.stop(other));
        assert_eq!(session.clip(), Some(&clip()));
    }

    #[test]
    fn stop_while_idle_is_a_noop() {
        let mut session = RecorderSession::new();
        assert!(!session.stop(clip()));
        assert_eq!(session.phase(), RecorderPhase::Idle);
        assert!(session.clip().is_none());
    }

    #[test]
    fn stop_then_start_leaves_no_residue() {
        let mut session = RecorderSession::new();
        session.start();
        session.tick();
        session.stop(clip());

        assert!(session.start());
        assert_eq!(session.elapsed_secs(), 0);
        assert!(session.clip().is_none());
    }

    #[test]
    fn reset_discards_clip_and_rearms() {
        let mut session = RecorderSession::new();
        session.start();
        session.stop(clip());

        session.reset();
        assert_eq!(session.phase(), RecorderPhase::Idle);
        assert!(session.clip().is_none());
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[test]
    fn reset_is_a_noop_outside_stopped() {
        let mut session = RecorderSession::new();
        session.start();
        session.tick();
        session.reset();
        assert_eq!(session.phase(), RecorderPhase::Recording);
        assert_eq!(session.elapsed_secs(), 1);
    }

    #[test]
    fn elapsed_renders_as_minutes_and_seconds() {
        assert_eq!(format_secs(0), "0:00");
        assert_eq!(format_secs(9), "0:09");
        assert_eq!(format_secs(65), "1:05");
        assert_eq!(format_secs(600), "10:00");
    }
}
