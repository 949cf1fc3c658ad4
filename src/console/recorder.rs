//! Interactive voice recorder widget
//!
//! Owns one [`RecorderSession`] at a time and wires it to the microphone:
//! capture runs until Enter, then the take can be previewed, re-recorded,
//! or discarded before it is handed to a backend flow.

use std::io::Write as _;
use std::time::Duration;

use dialoguer::Select;

use crate::voice::{AudioClip, MicCapture, RecorderSession};
use crate::Error;

/// Drive one recording session to a finished clip
///
/// Returns `None` when the user discards the take or the microphone is
/// unusable; microphone failures are surfaced here and leave the session
/// idle.
///
/// # Errors
///
/// Returns error if the interactive prompt or WAV encoding fails
#[allow(clippy::future_not_send)]
pub async fn record_clip() -> anyhow::Result<Option<AudioClip>> {
    let mut session = RecorderSession::new();

    loop {
        match capture_into(&mut session).await {
            Ok(()) => {}
            Err(e @ (Error::PermissionDenied(_) | Error::DeviceUnavailable(_))) => {
                println!("Microphone unavailable: {e}");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        if session.clip().is_none_or(AudioClip::is_empty) {
            println!("No audio captured.");
        }

        loop {
            let choice = Select::new()
                .with_prompt(format!("Recorded {}", session.format_elapsed()))
                .items(&["Use this recording", "Play it back", "Re-record", "Discard"])
                .default(0)
                .interact()?;

            match choice {
                0 => return Ok(session.take_clip()),
                1 => {
                    if let Some(clip) = session.clip() {
                        let wav = clip.to_wav()?;
                        super::play_audio_bytes("recording-preview", &wav).await?;
                    }
                }
                2 => {
                    session.reset();
                    break; // back to the outer loop for another take
                }
                _ => return Ok(None),
            }
        }
    }
}

/// Run the microphone until Enter, feeding the session state machine
#[allow(clippy::future_not_send)]
async fn capture_into(session: &mut RecorderSession) -> crate::Result<()> {
    let mut capture = MicCapture::new()?;
    capture.start()?;
    if !session.start() {
        // One in-flight capture per widget; drop this take
        capture.stop();
        return Ok(());
    }

    println!("Recording — press Enter to stop.");
    let mut stop = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    });

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await; // the first tick fires immediately
    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = ticker.tick() => {
                session.tick();
                print!("\r● {}  ", session.format_elapsed());
                let _ = std::io::stdout().flush();
            }
        }
    }
    println!();

    capture.stop();
    session.stop(capture.take_clip());
    Ok(())
}
