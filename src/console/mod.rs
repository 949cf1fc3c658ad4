//! Console views
//!
//! The presentational layer: renders state produced by the library modules
//! and translates prompts into calls on them. Nothing here owns business
//! logic beyond wiring.

pub mod memories;
pub mod recorder;
pub mod talk;
pub mod train;

use std::io::Write as _;
use std::time::Duration;

use crate::backend::BackendClient;
use crate::chat::{ChatMessage, Role};
use crate::voice::{ClipPlayer, PlayerEvent, format_secs};

/// Width of the playback progress meter
const METER_WIDTH: usize = 30;

/// Print one chat message as a console bubble
pub(crate) fn print_message(message: &ChatMessage) {
    let who = match message.role {
        Role::User => "you",
        Role::Ai => " ai",
    };
    println!("{who} ▸ {}", message.text);
    if let Some(url) = &message.audio_url {
        println!("      audio: {url}");
    }
}

/// Resolve, fetch, and play one backend audio resource
///
/// # Errors
///
/// Returns error if writing the progress meter fails; fetch and playback
/// failures are printed inline instead
#[allow(clippy::future_not_send)]
pub async fn play_url(client: &BackendClient, url: &str) -> anyhow::Result<()> {
    match client.fetch_audio(url).await {
        Ok(bytes) => play_audio_bytes(&client.resolve_audio_url(url), &bytes).await,
        Err(e) => {
            println!("Could not fetch audio: {e}");
            Ok(())
        }
    }
}

/// Play audio bytes to completion, drawing a progress meter
///
/// Decode and device failures are printed inline; the player's failed phase
/// keeps this from ever spinning on a resource that will not play.
#[allow(clippy::future_not_send)]
pub(crate) async fn play_audio_bytes(source: &str, bytes: &[u8]) -> anyhow::Result<()> {
    let mut player = ClipPlayer::new();
    player.load(source, bytes);

    for event in player.tick() {
        if let PlayerEvent::Error(message) = event {
            println!("Could not play audio: {message}");
            return Ok(());
        }
    }

    if let Err(e) = player.toggle() {
        println!("Could not play audio: {e}");
        return Ok(());
    }

    // Clip length plus a margin, in case the device never drains
    let timeout = Duration::from_secs_f32(player.state().duration_secs()) + Duration::from_secs(2);
    let started = std::time::Instant::now();

    let mut ticker = tokio::time::interval(Duration::from_millis(200));
    'playing: loop {
        if started.elapsed() > timeout {
            break;
        }
        ticker.tick().await;
        for event in player.tick() {
            match event {
                PlayerEvent::Progress(_) => {
                    print!(
                        "\r  {}",
                        render_progress(
                            player.state().position_secs(),
                            player.state().duration_secs()
                        )
                    );
                    std::io::stdout().flush()?;
                }
                PlayerEvent::Ended => break 'playing,
                PlayerEvent::Error(message) => {
                    println!("\nPlayback error: {message}");
                    break 'playing;
                }
            }
        }
    }
    println!();

    Ok(())
}

/// Render the playback meter, e.g. `[████░░] 0:03 / 0:07`
fn render_progress(position: f32, duration: f32) -> String {
    let ratio = if duration > 0.0 {
        (position / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((ratio * METER_WIDTH as f32) as usize).min(METER_WIDTH);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (pos, dur) = (position as u32, duration as u32);
    format!(
        "[{}{}] {} / {}",
        "█".repeat(filled),
        "░".repeat(METER_WIDTH - filled),
        format_secs(pos),
        format_secs(dur)
    )
}
