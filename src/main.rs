use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use doppel_console::voice::{MicCapture, rms_level};
use doppel_console::{BackendClient, Config, console, memory};

/// Doppel - voice-driven console for your AI doppelganger
#[derive(Parser)]
#[command(name = "doppel", version, about)]
struct Cli {
    /// Backend base address (e.g. `http://localhost:8000`)
    #[arg(long, env = "DOPPEL_BACKEND_URL")]
    backend_url: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Teach the doppelganger a new memory
    Train {
        /// Record the memory by voice instead of typing
        #[arg(long)]
        voice: bool,
    },
    /// Chat with the doppelganger
    Talk {
        /// Speak instead of typing; replies include synthesized audio
        #[arg(long)]
        voice: bool,

        /// Play reply audio automatically after each turn
        #[arg(long)]
        play: bool,
    },
    /// Browse stored memories
    Memories {
        /// Free-text search over text, summaries, and tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only memories carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Play an audio resource from the backend
    Play {
        /// Absolute URL or backend-relative path (e.g. `/audio/1.mp3`)
        url: String,
    },
    /// Check backend connectivity
    Status,
    /// Test microphone input
    MicCheck {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,doppel_console=info",
        1 => "info,doppel_console=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_base_url(cli.backend_url.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    let client = BackendClient::new(&config.base_url);

    match cli.command {
        Command::Train { voice } => {
            if voice {
                ensure_voice(&config)?;
            }
            console::train::run(&client, voice).await
        }
        Command::Talk { voice, play } => {
            if voice || play {
                ensure_voice(&config)?;
            }
            let autoplay = play || config.voice.autoplay_replies;
            console::talk::run(&client, voice, autoplay).await
        }
        Command::Memories { search, tag } => console::memories::run(&client, search, tag).await,
        Command::Play { url } => {
            ensure_voice(&config)?;
            console::play_url(&client, &url).await
        }
        Command::Status => cmd_status(&client).await,
        Command::MicCheck { duration } => {
            ensure_voice(&config)?;
            mic_check(duration).await
        }
    }
}

/// Refuse voice flows when audio was disabled in config
fn ensure_voice(config: &Config) -> anyhow::Result<()> {
    if config.voice.enabled {
        Ok(())
    } else {
        anyhow::bail!("voice is disabled (DOPPEL_DISABLE_VOICE or config file)")
    }
}

/// Probe the backend and report reachability plus memory stats
async fn cmd_status(client: &BackendClient) -> anyhow::Result<()> {
    if client.probe().await {
        println!("Backend reachable at {}", client.base_url());

        if let doppel_console::ApiOutcome::Success(memories) = client.memories().await {
            let totals = memory::stats(&memories);
            println!(
                "{} memories · {} unique tags · {} characters shared",
                totals.total, totals.unique_tags, totals.characters
            );
        }
    } else {
        println!("Backend unreachable at {}", client.base_url());
    }

    Ok(())
}

/// Test microphone input with a level meter
#[allow(clippy::future_not_send)]
async fn mic_check(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = MicCapture::new()?;
    capture.start()?;

    println!("---");
    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.peek_samples();
        let energy = rms_level(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );

        // Fresh window each second
        capture.clear();
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working.");
    println!("If RMS stayed near 0, check your input device and levels.");

    Ok(())
}
