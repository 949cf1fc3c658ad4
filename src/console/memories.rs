//! Memories view: browse and filter stored memories

use crate::backend::{ApiOutcome, BackendClient};
use crate::memory::{Memory, MemoryFilter, stats};

/// Characters shown from each card's text before truncation
const EXCERPT_CHARS: usize = 240;

/// Fetch the memory list, filter it locally, and render it newest first
///
/// # Errors
///
/// Never fails in practice; fetch errors are printed inline
pub async fn run(
    client: &BackendClient,
    search: Option<String>,
    tag: Option<String>,
) -> anyhow::Result<()> {
    match client.memories().await {
        ApiOutcome::Error { message } => println!("Could not fetch memories: {message}"),
        ApiOutcome::Success(memories) => {
            let totals = stats(&memories);
            #[allow(clippy::cast_precision_loss)]
            let kchars = totals.characters as f64 / 1000.0;
            println!(
                "{} memories · {} unique tags · {kchars:.1}k characters shared\n",
                totals.total, totals.unique_tags
            );

            let filter = MemoryFilter { search, tag };
            let filtered = filter.apply(&memories);
            if filtered.is_empty() {
                println!("No memories match.");
            }
            for memory in filtered {
                print_memory(memory);
            }
        }
    }

    Ok(())
}

/// Render one memory card
fn print_memory(memory: &Memory) {
    let mut header = memory.timestamp.clone();
    if !memory.tags.is_empty() {
        if !header.is_empty() {
            header.push_str(" · ");
        }
        header.push_str(&memory.tags.join(", "));
    }

    println!("────────");
    if !header.is_empty() {
        println!("{header}");
    }
    if !memory.summary.is_empty() {
        println!("{}", memory.summary);
    }
    println!("{}", excerpt(&memory.text, EXCERPT_CHARS));
    if let Some(url) = &memory.voice_path_url {
        if !url.is_empty() {
            println!("audio: {url}");
        }
    }
    println!();
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}
