//! Train view: teach the doppelganger a new memory
//!
//! Text goes through the editor; voice goes through the recorder widget and
//! `/transcribe` first. Either way the text is validated locally before a
//! single request is issued.

use dialoguer::{Confirm, Editor, Input, MultiSelect};

use crate::backend::{ApiOutcome, BackendClient};
use crate::memory::validate_memory_text;

use super::recorder;

/// Starter prompts shown before the editor opens
pub const MEMORY_PROMPTS: [&str; 8] = [
    "Tell me about your childhood memories",
    "What are your core values and beliefs?",
    "Describe your relationships with family",
    "What brings you joy and happiness?",
    "Share your proudest achievements",
    "What are your fears and concerns?",
    "Describe your daily routines and habits",
    "What advice would you give to loved ones?",
];

/// Tag suggestions offered for every memory
pub const SUGGESTED_TAGS: [&str; 10] = [
    "childhood",
    "family",
    "values",
    "achievements",
    "relationships",
    "hobbies",
    "fears",
    "dreams",
    "advice",
    "philosophy",
];

/// Run the train flow
///
/// # Errors
///
/// Returns error if an interactive prompt fails; backend failures are
/// printed inline instead
#[allow(clippy::future_not_send)]
pub async fn run(client: &BackendClient, voice: bool) -> anyhow::Result<()> {
    println!("Train your AI memory — the more you share, the more authentic it becomes.\n");

    loop {
        let text = if voice {
            transcribed_text(client).await?
        } else {
            typed_text()?
        };
        let Some(text) = text else { return Ok(()) };

        let tags = collect_tags()?;

        match client.train(&text, &tags).await {
            ApiOutcome::Success(reply) => {
                println!("\nMemory trained: {}\n", reply.summary);
            }
            ApiOutcome::Error { message } => {
                println!("\nTraining failed: {message}\n");
            }
        }

        if !Confirm::new()
            .with_prompt("Add another memory?")
            .default(false)
            .interact()?
        {
            return Ok(());
        }
    }
}

/// Collect memory text from the editor, enforcing the minimum length
fn typed_text() -> anyhow::Result<Option<String>> {
    println!("Memory prompts:");
    for prompt in MEMORY_PROMPTS.iter().take(6) {
        println!("  · {prompt}");
    }
    println!();

    loop {
        let Some(draft) = Editor::new().edit("")? else {
            return Ok(None);
        };

        match validate_memory_text(&draft) {
            Ok(text) => {
                println!("{} characters", text.chars().count());
                return Ok(Some(text.to_string()));
            }
            Err(e) => {
                println!("{e}");
                if !Confirm::new()
                    .with_prompt("Edit again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(None);
                }
            }
        }
    }
}

/// Record, transcribe, and confirm memory text by voice
#[allow(clippy::future_not_send)]
async fn transcribed_text(client: &BackendClient) -> anyhow::Result<Option<String>> {
    loop {
        let Some(clip) = recorder::record_clip().await? else {
            return Ok(None);
        };

        println!("Transcribing...");
        match client.transcribe(clip.to_wav()?).await {
            ApiOutcome::Success(reply) => {
                let transcript = reply.transcript.trim().to_string();
                println!("\nTranscription:\n{transcript}\n");

                match validate_memory_text(&transcript) {
                    Ok(text) => {
                        println!("{} characters", text.chars().count());
                        if Confirm::new()
                            .with_prompt("Train with this transcript?")
                            .default(true)
                            .interact()?
                        {
                            return Ok(Some(text.to_string()));
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            ApiOutcome::Error { message } => {
                println!("Failed to transcribe audio: {message}");
            }
        }

        if !Confirm::new()
            .with_prompt("Record again?")
            .default(true)
            .interact()?
        {
            return Ok(None);
        }
    }
}

/// Pick suggested tags and add custom ones, without duplicates
fn collect_tags() -> anyhow::Result<Vec<String>> {
    let picked = MultiSelect::new()
        .with_prompt("Tags (space toggles, enter confirms)")
        .items(&SUGGESTED_TAGS)
        .interact()?;

    let mut tags: Vec<String> = picked
        .into_iter()
        .map(|i| SUGGESTED_TAGS[i].to_string())
        .collect();

    let custom: String = Input::new()
        .with_prompt("Custom tags, comma separated (empty for none)")
        .allow_empty(true)
        .interact_text()?;

    for tag in custom.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok(tags)
}
