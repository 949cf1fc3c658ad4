//! Talk view: converse with the doppelganger
//!
//! Text turns push the user message before the request goes out; voice
//! turns learn the transcript from the reply. Failed turns append a fixed
//! fallback message so the conversation always stays usable.

use dialoguer::{Confirm, Input};

use crate::backend::{ApiOutcome, BackendClient};
use crate::chat::{CHAT_FALLBACK, ChatMessage, Conversation, VOICE_CHAT_FALLBACK,
    VOICE_MESSAGE_PLACEHOLDER};

use super::{play_url, print_message, recorder};

/// Run the chat loop
///
/// # Errors
///
/// Returns error if an interactive prompt fails; failed turns append the
/// fallback message instead
#[allow(clippy::future_not_send)]
pub async fn run(client: &BackendClient, voice: bool, autoplay: bool) -> anyhow::Result<()> {
    let mut conversation = Conversation::new();

    if voice {
        println!("Voice chat with your doppelganger.\n");
        loop {
            voice_turn(client, &mut conversation, autoplay).await?;
            if !Confirm::new()
                .with_prompt("Record another message?")
                .default(true)
                .interact()?
            {
                break;
            }
        }
    } else {
        println!("Talk to your doppelganger — send an empty message to leave.\n");
        loop {
            let input: String = Input::new()
                .with_prompt("you")
                .allow_empty(true)
                .interact_text()?;
            let question = input.trim().to_string();
            if question.is_empty() {
                break;
            }
            text_turn(client, &mut conversation, &question, autoplay).await?;
        }
    }

    Ok(())
}

/// One text chat turn
#[allow(clippy::future_not_send)]
async fn text_turn(
    client: &BackendClient,
    conversation: &mut Conversation,
    question: &str,
    autoplay: bool,
) -> anyhow::Result<()> {
    // The user message lands in the transcript before the request is issued
    conversation.push_user(question);

    match client.chat(question).await {
        ApiOutcome::Success(reply) => {
            let message = conversation
                .push_ai(reply.answer, Some(reply.audio_url))
                .clone();
            print_message(&message);
            if autoplay {
                play_reply(client, &message).await?;
            }
        }
        ApiOutcome::Error { message } => {
            tracing::warn!(error = %message, "chat turn failed");
            let fallback = conversation.push_ai(CHAT_FALLBACK, None).clone();
            print_message(&fallback);
        }
    }

    Ok(())
}

/// One voice chat turn: record, upload, render transcript and spoken answer
#[allow(clippy::future_not_send)]
async fn voice_turn(
    client: &BackendClient,
    conversation: &mut Conversation,
    autoplay: bool,
) -> anyhow::Result<()> {
    let Some(clip) = recorder::record_clip().await? else {
        return Ok(());
    };

    println!("Thinking...");
    match client.voice_chat(clip.to_wav()?).await {
        ApiOutcome::Success(reply) => {
            let heard = if reply.transcript.trim().is_empty() {
                VOICE_MESSAGE_PLACEHOLDER.to_string()
            } else {
                reply.transcript.clone()
            };
            let user = conversation.push_user(heard).clone();
            print_message(&user);

            let ai = conversation
                .push_ai(reply.answer, Some(reply.audio_url))
                .clone();
            print_message(&ai);
            if autoplay {
                play_reply(client, &ai).await?;
            }
        }
        ApiOutcome::Error { message } => {
            tracing::warn!(error = %message, "voice chat turn failed");
            let fallback = conversation.push_ai(VOICE_CHAT_FALLBACK, None).clone();
            print_message(&fallback);
        }
    }

    Ok(())
}

/// Play the spoken reply attached to a message, when there is one
#[allow(clippy::future_not_send)]
async fn play_reply(client: &BackendClient, message: &ChatMessage) -> anyhow::Result<()> {
    let Some(url) = &message.audio_url else {
        return Ok(());
    };
    play_url(client, url).await
}
