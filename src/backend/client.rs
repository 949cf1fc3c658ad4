//! HTTP client for the doppelganger backend
//!
//! One attempt per call, no retries, no timeouts, no backoff: the backend
//! is a trusted first-party service and the views are free to just show
//! whatever message comes back.

use serde::de::DeserializeOwned;

use crate::memory::{Memory, validate_memory_text};
use crate::{Error, Result};

use super::types::{
    ApiOutcome, ChatReply, ChatRequest, Envelope, TrainRequest, TrainSummary, Transcript,
    VoiceChatEnvelope, VoiceChatReply,
};

/// Client for the train/chat/transcribe/voice-chat/memories endpoints
///
/// Construct once at startup and pass to whatever composes the views; tests
/// substitute a scripted backend by pointing the base address at it.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for a backend base address
    ///
    /// Any trailing slash is stripped so URL resolution stays predictable.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The configured base address, without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an audio URL the backend returned
    ///
    /// Relative paths get the base address prepended; absolute URLs pass
    /// through untouched.
    #[must_use]
    pub fn resolve_audio_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }

    /// Submit a memory for training
    ///
    /// Rejects text under the minimum length locally — no request is issued
    /// for input the backend would refuse anyway.
    pub async fn train(&self, text: &str, tags: &[String]) -> ApiOutcome<TrainSummary> {
        let text = match validate_memory_text(text) {
            Ok(text) => text,
            Err(e) => {
                return ApiOutcome::Error {
                    message: e.to_string(),
                };
            }
        };

        let request = TrainRequest {
            text: text.to_string(),
            tags: tags.to_vec(),
        };
        tracing::debug!(chars = text.chars().count(), tags = tags.len(), "training memory");

        match self.post_envelope::<TrainRequest, TrainSummary>("/train", &request).await {
            Ok(envelope) => envelope.into_outcome(),
            Err(e) => error_outcome(e),
        }
    }

    /// Ask the doppelganger a question
    ///
    /// The reply's audio URL is resolved against the base address.
    pub async fn chat(&self, question: &str) -> ApiOutcome<ChatReply> {
        let request = ChatRequest {
            question: question.to_string(),
        };
        tracing::debug!(chars = question.chars().count(), "sending chat question");

        let outcome = match self.post_envelope::<ChatRequest, ChatReply>("/chat", &request).await {
            Ok(envelope) => envelope.into_outcome(),
            Err(e) => error_outcome(e),
        };

        outcome.map(|reply| ChatReply {
            audio_url: self.resolve_audio_url(&reply.audio_url),
            ..reply
        })
    }

    /// Transcribe a WAV recording
    ///
    /// `/transcribe` answers with a bare `{"transcript": ...}` body rather
    /// than the usual envelope.
    pub async fn transcribe(&self, wav: Vec<u8>) -> ApiOutcome<Transcript> {
        tracing::debug!(audio_bytes = wav.len(), "transcribing recording");
        match self.transcribe_inner(wav).await {
            Ok(transcript) => ApiOutcome::Success(transcript),
            Err(e) => error_outcome(e),
        }
    }

    async fn transcribe_inner(&self, wav: Vec<u8>) -> Result<Transcript> {
        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(wav)
                .file_name("recording.wav")
                .mime_str("audio/wav")?,
        );

        let response = self
            .http
            .post(format!("{}/transcribe", self.base_url))
            .multipart(form)
            .send()
            .await?;

        read_json(response).await
    }

    /// One full voice conversation turn: audio in, transcript + spoken answer out
    ///
    /// The reply's audio URL is resolved against the base address.
    pub async fn voice_chat(&self, wav: Vec<u8>) -> ApiOutcome<VoiceChatReply> {
        tracing::debug!(audio_bytes = wav.len(), "sending voice chat turn");
        let outcome = match self.voice_chat_inner(wav).await {
            Ok(envelope) => envelope.into_outcome(),
            Err(e) => error_outcome(e),
        };

        outcome.map(|reply| VoiceChatReply {
            audio_url: self.resolve_audio_url(&reply.audio_url),
            ..reply
        })
    }

    async fn voice_chat_inner(&self, wav: Vec<u8>) -> Result<VoiceChatEnvelope> {
        let form = reqwest::multipart::Form::new().part(
            "audio",
            reqwest::multipart::Part::bytes(wav)
                .file_name("voice_message.wav")
                .mime_str("audio/wav")?,
        );

        let response = self
            .http
            .post(format!("{}/voice-chat", self.base_url))
            .multipart(form)
            .send()
            .await?;

        read_json(response).await
    }

    /// Fetch all stored memories
    pub async fn memories(&self) -> ApiOutcome<Vec<Memory>> {
        match self.get_envelope::<Vec<Memory>>("/memories").await {
            Ok(envelope) => envelope.into_outcome(),
            Err(e) => error_outcome(e),
        }
    }

    /// Liveness probe against `GET /docs`
    pub async fn probe(&self) -> bool {
        match self.http.get(format!("{}/docs", self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "backend probe failed");
                false
            }
        }
    }

    /// Download an audio resource for playback
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] or [`Error::NonSuccess`]; the playback
    /// controller turns either into its failed state
    pub async fn fetch_audio(&self, url: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve_audio_url(url);
        let response = self.http.get(&resolved).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::NonSuccess {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn post_envelope<B, T>(&self, endpoint: &str, body: &B) -> Result<Envelope<T>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{endpoint}", self.base_url))
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    async fn get_envelope<T>(&self, endpoint: &str) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(format!("{}{endpoint}", self.base_url))
            .send()
            .await?;
        read_json(response).await
    }
}

/// Check the status and decode the JSON body
///
/// Non-2xx replies become [`Error::NonSuccess`] carrying the body text;
/// undecodable bodies become [`Error::MalformedResponse`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    tracing::debug!(status = %status, "received backend response");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "backend replied with an error status");
        return Err(Error::NonSuccess {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| Error::MalformedResponse(e.to_string()))
}

fn error_outcome<T>(e: Error) -> ApiOutcome<T> {
    tracing::warn!(error = %e, "backend call failed");
    ApiOutcome::Error {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_audio_url_gets_base_prepended() {
        let client = BackendClient::new("http://localhost:8000");
        assert_eq!(
            client.resolve_audio_url("/audio/1.mp3"),
            "http://localhost:8000/audio/1.mp3"
        );
    }

    #[test]
    fn absolute_audio_url_passes_through() {
        let client = BackendClient::new("http://localhost:8000");
        assert_eq!(
            client.resolve_audio_url("https://cdn.example.com/a.mp3"),
            "https://cdn.example.com/a.mp3"
        );
    }

    #[test]
    fn trailing_slash_is_stripped_from_base() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.resolve_audio_url("/audio/1.mp3"),
            "http://localhost:8000/audio/1.mp3"
        );
    }
}
