//! Wire types for the doppelganger backend
//!
//! The endpoints are not uniform: `/train`, `/chat`, and `/memories` wrap
//! their payloads in a `{status, data}` envelope, `/transcribe` answers
//! with a bare body, and `/voice-chat` answers with a flat envelope. The
//! client normalizes all of them into [`ApiOutcome`].

use serde::{Deserialize, Serialize};

/// Request body for `POST /train`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainRequest {
    /// Memory text to learn from
    pub text: String,
    /// User-chosen tags
    pub tags: Vec<String>,
}

/// Request body for `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// The user's question
    pub question: String,
}

/// `data` payload of a successful `/train` reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrainSummary {
    /// Backend-generated summary of the stored memory
    pub summary: String,
}

/// `data` payload of a successful `/chat` reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    /// The doppelganger's answer
    pub answer: String,
    /// Spoken answer; resolved against the base address by the client
    pub audio_url: String,
}

/// Bare body of a successful `/transcribe` reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transcript {
    /// Text recognized from the uploaded audio
    pub transcript: String,
}

/// Normalized result of a successful `/voice-chat` reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceChatReply {
    /// What the backend heard (may be empty)
    pub transcript: String,
    /// The doppelganger's answer
    pub answer: String,
    /// Spoken answer; resolved against the base address by the client
    pub audio_url: String,
}

/// Tagged result union every client operation resolves to
///
/// The client never lets an error escape as `Err`: network failures,
/// non-2xx statuses, malformed bodies, and backend-reported errors all
/// become the `Error` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// The call succeeded with a payload
    Success(T),
    /// The call failed; `message` is ready for display
    Error {
        /// Human-readable failure description
        message: String,
    },
}

impl<T> ApiOutcome<T> {
    /// True for the success variant
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Unwrap the payload, discarding an error
    #[must_use]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Error { .. } => None,
        }
    }

    /// The error message, when the call failed
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error { message } => Some(message),
        }
    }

    /// Map the success payload, keeping an error untouched
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            Self::Success(data) => ApiOutcome::Success(f(data)),
            Self::Error { message } => ApiOutcome::Error { message },
        }
    }
}

/// `{status, data}` envelope used by `/train`, `/chat`, and `/memories`
///
/// Error replies are inconsistent about the message field, so all known
/// spellings are accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl<T> Envelope<T> {
    /// Collapse the envelope into the outcome union
    pub(crate) fn into_outcome(self) -> ApiOutcome<T> {
        if self.status == "success" {
            self.data.map_or_else(
                || ApiOutcome::Error {
                    message: "success reply without data".to_string(),
                },
                ApiOutcome::Success,
            )
        } else {
            ApiOutcome::Error {
                message: self.error_text(),
            }
        }
    }

    fn error_text(self) -> String {
        self.message
            .or(self.error_message)
            .or(self.detail)
            .unwrap_or_else(|| "backend reported an error".to_string())
    }
}

/// Flat envelope used by `/voice-chat`
#[derive(Debug, Deserialize)]
pub(crate) struct VoiceChatEnvelope {
    pub status: String,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl VoiceChatEnvelope {
    pub(crate) fn into_outcome(self) -> ApiOutcome<VoiceChatReply> {
        if self.status == "success" {
            match (self.answer, self.audio_url) {
                (Some(answer), Some(audio_url)) => ApiOutcome::Success(VoiceChatReply {
                    transcript: self.transcript.unwrap_or_default(),
                    answer,
                    audio_url,
                }),
                _ => ApiOutcome::Error {
                    message: "success reply missing answer or audio_url".to_string(),
                },
            }
        } else {
            ApiOutcome::Error {
                message: self
                    .message
                    .unwrap_or_else(|| "backend reported an error".to_string()),
            }
        }
    }
}
