//! Remote service client for the doppelganger backend
//!
//! Stateless request/response plumbing around the five HTTP endpoints plus
//! a connectivity probe. Every call resolves to the tagged [`ApiOutcome`]
//! union; nothing throws past this boundary.

mod client;
mod types;

pub use client::BackendClient;
pub use types::{
    ApiOutcome, ChatReply, ChatRequest, TrainRequest, TrainSummary, Transcript, VoiceChatReply,
};
