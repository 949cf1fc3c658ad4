//! Doppel Console - voice-driven client for an AI doppelganger backend
//!
//! This library provides the core functionality for the `doppel` binary:
//! - Voice capture, the recording session state machine, and playback
//! - A normalized client for the backend's train/chat/transcribe/voice-chat
//!   endpoints
//! - Conversation and memory state the console views render
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Console Views                       │
//! │   Train  │  Talk  │  Memories  │  Recorder widget   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               doppel-console core                    │
//! │  MicCapture │ RecorderSession │ ClipPlayer │ Client  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │           Doppelganger backend (HTTP)                │
//! │   /train  │  /chat  │  /transcribe  │  /voice-chat  │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod chat;
pub mod config;
pub mod console;
pub mod error;
pub mod memory;
pub mod voice;

pub use backend::{ApiOutcome, BackendClient};
pub use chat::{ChatMessage, Conversation, Role};
pub use config::Config;
pub use error::{Error, Result};
pub use memory::{MIN_MEMORY_CHARS, Memory, MemoryFilter, MemoryStats};
