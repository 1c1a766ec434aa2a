//! Kisan: offline-first farmer advisory conversation engine.
//!
//! Resolves each user message through a two-stage pipeline:
//! Offline rule table → Advisory gateway (generative-AI API) → reply,
//! with every assistant reply handed to the speech pipeline.
//!
//! # Architecture
//!
//! - **Offline responder**: ordered multi-lingual keyword rules for the
//!   common intents, answered with zero latency and no network
//! - **Advisory gateway**: prompt construction and JSON-shape parsing
//!   against a `generateContent` endpoint, with a TTL response cache
//! - **Speech pipeline**: one-shot synthesis playback via `cpal`, plus a
//!   live bidirectional voice session over a websocket
//! - **Conversation orchestrator**: owns the message history and the
//!   Idle → Sending state machine

pub mod app_dirs;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod growth;
pub mod messages;
pub mod offline;
pub mod orchestrator;
pub mod profile;
pub mod speech;

pub use config::KisanConfig;
pub use error::{AdvisoryError, Result};
pub use gateway::AdvisoryGateway;
pub use messages::{ChatMessage, Role};
pub use orchestrator::Conversation;
pub use profile::{FarmProfile, Language};
