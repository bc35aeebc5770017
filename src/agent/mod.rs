//! Agentic repair loop.
//!
//! The controller drives the bounded generate/validate/reflect cycle;
//! the conversation, transcript and confirmation policy are its
//! collaborators.

pub mod confirm;
pub mod controller;
pub mod conversation;
pub mod transcript;

pub use confirm::{AssumeYes, ConfirmPolicy, StdinConfirm};
pub use controller::{AgentConfig, RepairAgent, RepairOutcome, Termination};
pub use conversation::{COLLAPSE_SLOT, COLLAPSE_THRESHOLD, Conversation, SEED_MESSAGES};
pub use transcript::{TRANSCRIPT_FILE, TranscriptWriter};
