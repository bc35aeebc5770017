//! Non-agentic generation modes: one-shot and retrieval-augmented.

pub mod basic;
pub mod rag;
