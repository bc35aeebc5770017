//! rtlgen - LLM-driven Verilog generation and repair
//!
//! rtlgen asks a language model for a Verilog module, compiles and
//! simulates it against a fixed testbench with Icarus, and on failure
//! feeds the toolchain output back to the model as a reflection prompt,
//! iterating until the testbench passes or the iteration budget runs out.

pub mod agent;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod generate;
pub mod llm;
pub mod rag;
pub mod service;
pub mod validate;

pub use error::{Result, RtlgenError};
