//! Repair loop controller.
//!
//! Drives the generate -> validate -> (accept | reflect-and-retry |
//! give-up) cycle for one design. The controller owns the conversation,
//! the design file and the transcript; the model, the validator and the
//! confirmation policy are injected. Validation and extraction failures
//! feed the reflection path, they never abort the loop - only LLM
//! transport errors propagate.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::agent::confirm::ConfirmPolicy;
use crate::agent::conversation::Conversation;
use crate::agent::transcript::TranscriptWriter;
use crate::error::Result;
use crate::extract::extract_module;
use crate::llm::LlmClient;
use crate::validate::icarus::DESIGN_FILE;
use crate::validate::{Validator, Verdict};

/// Per-design agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Iteration budget for the repair loop.
    pub max_iterations: u32,
    /// Initial design prompt (the design description text).
    pub design_prompt: String,
    /// System directive seeding the conversation.
    pub system_prompt: String,
    /// Reflection directive prefixed to failure output.
    pub reflection_prompt: String,
    /// Directory holding the design, testbench and transcript.
    pub working_dir: PathBuf,
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Validation output reported a pass.
    Passed,
    /// The iteration budget ran out without a pass.
    BudgetExhausted,
    /// The operator declined a reflection confirmation.
    Declined,
}

/// Final report of one repair run.
#[derive(Debug)]
pub struct RepairOutcome {
    pub termination: Termination,
    /// Iterations actually attempted.
    pub iterations: u32,
    /// Result of the closing from-scratch validation.
    pub final_verdict: Verdict,
}

/// The repair loop state machine for a single design.
pub struct RepairAgent<L, V>
where
    L: LlmClient + ?Sized,
    V: Validator + ?Sized,
{
    llm: Arc<L>,
    validator: Arc<V>,
    confirm: Box<dyn ConfirmPolicy>,
    config: AgentConfig,
    conversation: Conversation,
    transcript: TranscriptWriter,
    current_iteration: u32,
    design_prompt: String,
}

impl<L, V> RepairAgent<L, V>
where
    L: LlmClient + ?Sized,
    V: Validator + ?Sized,
{
    /// Create an agent for one design.
    pub fn new(
        llm: Arc<L>,
        validator: Arc<V>,
        confirm: Box<dyn ConfirmPolicy>,
        config: AgentConfig,
    ) -> Self {
        let conversation = Conversation::new(&config.system_prompt, &config.design_prompt);
        let transcript = TranscriptWriter::new(&config.working_dir);
        let design_prompt = config.design_prompt.clone();

        Self {
            llm,
            validator,
            confirm,
            config,
            conversation,
            transcript,
            current_iteration: 1,
            design_prompt,
        }
    }

    /// Run the loop to termination and record the closing validation.
    pub async fn run(mut self) -> Result<RepairOutcome> {
        log::warn!("verilog generation begin");
        log::info!("starting prompt:\n{}", self.design_prompt);

        let termination = loop {
            self.generate().await?;

            let verdict = self.validator.validate(&self.config.working_dir).await?;
            println!("\nTest output:\n{}\n", verdict.output);
            self.transcript.record(
                self.current_iteration,
                self.config.max_iterations,
                &verdict,
                &self.conversation,
            )?;

            if verdict.reports_pass() {
                break Termination::Passed;
            }
            if self.current_iteration >= self.config.max_iterations {
                break Termination::BudgetExhausted;
            }

            self.current_iteration += 1;
            if !self.reflect(&verdict).await? {
                break Termination::Declined;
            }
        };

        // Closing pass: re-run compile and simulate from scratch so the
        // transcript ends with an independently produced verdict.
        log::info!("running final validation");
        let final_verdict = self.validator.validate(&self.config.working_dir).await?;
        self.transcript.record(
            self.current_iteration,
            self.config.max_iterations,
            &final_verdict,
            &self.conversation,
        )?;
        println!("\nFinal test results:\n{}\n", final_verdict.output);
        log::info!("verilog generation complete");

        Ok(RepairOutcome {
            termination,
            iterations: self.current_iteration,
            final_verdict,
        })
    }

    /// One generate cycle: collapse stale history, ask the model, record
    /// the response and overwrite the design file with the extraction.
    async fn generate(&mut self) -> Result<()> {
        if self.conversation.needs_collapse() {
            self.conversation.collapse(&self.design_prompt);
        }

        log::info!("generation prompt:\n{}", self.design_prompt);
        let response = self.llm.complete(self.conversation.messages()).await?;
        log::debug!(
            "model used {} tokens",
            response.usage.total()
        );
        self.conversation.record_response(&response.content);

        // An empty extraction is written as-is; the compiler turns it
        // into an ordinary failing verdict that drives reflection.
        let module = extract_module(&response.content);
        log::info!("generated design:\n{}", module);

        let design_path = self.config.working_dir.join(DESIGN_FILE);
        fs::write(&design_path, &module)?;
        println!("Wrote design to {}", design_path.display());
        Ok(())
    }

    /// Reflection exchange with two operator confirmations. Returns
    /// false when the operator declines either point.
    async fn reflect(&mut self, verdict: &Verdict) -> Result<bool> {
        let prompt = reflection_prompt(&self.config.reflection_prompt, &verdict.output);
        println!("\nReflection prompt:\n{}\n", prompt);

        if !self.confirm.confirm("Continue with reflection?") {
            return Ok(false);
        }

        let request = self.conversation.reflection_request(&prompt);
        let reflection = self.llm.complete(&request).await?;
        println!("\nLLM reflection:\n{}\n", reflection.content);

        if !self.confirm.confirm("Continue with design modification?") {
            return Ok(false);
        }

        let revision = revision_prompt(&reflection.content);
        self.conversation.push_retry_prompt(&revision);
        self.design_prompt = revision;
        Ok(true)
    }
}

/// Reflection prompt: directive plus the verbatim failure output.
fn reflection_prompt(directive: &str, failure_output: &str) -> String {
    format!("{}\nError: {}", directive, failure_output)
}

/// Revision prompt instructing the model to apply its own suggestions.
fn revision_prompt(reflection: &str) -> String {
    format!(
        "Modify the verilog design using these suggestions: \"\"\"{}\"\"\"\nGenerate verilog code only. Do not explain changes.",
        reflection
    )
}
