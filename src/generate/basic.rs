//! One-shot generation: single model call, single validation, no repair.

use std::fs;
use std::path::Path;

use crate::dataset::DESCRIPTION_FILE;
use crate::error::Result;
use crate::extract::extract_module;
use crate::llm::{LlmClient, Message};
use crate::validate::icarus::DESIGN_FILE;
use crate::validate::{Validator, Verdict};

/// Generate a design for one test case and validate it once.
///
/// Returns `None` when the model response carried no module - nothing is
/// written or validated in that case.
pub async fn run<L, V>(
    llm: &L,
    validator: &V,
    system_prompt: &str,
    working_dir: &Path,
) -> Result<Option<Verdict>>
where
    L: LlmClient + ?Sized,
    V: Validator + ?Sized,
{
    let design_prompt = fs::read_to_string(working_dir.join(DESCRIPTION_FILE))?;

    let messages = vec![Message::system(system_prompt), Message::user(&design_prompt)];

    println!("Sending prompt to model...");
    let response = llm.complete(&messages).await?;

    let module = extract_module(&response.content);
    if module.is_empty() {
        log::error!("no verilog module found in model response");
        println!("No Verilog module found in response");
        return Ok(None);
    }

    let design_path = working_dir.join(DESIGN_FILE);
    fs::write(&design_path, &module)?;
    log::info!("generated design written to {}", design_path.display());
    println!("Wrote design to {}", design_path.display());

    let verdict = validator.validate(working_dir).await?;
    if verdict.passed {
        log::info!("design passed all tests");
    } else {
        log::error!("design failed tests:\n{}", verdict.output);
    }

    Ok(Some(verdict))
}
