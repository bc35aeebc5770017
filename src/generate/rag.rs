//! Retrieval-augmented generation.
//!
//! Looks up the reference design most similar to the description and
//! folds it into the generation prompt. Retrieval problems degrade to a
//! plain prompt with a warning; they never fail the run.

use std::fs;
use std::path::Path;

use crate::dataset::DESCRIPTION_FILE;
use crate::error::Result;
use crate::extract::extract_module;
use crate::llm::{LlmClient, Message};
use crate::rag::{DesignStore, EmbeddingClient, ScoredDesign};
use crate::validate::icarus::DESIGN_FILE;
use crate::validate::{Validator, Verdict};

/// Generate a design for one test case with retrieval context.
pub async fn run<L, E, V>(
    llm: &L,
    embeddings: &E,
    store: &DesignStore,
    validator: &V,
    system_prompt: &str,
    working_dir: &Path,
) -> Result<Option<Verdict>>
where
    L: LlmClient + ?Sized,
    E: EmbeddingClient + ?Sized,
    V: Validator + ?Sized,
{
    let design_prompt = fs::read_to_string(working_dir.join(DESCRIPTION_FILE))?;

    let reference = match similar_design(embeddings, store, &design_prompt).await {
        Ok(Some(hit)) => {
            println!("Found similar design with score: {}", hit.score);
            log::info!("found similar design with score {}", hit.score);
            Some(hit)
        }
        Ok(None) => {
            log::warn!("no similar designs found in store");
            None
        }
        Err(e) => {
            log::error!("retrieval failed: {}", e);
            None
        }
    };

    let prompt = enhanced_prompt(&design_prompt, reference.as_ref());
    let messages = vec![Message::system(system_prompt), Message::user(&prompt)];

    let response = llm.complete(&messages).await?;

    let module = extract_module(&response.content);
    if module.is_empty() {
        log::error!("no verilog module found in model response");
        return Ok(None);
    }

    let design_path = working_dir.join(DESIGN_FILE);
    fs::write(&design_path, &module)?;
    log::info!("generated design written to {}", design_path.display());

    let verdict = validator.validate(working_dir).await?;
    if verdict.passed {
        log::info!("design passed all tests");
    } else {
        log::error!("design failed tests:\n{}", verdict.output);
    }

    Ok(Some(verdict))
}

async fn similar_design<E>(
    embeddings: &E,
    store: &DesignStore,
    design_prompt: &str,
) -> Result<Option<ScoredDesign>>
where
    E: EmbeddingClient + ?Sized,
{
    let query = embeddings.embed(design_prompt).await?;
    Ok(store.most_similar(&query, 1)?.into_iter().next())
}

/// Build the generation prompt, with the retrieved design folded in
/// when one was found.
fn enhanced_prompt(design_prompt: &str, reference: Option<&ScoredDesign>) -> String {
    let Some(hit) = reference else {
        return design_prompt.to_string();
    };

    format!(
        "Design Prompt:\n{}\n\nSimilar Existing Design (similarity score: {}):\n{}\n\nPlease generate a new Verilog design based on the design prompt above.\nUse the similar design as a reference but ensure your design meets the requirements\nspecified in the prompt.",
        design_prompt, hit.score, hit.design.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::rag::StoredDesign;
    use async_trait::async_trait;
    use crate::error::RtlgenError;
    use tempfile::TempDir;

    struct PassValidator;

    #[async_trait]
    impl Validator for PassValidator {
        async fn validate(&self, _working_dir: &Path) -> Result<Verdict> {
            Ok(Verdict::pass("Tests passed"))
        }
    }

    struct FixedEmbedding(Vec<f32>);

    #[async_trait]
    impl EmbeddingClient for FixedEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct FailingEmbedding;

    #[async_trait]
    impl EmbeddingClient for FailingEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(RtlgenError::Embedding("offline".to_string()))
        }
    }

    fn scored(content: &str, score: f32) -> ScoredDesign {
        ScoredDesign {
            design: StoredDesign {
                id: "id".to_string(),
                summary: "summary".to_string(),
                content: content.to_string(),
            },
            score,
        }
    }

    #[test]
    fn test_enhanced_prompt_with_reference() {
        let prompt = enhanced_prompt("Build a mux", Some(&scored("module ref; endmodule", 0.91)));

        assert!(prompt.starts_with("Design Prompt:\nBuild a mux"));
        assert!(prompt.contains("similarity score: 0.91"));
        assert!(prompt.contains("module ref; endmodule"));
        assert!(prompt.contains("Use the similar design as a reference"));
    }

    #[test]
    fn test_enhanced_prompt_without_reference() {
        assert_eq!(enhanced_prompt("Build a mux", None), "Build a mux");
    }

    #[tokio::test]
    async fn test_generates_with_retrieval_context() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DESCRIPTION_FILE), "Build a mux").unwrap();

        let store = DesignStore::open_in_memory().unwrap();
        store
            .add("reference mux", "module refmux; endmodule", &[1.0, 0.0])
            .unwrap();

        let llm = MockLlmClient::new(vec!["module mux; endmodule".to_string()]);
        let embeddings = FixedEmbedding(vec![1.0, 0.0]);

        let verdict = run(&llm, &embeddings, &store, &PassValidator, "sys", dir.path())
            .await
            .unwrap()
            .unwrap();

        assert!(verdict.passed);
        // The generation prompt carried the retrieved design
        let calls = llm.calls();
        assert!(calls[0][1].content.contains("module refmux; endmodule"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_degrades_to_plain_prompt() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DESCRIPTION_FILE), "Build a mux").unwrap();

        let store = DesignStore::open_in_memory().unwrap();
        let llm = MockLlmClient::new(vec!["module mux; endmodule".to_string()]);

        let verdict = run(&llm, &FailingEmbedding, &store, &PassValidator, "sys", dir.path())
            .await
            .unwrap();

        assert!(verdict.is_some());
        let calls = llm.calls();
        assert_eq!(calls[0][1].content, "Build a mux");
    }
}
