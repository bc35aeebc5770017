use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

use rtlgen::agent::{AgentConfig, AssumeYes, ConfirmPolicy, RepairAgent, StdinConfirm, Termination};
use rtlgen::dataset::{DESCRIPTION_FILE, find_test_cases};
use rtlgen::llm::{AnthropicClient, AnthropicConfig, LlmClient};
use rtlgen::rag::{DesignStore, OpenAiEmbeddings};
use rtlgen::service::ToolServer;
use rtlgen::validate::{IcarusValidator, RemoteValidator, Validator};
use rtlgen::{generate, validate};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rtlgen")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let log_file = log_dir.join(format!("rtlgen-{}.log", timestamp));

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_llm(config: &Config) -> Result<Arc<AnthropicClient>> {
    let llm_config = AnthropicConfig {
        model: config.llm.model.clone(),
        max_tokens: config.llm.max_tokens,
        timeout: std::time::Duration::from_millis(config.llm.timeout_ms),
    };
    let client = AnthropicClient::new(llm_config).context("Failed to create LLM client")?;
    Ok(Arc::new(client))
}

fn test_cases(dir: &Path) -> Result<Vec<PathBuf>> {
    let cases = find_test_cases(dir).context("Failed to discover test cases")?;
    if cases.is_empty() {
        eyre::bail!("no test cases found under {}", dir.display());
    }
    info!("Found {} test case(s) under {}", cases.len(), dir.display());
    Ok(cases)
}

async fn run_generate(dir: &Path, config: &Config) -> Result<()> {
    config.validate_prompts()?;
    let llm = build_llm(config)?;
    let validator = IcarusValidator::new();

    for case in test_cases(dir)? {
        println!("\n{} {}", "Processing test case:".cyan(), case.display());
        let verdict = generate::basic::run(
            llm.as_ref(),
            &validator,
            &config.prompts.system,
            &case,
        )
        .await
        .context(format!("Generation failed for {}", case.display()))?;
        report_verdict(verdict.as_ref());
    }
    Ok(())
}

async fn run_rag(dir: &Path, config: &Config) -> Result<()> {
    config.validate_prompts()?;
    let llm = build_llm(config)?;
    let validator = IcarusValidator::new();
    let embeddings = OpenAiEmbeddings::new().context("Failed to create embedding client")?;
    let store = DesignStore::open(&config.rag.store_path)
        .context(format!("Failed to open design store at {}", config.rag.store_path.display()))?;

    for case in test_cases(dir)? {
        println!("\n{} {}", "Processing test case:".cyan(), case.display());
        let verdict = generate::rag::run(
            llm.as_ref(),
            &embeddings,
            &store,
            &validator,
            &config.prompts.system,
            &case,
        )
        .await
        .context(format!("Generation failed for {}", case.display()))?;
        report_verdict(verdict.as_ref());
    }
    Ok(())
}

async fn run_repair(
    dir: &Path,
    max_iterations: u32,
    remote: Option<&str>,
    yes: bool,
    config: &Config,
) -> Result<()> {
    config.validate_prompts()?;
    let llm = build_llm(config)?;

    let validator: Arc<dyn Validator> = match remote {
        Some(addr) => Arc::new(RemoteValidator::new(addr)),
        None => Arc::new(IcarusValidator::new()),
    };

    for case in test_cases(dir)? {
        println!("\n{} {}", "Processing test case:".cyan(), case.display());
        let design_prompt = fs::read_to_string(case.join(DESCRIPTION_FILE))
            .context(format!("Failed to read {} in {}", DESCRIPTION_FILE, case.display()))?;

        let agent_config = AgentConfig {
            max_iterations,
            design_prompt,
            system_prompt: config.prompts.system.clone(),
            reflection_prompt: config.prompts.reflection.clone(),
            working_dir: case.clone(),
        };

        let confirm: Box<dyn ConfirmPolicy> = if yes {
            Box::new(AssumeYes)
        } else {
            Box::new(StdinConfirm)
        };

        let llm: Arc<dyn LlmClient> = llm.clone();
        let agent = RepairAgent::new(llm, validator.clone(), confirm, agent_config);
        let outcome = agent
            .run()
            .await
            .context(format!("Repair loop failed for {}", case.display()))?;

        match outcome.termination {
            Termination::Passed => {
                println!(
                    "{} after {} iteration(s)",
                    "Design passed".green(),
                    outcome.iterations
                );
            }
            Termination::BudgetExhausted => {
                println!(
                    "{} after {} iteration(s)",
                    "Iteration budget exhausted".red(),
                    outcome.iterations
                );
            }
            Termination::Declined => {
                println!("{}", "Stopped by operator".yellow());
            }
        }
    }
    Ok(())
}

async fn run_serve(addr: &str) -> Result<()> {
    let validator = Arc::new(IcarusValidator::new());
    let server = ToolServer::bind(addr, validator)
        .await
        .context("Failed to start tool service")?;
    println!(
        "{} {}",
        "Serving Verilog validation on".cyan(),
        server.local_addr().context("Failed to read bound address")?
    );
    server.run().await.context("Tool service failed")?;
    Ok(())
}

fn report_verdict(verdict: Option<&validate::Verdict>) {
    match verdict {
        Some(v) if v.passed => println!("{}", "Design passed all tests".green()),
        Some(v) => println!("{}\n{}", "Design failed tests".red(), v.output),
        None => println!("{}", "No design produced".yellow()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Starting with config from: {:?}", cli.config);

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Generate { dir } => run_generate(dir, &config).await,
        Commands::Rag { dir } => run_rag(dir, &config).await,
        Commands::Repair {
            dir,
            max_iterations,
            remote,
            yes,
        } => run_repair(dir, *max_iterations, remote.as_deref(), *yes, &config).await,
        Commands::Serve { addr } => run_serve(addr).await,
    }
}
