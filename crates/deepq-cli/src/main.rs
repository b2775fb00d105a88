//! CLI binary for running the deepq interview-question pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use deepq_llm::{DynCompletion, OpenAiClient};
use deepq_pipeline::{default_registry, Engine, EngineConfig};
use deepq_search::{DynSearch, SerpApiClient};
use deepq_types::RunState;

#[derive(Parser)]
#[command(name = "deepq", version, about = "Interview-question generation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once for a topic
    Run {
        /// Topic to generate an interview question for
        topic: String,

        /// Output file path (default: <topic>_question.md)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't write the markdown file
        #[arg(long)]
        no_save: bool,

        /// Print the final state record as JSON instead of markdown
        #[arg(long)]
        json: bool,

        /// Maximum number of node executions before aborting. Prevents runaway loops.
        #[arg(long, default_value = "100")]
        max_steps: u64,
    },

    /// Generate a batch of topics and run the pipeline for each
    Batch {
        /// Maximum number of node executions per run
        #[arg(long, default_value = "100")]
        max_steps: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Run {
            topic,
            output,
            no_save,
            json,
            max_steps,
        } => {
            cmd_run(&topic, output.as_deref(), no_save, json, max_steps).await?;
        }
        Commands::Batch { max_steps } => {
            cmd_batch(max_steps).await?;
        }
    }

    Ok(())
}

fn build_engine(max_steps: u64) -> anyhow::Result<(Engine, Arc<DynCompletion>)> {
    let llm = Arc::new(DynCompletion::new(OpenAiClient::from_env()?));
    let search = Arc::new(DynSearch::new(SerpApiClient::from_env()));
    let registry = default_registry(llm.clone(), search);
    Ok((Engine::with_config(registry, EngineConfig { max_steps }), llm))
}

async fn cmd_run(
    topic: &str,
    output: Option<&Path>,
    no_save: bool,
    json: bool,
    max_steps: u64,
) -> anyhow::Result<()> {
    let (engine, _llm) = build_engine(max_steps)?;
    let (state, summary) = engine.run(topic).await?;
    tracing::info!(run_id = %summary.run_id, steps = summary.steps, "Run complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let Some(markdown) = render_markdown(&state) else {
        eprintln!("Failed to generate a question.");
        std::process::exit(1);
    };

    println!("{markdown}");
    if let Some(post) = &state.post {
        println!("=== LINKEDIN POST ===\n\n{post}");
    }

    if !no_save {
        let path = match output {
            Some(path) => path.to_path_buf(),
            None => default_output_path(topic),
        };
        std::fs::write(&path, &markdown)?;
        println!("\nSaved to {}", path.display());
    }
    Ok(())
}

async fn cmd_batch(max_steps: u64) -> anyhow::Result<()> {
    let (engine, llm) = build_engine(max_steps)?;

    let topics = generate_daily_topics(&llm).await?;
    tracing::info!(count = topics.len(), "Generated batch topics");

    for topic in &topics {
        tracing::info!(topic = %topic, "Processing batch topic");
        let (state, summary) = match engine.run(topic.as_str()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(topic = %topic, error = %e, "Run failed; skipping topic");
                continue;
            }
        };
        tracing::info!(run_id = %summary.run_id, steps = summary.steps, "Run complete");

        match render_markdown(&state) {
            Some(markdown) => {
                let path = default_output_path(topic);
                std::fs::write(&path, &markdown)?;
                println!("Saved {}", path.display());
            }
            None => {
                tracing::warn!(topic = %topic, "No question generated; nothing saved");
            }
        }
    }
    Ok(())
}

const BATCH_TOPICS_SYSTEM: &str = "\
You are a senior technical interviewer planning a daily batch of 5 deep dive interview questions.
Given the theme \"Trending Research and Production Best Practices in Generative AI\", generate 5 distinct, specific sub-topics.

Examples:
- Speculative Decoding for Latency
- RAG Context Window Tradeoffs
- KV Cache Optimization
- LoRA Fine-tuning Stability
- Agentic Tool Use Patterns

Return only the 5 topics, separated by commas. Do not number them.";

async fn generate_daily_topics(llm: &DynCompletion) -> anyhow::Result<Vec<String>> {
    let text = llm.complete(BATCH_TOPICS_SYSTEM, "Generate 5 topics.").await?;
    Ok(text
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect())
}

fn default_output_path(topic: &str) -> PathBuf {
    PathBuf::from(format!("{}_question.md", topic.replace(' ', "_")))
}

/// Render the final artifact as the four-section markdown document, or
/// `None` when the run produced no artifact.
fn render_markdown(state: &RunState) -> Option<String> {
    let artifact = state.artifact.as_ref()?;
    Some(format!(
        "# {} Interview Question\n\n\
         ## The Question\n{}\n\n\
         ## Common Wrong Answer\n{}\n\n\
         ## How It Actually Works\n{}\n\n\
         ## Key Paper\n{}\n",
        state.topic,
        artifact.question,
        artifact.wrong_answer,
        artifact.explanation,
        artifact.citation
    ))
}
