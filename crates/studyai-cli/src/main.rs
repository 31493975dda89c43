//! StudyAI CLI - Command-line interface
//!
//! Usage:
//!   studyai web <topic>
//!   studyai pdf <path>
//!   studyai combined <topic> <path>
//!   studyai quiz <summary>
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use studyai_core::AppConfig;
use studyai_pipeline::StudyPipeline;

#[derive(Parser)]
#[command(name = "studyai")]
#[command(about = "Summarize topics and PDFs, and generate quizzes")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a topic from web search results
    Web {
        /// Topic to search for
        topic: String,
    },
    /// Summarize a PDF document
    Pdf {
        /// Path to the PDF
        path: PathBuf,
    },
    /// Summarize a topic together with a PDF document
    Combined {
        /// Topic to search for
        topic: String,
        /// Path to the PDF
        path: PathBuf,
    },
    /// Generate a multiple-choice quiz from a summary
    Quiz {
        /// Summary text
        summary: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studyai_pipeline=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path.clone())?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    let pipeline = StudyPipeline::from_config(&config)?;

    let output = match cli.command {
        Commands::Web { topic } => {
            let summary = pipeline.summarize_web(&topic).await?;
            json!({ "summary": summary })
        }
        Commands::Pdf { path } => {
            let pdf = read_pdf(&path).await?;
            let summary = pipeline.summarize_pdf(pdf).await?;
            json!({ "summary": summary })
        }
        Commands::Combined { topic, path } => {
            let pdf = read_pdf(&path).await?;
            let summary = pipeline.summarize_combined(&topic, pdf).await?;
            json!({ "summary": summary })
        }
        Commands::Quiz { summary } => {
            let quiz = pipeline.generate_quiz(&summary).await?;
            serde_json::to_value(quiz)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn read_pdf(path: &Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}
