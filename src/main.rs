use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_host::{HostConfig, HostSource};
use llm_service::CompletionClient;
use triage_core::{ItemKind, TriageConfig};
use triage_engine::Embedder;
use triage_pipeline::{format_comment, StageToggles, TriagePipeline, Worker};
use vector_index::NeighborSource;

#[derive(Parser)]
#[command(
    name = "repo-triage",
    about = "Duplicate detection, base-PR ranking and triage for GitHub PRs and issues"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Triage a single pull request
    Pr {
        /// Repository in "owner/name" form
        repo: String,
        number: u64,
        #[arg(long)]
        no_dedup: bool,
        #[arg(long)]
        no_base: bool,
        #[arg(long)]
        no_review: bool,
        #[arg(long)]
        no_vision: bool,
        /// Print the raw outcome as JSON instead of the comment rendering
        #[arg(long)]
        json: bool,
    },
    /// Triage a single issue (dedup only)
    Issue {
        repo: String,
        number: u64,
        #[arg(long)]
        json: bool,
    },
    /// Triage all open PRs of a repository
    Batch {
        repo: String,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        /// Post a formatted comment back to each analyzed PR
        #[arg(long)]
        post_comments: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env when present.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let cfg = TriageConfig::from_env();
    let host = HostSource::github(HostConfig::from_env())?;
    let embedder = Embedder::from_env(cfg.dedup.embedding_dim);
    let completion = CompletionClient::from_env();
    let neighbors = NeighborSource::from_env(cfg.dedup.embedding_dim)?;
    let pipeline = TriagePipeline::new(cfg, host, embedder, completion, neighbors)?;

    match cli.command {
        Command::Pr {
            repo,
            number,
            no_dedup,
            no_base,
            no_review,
            no_vision,
            json,
        } => {
            let toggles = StageToggles {
                dedup: !no_dedup,
                base_detection: !no_base,
                review: !no_review,
                vision: !no_vision,
            };
            let outcome = pipeline
                .run(&repo, number, ItemKind::PullRequest, &toggles)
                .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", format_comment(&outcome));
            }
        }
        Command::Issue { repo, number, json } => {
            let outcome = pipeline
                .run(&repo, number, ItemKind::Issue, &StageToggles::default())
                .await;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", format_comment(&outcome));
            }
        }
        Command::Batch {
            repo,
            limit,
            post_comments,
        } => {
            let worker = Worker::new(pipeline, post_comments);
            worker
                .run_batch(&repo, limit, &StageToggles::default())
                .await?;
        }
    }

    Ok(())
}
