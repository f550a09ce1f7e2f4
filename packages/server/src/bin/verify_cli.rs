//! Command-line access to verification and research.
//!
//! Uses the same environment configuration as the server. `verify` prints
//! the JSON response; `research` prints one JSON event per line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server_core::{
    server::{build_fetcher, build_searcher, build_state},
    Config,
};
use verification::{
    ClaimType, Crawler, FetcherConfig, ResearchRequest, TraversalProfile,
    VerificationOrchestrator,
};

#[derive(Parser)]
#[command(name = "verify_cli")]
#[command(about = "Verify claims and research questions against trusted sources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank trusted-source evidence for a claim
    Verify {
        query: String,
        #[arg(long, default_value = "general")]
        claim_type: ClaimType,
        /// Text scored against each page (defaults to the query)
        #[arg(long, default_value = "")]
        original_claim: String,
        #[arg(long, default_value = "quick")]
        profile: TraversalProfile,
    },

    /// Answer a question, streaming progress events
    Research {
        question: String,
        #[arg(long, default_value = "standard")]
        profile: TraversalProfile,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,verification=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Commands::Verify {
            query,
            claim_type,
            original_claim,
            profile,
        } => {
            let crawler = Crawler::new(
                build_searcher(&config)?,
                build_fetcher(&config, &FetcherConfig::default())?,
            );
            let verifier = VerificationOrchestrator::new(crawler).with_profile(profile);
            let response = verifier
                .verify_with_cancel(&query, claim_type, &original_claim, &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Research { question, profile } => {
            let state = build_state(&config)?;
            let request = ResearchRequest {
                question,
                profile,
                session_id: None,
            };
            let mut rx = state.research.research(request, cancel);
            while let Some(event) = rx.recv().await {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }

    Ok(())
}
