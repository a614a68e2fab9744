use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use healthbridge_core::AppConfig;

mod commands;
mod page;

#[derive(Parser)]
#[command(name = "healthbridge")]
#[command(author, version, about = "Drive the HealthBridge animation and scan engine from a terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a statistic counter up to its displayed value
    Counter {
        /// Counter text as shown on the page, e.g. "15,000+", "$2.1M+", "94%"
        text: String,
        /// Override the configured duration in milliseconds
        #[arg(short, long)]
        duration: Option<u64>,
        /// Use quartic ease-out instead of the configured easing
        #[arg(long)]
        ease_out: bool,
    },
    /// Run the bill scan demo on a local file and print the result as JSON
    Scan {
        /// File to "upload"
        file: PathBuf,
        /// Seed for a reproducible result
        #[arg(long)]
        seed: Option<u64>,
        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
    },
    /// Print and play the stagger schedule of a batch of reveals
    Reveal {
        /// Number of elements in the batch
        #[arg(short, long, default_value_t = 5)]
        count: usize,
        /// Randomized decorative stagger instead of ordered
        #[arg(long)]
        random: bool,
        /// Use the slower hero block stagger
        #[arg(long, conflicts_with = "random")]
        hero: bool,
        /// Seed for the random stagger
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Validate a contact form value
    Validate {
        /// Field type: text, email or tel
        kind: String,
        value: String,
    },
    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Counter {
            text,
            duration,
            ease_out,
        } => commands::counter::run(config, &text, duration, ease_out).await,
        Commands::Scan { file, seed, mime } => {
            commands::scan::run(config, &file, seed, mime).await
        }
        Commands::Reveal {
            count,
            random,
            hero,
            seed,
        } => commands::reveal::run(config, count, random, hero, seed).await,
        Commands::Validate { kind, value } => commands::validate::run(&kind, &value),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
