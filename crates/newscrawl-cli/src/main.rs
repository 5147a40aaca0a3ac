mod commands;
mod export;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "newscrawl")]
#[command(about = "Crawl company news from several publishers into JSON Lines")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct RangeArgs {
    /// First publication date to include (YYYY-MM-DD); defaults to the crawler config.
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last publication date to include (YYYY-MM-DD); defaults to the crawler config.
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Export root directory; defaults to the crawler config.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Crawl and report, but write nothing.
    #[arg(long)]
    dry_run: bool,
}

impl From<RangeArgs> for RunOptions {
    fn from(args: RangeArgs) -> Self {
        Self {
            start: args.start,
            end: args.end,
            output: args.output,
            dry_run: args.dry_run,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl every enabled source for every configured ticker.
    Crawl {
        /// Restrict the run to these sources (repeatable).
        #[arg(long = "source")]
        sources: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Crawl Reuters only, month by month.
    Historical {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Check each source against one company without exporting anything.
    Probe {
        /// Company name or ticker.
        company: String,
        #[arg(long, default_value_t = 7)]
        days: u32,
        #[arg(long = "source")]
        sources: Vec<String>,
    },
    /// List the newest items across the configured Guardian feeds.
    Latest {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = newscrawl_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Crawl { sources, range } => {
            commands::run_crawl(&config, &sources, range.into()).await
        }
        Commands::Historical { range } => commands::run_historical(&config, range.into()).await,
        Commands::Probe {
            company,
            days,
            sources,
        } => commands::run_probe(&config, &company, days, &sources).await,
        Commands::Latest { limit } => commands::run_latest(&config, limit).await,
    }
}
