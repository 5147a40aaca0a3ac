//! Subcommand handlers.
//!
//! Configuration problems abort the command; per-source crawl failures are
//! reported in the summary and do not change the exit status.

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{Duration, NaiveDate, Utc};
use newscrawl_core::{
    load_crawler_config, load_sources_config, load_tickers, AppConfig, Company, CrawlerConfig,
    SourcesConfig, WindowedSourceConfig,
};
use newscrawl_crawler::sources::{guardian, reuters};
use newscrawl_crawler::{FetchClient, FetchConfig, Pipeline, PipelineOutcome};

use crate::export::export_articles;

/// Date range and output overrides shared by the crawl commands.
#[derive(Debug, Default)]
pub(crate) struct RunOptions {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

struct Inputs {
    crawler: CrawlerConfig,
    companies: Vec<Company>,
    sources: SourcesConfig,
}

fn load_inputs(app: &AppConfig) -> anyhow::Result<Inputs> {
    let crawler = load_crawler_config(&app.crawler_path)
        .with_context(|| format!("loading {}", app.crawler_path.display()))?;
    let tickers = load_tickers(&app.tickers_path)
        .with_context(|| format!("loading {}", app.tickers_path.display()))?;
    let sources = load_sources_config(&app.sources_path)
        .with_context(|| format!("loading {}", app.sources_path.display()))?;
    Ok(Inputs {
        crawler,
        companies: tickers.tickers,
        sources,
    })
}

fn build_fetch(app: &AppConfig, crawler: &CrawlerConfig) -> anyhow::Result<FetchClient> {
    let mut config = FetchConfig::from_settings(&crawler.crawler.http);
    if let Some(ua) = &app.user_agent {
        config.user_agent.clone_from(ua);
    }
    FetchClient::new(config).context("failed to build HTTP client")
}

fn resolve_range(crawler: &CrawlerConfig, opts: &RunOptions) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let start = opts.start.unwrap_or(crawler.crawler.start_date);
    let end = opts.end.unwrap_or(crawler.crawler.end_date);
    if start > end {
        bail!("start date {start} is after end date {end}");
    }
    Ok((start, end))
}

fn concurrency(app: &AppConfig, crawler: &CrawlerConfig) -> usize {
    app.max_concurrent_companies
        .unwrap_or(crawler.crawler.max_concurrent_companies)
}

/// Multi-source crawl over the whole ticker list.
pub(crate) async fn run_crawl(
    app: &AppConfig,
    only_sources: &[String],
    opts: RunOptions,
) -> anyhow::Result<()> {
    let Inputs {
        crawler,
        companies,
        mut sources,
    } = load_inputs(app)?;

    if !only_sources.is_empty() {
        sources.retain_sources(only_sources);
        if sources.enabled_sources().is_empty() {
            bail!(
                "none of the requested sources [{}] is enabled in {}",
                only_sources.join(", "),
                app.sources_path.display()
            );
        }
    }

    let (start, end) = resolve_range(&crawler, &opts)?;
    let fetch = build_fetch(app, &crawler)?;
    let pipeline = Pipeline::from_config(&sources, &fetch)
        .context("failed to initialize sources")?
        .with_max_concurrent_companies(concurrency(app, &crawler));

    let outcome = pipeline.run(&companies, start, end).await;
    finish(outcome, &crawler, &opts)
}

/// Reuters-only crawl, the long-range backfill mode.
pub(crate) async fn run_historical(app: &AppConfig, opts: RunOptions) -> anyhow::Result<()> {
    let Inputs {
        crawler,
        companies,
        sources,
    } = load_inputs(app)?;

    let (start, end) = resolve_range(&crawler, &opts)?;
    let fetch = build_fetch(app, &crawler)?;
    let reuters_config = sources.reuters.unwrap_or_else(|| WindowedSourceConfig {
        enabled: true,
        ..WindowedSourceConfig::default()
    });
    let scraper = reuters::scraper(&fetch, &reuters_config).context("failed to build reuters")?;
    let pipeline = Pipeline::single(scraper).with_max_concurrent_companies(concurrency(app, &crawler));

    let outcome = pipeline.run(&companies, start, end).await;
    finish(outcome, &crawler, &opts)
}

fn finish(outcome: PipelineOutcome, crawler: &CrawlerConfig, opts: &RunOptions) -> anyhow::Result<()> {
    println!("crawled {} articles", outcome.total());
    for (source, count) in &outcome.per_source {
        println!("  {source}: {count}");
    }
    if !outcome.failures.is_empty() {
        println!("{} source failures:", outcome.failures.len());
        for failure in &outcome.failures {
            println!(
                "  {} ({}) / {}: {}",
                failure.company, failure.ticker, failure.source_name, failure.error
            );
        }
    }

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| crawler.crawler.output.path.clone());
    if opts.dry_run {
        println!(
            "dry-run: would export {} articles to {}",
            outcome.total(),
            output.display()
        );
        return Ok(());
    }

    let summary = export_articles(&outcome.articles, &output)?;
    println!(
        "exported {} articles ({} duplicates dropped) into {} files under {}",
        summary.written,
        summary.duplicates,
        summary.files.len(),
        output.display()
    );
    Ok(())
}

fn lookback_range(end: NaiveDate, days: u32) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let Some(start) = end.checked_sub_signed(Duration::days(i64::from(days))) else {
        bail!("--days {days} reaches before the earliest representable date");
    };
    Ok((start, end))
}

fn find_company(companies: &[Company], query: &str) -> Option<Company> {
    companies
        .iter()
        .find(|c| c.ticker.eq_ignore_ascii_case(query) || c.company.eq_ignore_ascii_case(query))
        .cloned()
}

/// Search each enabled source for one company over the last `days` days and
/// parse the first candidate, printing what came back.
pub(crate) async fn run_probe(
    app: &AppConfig,
    query: &str,
    days: u32,
    only_sources: &[String],
) -> anyhow::Result<()> {
    let Inputs {
        crawler,
        companies,
        mut sources,
    } = load_inputs(app)?;
    if !only_sources.is_empty() {
        sources.retain_sources(only_sources);
    }

    let company = find_company(&companies, query)
        .unwrap_or_else(|| Company::new(query, &query.to_uppercase(), "Unknown"));
    let (start, end) = lookback_range(Utc::now().date_naive(), days)?;

    let fetch = build_fetch(app, &crawler)?;
    let pipeline = Pipeline::from_config(&sources, &fetch).context("failed to initialize sources")?;
    if pipeline.source_names().is_empty() {
        bail!("no sources enabled in {}", app.sources_path.display());
    }

    println!("probing {} ({}) from {start} to {end}", company.company, company.ticker);
    for name in pipeline.source_names() {
        let Some(scraper) = pipeline.scraper(name) else {
            continue;
        };
        let candidates = match scraper.searcher().search(&company.company, start, end).await {
            Ok(candidates) => candidates,
            Err(e) => {
                println!("[{name}] search failed: {e}");
                continue;
            }
        };
        println!("[{name}] {} candidates", candidates.len());

        let Some(first) = candidates.first() else {
            continue;
        };
        println!("[{name}] first: {} <{}>", first.title, first.url);
        match scraper.parser().parse(&first.url).await {
            Some(content) => {
                let preview: String = content.body_text.chars().take(200).collect();
                println!(
                    "[{name}] parsed {} chars, author={}, section={}",
                    content.body_text.chars().count(),
                    content.author.as_deref().unwrap_or("-"),
                    content.section.as_deref().unwrap_or("-"),
                );
                println!("[{name}] {preview}");
            }
            None => println!("[{name}] first candidate did not parse"),
        }
    }
    Ok(())
}

/// Print the newest feed items, the daily-update view of the Guardian feeds.
pub(crate) async fn run_latest(app: &AppConfig, limit: usize) -> anyhow::Result<()> {
    let Inputs { crawler, sources, .. } = load_inputs(app)?;
    let Some(config) = sources.guardian.filter(|c| !c.rss.is_empty()) else {
        bail!("no guardian feeds configured in {}", app.sources_path.display());
    };

    let fetch = build_fetch(app, &crawler)?;
    let searcher = guardian::searcher(fetch, &config);
    let latest = searcher.latest(limit).await;
    println!("{} latest items from {} feeds", latest.len(), config.rss.len());
    for meta in &latest {
        let when = if meta.published_estimated {
            "undated".to_string()
        } else {
            meta.published_at.format("%Y-%m-%d %H:%M").to_string()
        };
        println!("  {when}  {} <{}>", meta.title, meta.url);
    }
    Ok(())
}
