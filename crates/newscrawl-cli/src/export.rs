//! JSON Lines export, partitioned by source and publication month.
//!
//! Articles are deduplicated by URL (first seen wins), sorted by
//! `(published_at, url)`, and written to
//! `<root>/source=<source>/year=<YYYY>/month=<MM>/articles.jsonl`. Existing
//! partition files are replaced.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Datelike;
use newscrawl_crawler::Article;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct ExportRecord<'a> {
    article_id: String,
    #[serde(flatten)]
    article: &'a Article,
}

#[derive(Debug, Default)]
pub(crate) struct ExportSummary {
    pub written: usize,
    pub duplicates: usize,
    pub files: Vec<(PathBuf, usize)>,
}

/// Stable identifier for an article: hex SHA-256 of its URL.
pub(crate) fn article_id(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

fn partition_dir(root: &Path, article: &Article) -> PathBuf {
    root.join(format!("source={}", article.source))
        .join(format!("year={:04}", article.published_at.year()))
        .join(format!("month={:02}", article.published_at.month()))
}

/// Write `articles` under `root`.
///
/// # Errors
///
/// Returns an error if a partition directory or file cannot be written.
pub(crate) fn export_articles(articles: &[Article], root: &Path) -> anyhow::Result<ExportSummary> {
    let mut seen = HashSet::new();
    let mut unique: Vec<&Article> = articles
        .iter()
        .filter(|a| seen.insert(a.url.as_str()))
        .collect();
    let duplicates = articles.len() - unique.len();
    unique.sort_by(|a, b| (a.published_at, &a.url).cmp(&(b.published_at, &b.url)));

    let mut partitions: BTreeMap<PathBuf, Vec<&Article>> = BTreeMap::new();
    for article in unique {
        partitions
            .entry(partition_dir(root, article))
            .or_default()
            .push(article);
    }

    let mut summary = ExportSummary {
        duplicates,
        ..ExportSummary::default()
    };
    for (dir, batch) in partitions {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("articles.jsonl");
        write_batch(&path, &batch).with_context(|| format!("failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), count = batch.len(), "partition written");
        summary.written += batch.len();
        summary.files.push((path, batch.len()));
    }

    Ok(summary)
}

fn write_batch(path: &Path, batch: &[&Article]) -> anyhow::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for &article in batch {
        let record = ExportRecord {
            article_id: article_id(&article.url),
            article,
        };
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use newscrawl_core::Company;
    use newscrawl_crawler::{ArticleContent, ArticleMeta};

    use super::*;

    fn article(url: &str, source: &str, (y, m, d): (i32, u32, u32)) -> Article {
        let meta = ArticleMeta::new(
            url.to_string(),
            "A headline long enough".to_string(),
            Some(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
            source,
        );
        Article::assemble(
            meta,
            ArticleContent::new(url, "Body".to_string()),
            &Company::new("Apple", "AAPL", "Technology"),
            source,
        )
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn article_id_is_hex_sha256_of_url() {
        let id = article_id("https://example.com/a");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, article_id("https://example.com/a"));
        assert_ne!(id, article_id("https://example.com/b"));
    }

    #[test]
    fn writes_sorted_deduplicated_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let articles = vec![
            article("https://r/2", "reuters", (2024, 1, 20)),
            article("https://r/1", "reuters", (2024, 1, 5)),
            article("https://r/2", "reuters", (2024, 1, 20)),
            article("https://r/3", "reuters", (2024, 2, 1)),
            article("https://c/1", "cnbc", (2024, 1, 6)),
        ];

        let summary = export_articles(&articles, dir.path()).unwrap();
        assert_eq!(summary.written, 4);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.files.len(), 3);

        let january = dir
            .path()
            .join("source=reuters/year=2024/month=01/articles.jsonl");
        let rows = read_lines(&january);
        let urls: Vec<_> = rows.iter().map(|r| r["url"].as_str().unwrap()).collect();
        assert_eq!(urls, vec!["https://r/1", "https://r/2"]);
        assert_eq!(rows[0]["article_id"], article_id("https://r/1"));
        assert_eq!(rows[0]["ticker"], "AAPL");
        assert!(rows[0].get("search_query").is_none());

        assert!(dir
            .path()
            .join("source=cnbc/year=2024/month=01/articles.jsonl")
            .exists());
        assert!(dir
            .path()
            .join("source=reuters/year=2024/month=02/articles.jsonl")
            .exists());
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let summary = export_articles(&[], dir.path()).unwrap();
        assert_eq!(summary.written, 0);
        assert!(summary.files.is_empty());
    }
}
