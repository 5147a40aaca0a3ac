use std::path::PathBuf;

/// Runtime settings read from the environment.
///
/// These decide where the YAML documents live and override a few knobs that
/// operators change per run without editing files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub crawler_path: PathBuf,
    pub tickers_path: PathBuf,
    pub sources_path: PathBuf,
    pub log_level: String,
    pub user_agent: Option<String>,
    pub max_concurrent_companies: Option<usize>,
}
