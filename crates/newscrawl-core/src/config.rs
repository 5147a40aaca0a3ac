use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let crawler_path = PathBuf::from(or_default("NEWSCRAWL_CRAWLER_PATH", "./config/crawler.yaml"));
    let tickers_path = PathBuf::from(or_default("NEWSCRAWL_TICKERS_PATH", "./config/tickers.yaml"));
    let sources_path = PathBuf::from(or_default("NEWSCRAWL_SOURCES_PATH", "./config/sources.yaml"));
    let log_level = or_default("NEWSCRAWL_LOG_LEVEL", "info");

    let user_agent = lookup("NEWSCRAWL_USER_AGENT")
        .ok()
        .map(|ua| ua.trim().to_string())
        .filter(|ua| !ua.is_empty());

    let max_concurrent_companies = match lookup("NEWSCRAWL_MAX_CONCURRENT_COMPANIES") {
        Ok(raw) => {
            let parsed = raw
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: "NEWSCRAWL_MAX_CONCURRENT_COMPANIES".to_string(),
                    reason: e.to_string(),
                })?;
            if parsed == 0 {
                return Err(ConfigError::InvalidEnvVar {
                    var: "NEWSCRAWL_MAX_CONCURRENT_COMPANIES".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            Some(parsed)
        }
        Err(_) => None,
    };

    Ok(AppConfig {
        crawler_path,
        tickers_path,
        sources_path,
        log_level,
        user_agent,
        max_concurrent_companies,
    })
}

/// Read a YAML document from `path` into `T`.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_uses_defaults_when_env_is_empty() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.crawler_path, PathBuf::from("./config/crawler.yaml"));
        assert_eq!(cfg.tickers_path, PathBuf::from("./config/tickers.yaml"));
        assert_eq!(cfg.sources_path, PathBuf::from("./config/sources.yaml"));
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.user_agent.is_none());
        assert!(cfg.max_concurrent_companies.is_none());
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("NEWSCRAWL_SOURCES_PATH", "/etc/newscrawl/sources.yaml");
        map.insert("NEWSCRAWL_LOG_LEVEL", "debug");
        map.insert("NEWSCRAWL_USER_AGENT", "  research-bot/1.0  ");
        map.insert("NEWSCRAWL_MAX_CONCURRENT_COMPANIES", "4");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.sources_path,
            PathBuf::from("/etc/newscrawl/sources.yaml")
        );
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.user_agent.as_deref(), Some("research-bot/1.0"));
        assert_eq!(cfg.max_concurrent_companies, Some(4));
    }

    #[test]
    fn build_app_config_treats_blank_user_agent_as_unset() {
        let mut map = HashMap::new();
        map.insert("NEWSCRAWL_USER_AGENT", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn build_app_config_rejects_non_numeric_concurrency() {
        let mut map = HashMap::new();
        map.insert("NEWSCRAWL_MAX_CONCURRENT_COMPANIES", "many");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "NEWSCRAWL_MAX_CONCURRENT_COMPANIES"),
            "expected InvalidEnvVar, got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_concurrency() {
        let mut map = HashMap::new();
        map.insert("NEWSCRAWL_MAX_CONCURRENT_COMPANIES", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn read_yaml_reports_missing_file() {
        let result: Result<serde_yaml::Value, _> =
            read_yaml(Path::new("/definitely/not/here.yaml"));
        assert!(matches!(result, Err(ConfigError::FileIo { .. })));
    }
}
