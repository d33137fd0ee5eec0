use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_REFRESH_INTERVAL_SECS: u64 = 5;
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

pub const CONFIG_PATH_ENV: &str = "STREAMERS_CONFIG";
const COLLECTOR_URL_ENV: &str = "STREAMERS_COLLECTOR_URL";
const REFRESH_INTERVAL_ENV: &str = "STREAMERS_REFRESH_INTERVAL_SECS";
const REQUEST_TIMEOUT_ENV: &str = "STREAMERS_REQUEST_TIMEOUT_SECS";
const DATA_DIR_ENV: &str = "STREAMERS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub collector_base_url: String,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collector_base_url: "http://localhost:5500".to_string(),
            refresh_interval_secs: 60,
            // the collector can take up to 50 seconds to answer
            request_timeout_secs: 50,
            data_dir: PathBuf::from("streamers-data"),
        }
    }
}

impl Settings {
    /// Defaults, overlaid by the JSON file named in `STREAMERS_CONFIG`, overlaid
    /// by individual environment variables.
    pub fn load() -> AppResult<Self> {
        let config_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::from_sources(config_path.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        config_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let mut settings = match config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|error| {
                    AppError::Config(format!("Failed to read {}: {}", path.display(), error))
                })?;
                serde_json::from_str::<Settings>(&raw).map_err(|error| {
                    AppError::Config(format!("Invalid settings file {}: {}", path.display(), error))
                })?
            }
            None => Settings::default(),
        };

        if let Some(url) = env(COLLECTOR_URL_ENV) {
            settings.collector_base_url = url;
        }
        if let Some(raw) = env(REFRESH_INTERVAL_ENV) {
            settings.refresh_interval_secs = parse_secs(REFRESH_INTERVAL_ENV, &raw)?;
        }
        if let Some(raw) = env(REQUEST_TIMEOUT_ENV) {
            settings.request_timeout_secs = parse_secs(REQUEST_TIMEOUT_ENV, &raw)?;
        }
        if let Some(dir) = env(DATA_DIR_ENV) {
            settings.data_dir = PathBuf::from(dir);
        }

        settings.validate()
    }

    fn validate(mut self) -> AppResult<Self> {
        let url = self.collector_base_url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "Collector base URL must start with http:// or https://, got {:?}",
                self.collector_base_url
            )));
        }
        self.collector_base_url = url;

        if self.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS {
            return Err(AppError::Config(format!(
                "Refresh interval must be at least {} seconds",
                MIN_REFRESH_INTERVAL_SECS
            )));
        }
        let timeout_range = MIN_REQUEST_TIMEOUT_SECS..=MAX_REQUEST_TIMEOUT_SECS;
        if !timeout_range.contains(&self.request_timeout_secs) {
            return Err(AppError::Config(format!(
                "Request timeout must be between {} and {} seconds",
                MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS
            )));
        }
        Ok(self)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

fn parse_secs(key: &str, raw: &str) -> AppResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| {
            AppError::Config(format!(
                "{} must be a whole number of seconds, got {:?}",
                key, raw
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::errors::AppError;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_collector() {
        let settings = Settings::from_sources(None, env_from(&[])).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.export_dir(), PathBuf::from("streamers-data").join("exports"));
    }

    #[test]
    fn file_then_env_precedence() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"collectorBaseUrl":"https://collector.example/","refreshIntervalSecs":30}"#,
        )
        .expect("write settings");

        let settings = Settings::from_sources(
            Some(&path),
            env_from(&[("STREAMERS_REFRESH_INTERVAL_SECS", "120")]),
        )
        .expect("load settings");
        assert_eq!(settings.collector_base_url, "https://collector.example");
        assert_eq!(settings.refresh_interval_secs, 120);
        assert_eq!(settings.request_timeout_secs, 50);
    }

    #[test]
    fn rejects_invalid_values() {
        let cases: [&[(&str, &str)]; 4] = [
            &[("STREAMERS_COLLECTOR_URL", "localhost:5500")],
            &[("STREAMERS_REFRESH_INTERVAL_SECS", "1")],
            &[("STREAMERS_REQUEST_TIMEOUT_SECS", "0")],
            &[("STREAMERS_REQUEST_TIMEOUT_SECS", "ten")],
        ];
        for pairs in cases {
            let error =
                Settings::from_sources(None, env_from(pairs)).expect_err("invalid settings");
            assert!(matches!(error, AppError::Config(_)));
        }
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let error = Settings::from_sources(Some(&temp.path().join("absent.json")), env_from(&[]))
            .expect_err("missing file");
        assert!(matches!(error, AppError::Config(_)));
    }
}
