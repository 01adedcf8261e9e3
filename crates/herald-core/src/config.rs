//! Config - 起動時の設定
//!
//! 優先順位: 環境変数 > TOML ファイル > デフォルト値
//!
//! ```toml
//! [sink]
//! base_url = "http://localhost:3000"
//! path = "/api/notifications/broadcast"
//! timeout_ms = 5000
//!
//! [sink.headers]
//! x-internal-token = "..."
//!
//! [log]
//! level = "info"
//! json = false
//! ```
//!
//! | 環境変数 | 上書き先 |
//! |---|---|
//! | `HERALD_SINK_URL` | `sink.base_url` |
//! | `HERALD_SINK_PATH` | `sink.path` |
//! | `HERALD_SINK_TIMEOUT_MS` | `sink.timeout_ms` |
//! | `HERALD_LOG_LEVEL` | `log.level` |
//! | `HERALD_LOG_JSON` | `log.json` |

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub sink: SinkConfig,
    pub log: LogConfig,
}

/// 配送先 sink の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub base_url: String,
    pub path: String,
    /// 1 回の配送にかける上限（ミリ秒）
    pub timeout_ms: u64,
    /// 毎リクエストに付ける追加ヘッダ
    pub headers: HashMap<String, String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            path: "/api/notifications/broadcast".to_string(),
            timeout_ms: 5_000,
            headers: HashMap::new(),
        }
    }
}

impl SinkConfig {
    /// `{base_url}{path}`（境界のスラッシュは 1 つにまとめる）
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// EnvFilter の書式（"info", "herald_core=debug,info" など）
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl HeraldConfig {
    /// ファイル（任意）を読み、プロセス環境変数で上書きする
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_from(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 環境変数の上書きを適用する。`lookup` はテストで差し替える。
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HERALD_SINK_URL") {
            self.sink.base_url = url;
        }
        if let Some(path) = lookup("HERALD_SINK_PATH") {
            self.sink.path = path;
        }
        if let Some(raw) = lookup("HERALD_SINK_TIMEOUT_MS") {
            self.sink.timeout_ms =
                raw.trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
                        var: "HERALD_SINK_TIMEOUT_MS",
                        reason: e.to_string(),
                    })?;
        }
        if let Some(level) = lookup("HERALD_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(raw) = lookup("HERALD_LOG_JSON") {
            self.log.json = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidEnv {
                var: "HERALD_LOG_JSON",
                reason: format!("expected bool, got {raw:?}"),
            })?;
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_point_at_local_broadcast_endpoint() {
        let config = HeraldConfig::default();
        assert_eq!(
            config.sink.endpoint(),
            "http://localhost:3000/api/notifications/broadcast"
        );
        assert_eq!(config.sink.timeout(), Duration::from_secs(5));
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: HeraldConfig = toml::from_str(
            r#"
            [sink]
            base_url = "http://erp.internal:8080/"
            timeout_ms = 1500

            [sink.headers]
            x-internal-token = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.sink.endpoint(),
            "http://erp.internal:8080/api/notifications/broadcast"
        );
        assert_eq!(config.sink.timeout_ms, 1500);
        assert_eq!(config.sink.headers["x-internal-token"], "secret");
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = HeraldConfig::default();
        config
            .apply_env_from(env(&[
                ("HERALD_SINK_URL", "http://hub:9000"),
                ("HERALD_SINK_PATH", "/push"),
                ("HERALD_SINK_TIMEOUT_MS", "250"),
                ("HERALD_LOG_LEVEL", "debug"),
                ("HERALD_LOG_JSON", "true"),
            ]))
            .unwrap();

        assert_eq!(config.sink.endpoint(), "http://hub:9000/push");
        assert_eq!(config.sink.timeout(), Duration::from_millis(250));
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[rstest]
    #[case("HERALD_SINK_TIMEOUT_MS", "soon")]
    #[case("HERALD_LOG_JSON", "maybe")]
    fn invalid_env_values_are_rejected(#[case] var: &str, #[case] value: &str) {
        let mut config = HeraldConfig::default();
        let err = config.apply_env_from(env(&[(var, value)])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
        assert!(err.to_string().contains(var));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = HeraldConfig::from_file(Path::new("/nonexistent/herald.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("On", Some(true))]
    #[case("false", Some(false))]
    #[case("nope", None)]
    fn parse_bool_values(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }
}
