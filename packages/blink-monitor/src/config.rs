use std::path::{Path, PathBuf};
use std::str::FromStr;

use blink_engine::BlinkEngineConfig;

use crate::adapters::{Backend, EarAdapter};
use crate::error::MonitorError;

/// Polling cadence of the rate display
pub const DEFAULT_SNAPSHOT_INTERVAL_MS: u64 = 2_000;

pub const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub log_level: String,
    /// Directory for rolling log files; `None` keeps logs on stderr only
    pub file_log_dir: Option<PathBuf>,
    pub snapshot_interval_ms: u64,
    pub default_backend: Backend,
    pub ear: EarAdapter,
    pub engine: BlinkEngineConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_log_dir: None,
            snapshot_interval_ms: DEFAULT_SNAPSHOT_INTERVAL_MS,
            default_backend: Backend::default(),
            ear: EarAdapter::default(),
            engine: BlinkEngineConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Result<Self, MonitorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unparseable numbers fall
    /// back to their defaults; an unreadable config file or an inconsistent
    /// engine config is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MonitorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("BLINK_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        let file_logs = lookup("BLINK_FILE_LOGS").is_some_and(|v| v == "true" || v == "1");
        let file_log_dir = file_logs.then(|| {
            PathBuf::from(lookup("BLINK_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()))
        });

        let snapshot_interval_ms = parse_var(&lookup, "BLINK_SNAPSHOT_INTERVAL_MS")
            .filter(|ms: &u64| *ms > 0)
            .unwrap_or(DEFAULT_SNAPSHOT_INTERVAL_MS);

        let default_backend = match lookup("BLINK_BACKEND") {
            Some(name) => name.parse()?,
            None => Backend::default(),
        };

        let mut engine = match lookup("BLINK_ENGINE_CONFIG") {
            Some(path) => load_engine_config(Path::new(&path))?,
            None => BlinkEngineConfig::default(),
        };

        if let Some(v) = parse_var(&lookup, "BLINK_EYE_OPEN_THRESHOLD") {
            engine.eye.open_threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_EYE_CLOSE_THRESHOLD") {
            engine.eye.close_threshold = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "BLINK_MIN_DURATION_MS") {
            engine.classifier.min_duration_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_MAX_DURATION_MS") {
            engine.classifier.max_duration_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_SIMULTANEITY_MS") {
            engine.classifier.simultaneity_window_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_DEBOUNCE_MS") {
            engine.classifier.debounce_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_STABILITY_THRESHOLD") {
            engine.stability.threshold = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_ABSENCE_RESET_MS") {
            engine.stability.absence_reset_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "BLINK_WINDOW_MS") {
            engine.window.window_ms = v;
        }
        engine.validate()?;

        Ok(Self {
            log_level,
            file_log_dir,
            snapshot_interval_ms,
            default_backend,
            ear: EarAdapter::default(),
            engine,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|value| value.trim().parse().ok())
}

pub fn load_engine_config(path: &Path) -> Result<BlinkEngineConfig, MonitorError> {
    let to_error = |message: String| MonitorError::ConfigFile {
        path: PathBuf::from(path),
        message,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| to_error(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| to_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = MonitorConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.file_log_dir, None);
        assert_eq!(config.snapshot_interval_ms, 2_000);
        assert_eq!(config.default_backend, Backend::OpenProbability);
        assert_eq!(config.engine, BlinkEngineConfig::default());
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = MonitorConfig::from_lookup(lookup_from(&[
            ("RUST_LOG", "debug"),
            ("BLINK_SNAPSHOT_INTERVAL_MS", "not-a-number"),
            ("BLINK_BACKEND", "blendshape"),
            ("BLINK_DEBOUNCE_MS", "250"),
            ("BLINK_EYE_CLOSE_THRESHOLD", "0.2"),
        ]))
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.snapshot_interval_ms, 2_000);
        assert_eq!(config.default_backend, Backend::Blendshape);
        assert_eq!(config.engine.classifier.debounce_ms, 250);
        assert_eq!(config.engine.eye.close_threshold, Some(0.2));
    }

    #[test]
    fn test_file_logs_need_explicit_opt_in() {
        let config = MonitorConfig::from_lookup(lookup_from(&[("BLINK_LOG_DIR", "/var/log/blink")]))
            .unwrap();
        assert_eq!(config.file_log_dir, None);

        let config = MonitorConfig::from_lookup(lookup_from(&[("BLINK_FILE_LOGS", "1")])).unwrap();
        assert_eq!(config.file_log_dir, Some(PathBuf::from(DEFAULT_LOG_DIR)));

        let config = MonitorConfig::from_lookup(lookup_from(&[
            ("BLINK_FILE_LOGS", "true"),
            ("BLINK_LOG_DIR", "/var/log/blink"),
        ]))
        .unwrap();
        assert_eq!(config.file_log_dir, Some(PathBuf::from("/var/log/blink")));
    }

    #[test]
    fn test_inconsistent_engine_config_is_rejected() {
        let result = MonitorConfig::from_lookup(lookup_from(&[
            ("BLINK_MIN_DURATION_MS", "900"),
        ]));
        assert!(matches!(result, Err(MonitorError::Config(_))));

        let result = MonitorConfig::from_lookup(lookup_from(&[("BLINK_BACKEND", "dlib")]));
        assert!(matches!(result, Err(MonitorError::UnknownBackend(_))));
    }

    #[test]
    fn test_missing_config_file() {
        let result = MonitorConfig::from_lookup(lookup_from(&[(
            "BLINK_ENGINE_CONFIG",
            "/nonexistent/blink.json",
        )]));
        assert!(matches!(result, Err(MonitorError::ConfigFile { .. })));
    }
}
