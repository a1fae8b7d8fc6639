//! Configuration: loads optional ~/.cuetrace/config.yaml.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assemble::{builtin_rules, SubstitutionRule};
use crate::error::ConfigError;

/// Settings for a live session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Identifier substitutions applied before evaluation.
    #[serde(default = "builtin_rules")]
    pub substitutions: Vec<SubstitutionRule>,
    /// Re-evaluate this many milliseconds after the last edit. Off when absent.
    #[serde(default)]
    pub auto_evaluate_ms: Option<u64>,
    /// Highlight frames per second.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    /// Playback speed in cycles per second.
    #[serde(default = "default_cps")]
    pub cps: f64,
}

fn default_frame_rate() -> f64 {
    60.0
}

fn default_cps() -> f64 {
    0.5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            substitutions: builtin_rules(),
            auto_evaluate_ms: None,
            frame_rate: default_frame_rate(),
            cps: default_cps(),
        }
    }
}

impl Config {
    /// Load from ~/.cuetrace/config.yaml. Returns None if the file is missing
    /// or unreadable.
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content).ok()
    }

    /// Load an explicitly named file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Debounce interval for automatic re-evaluation.
    pub fn auto_evaluate(&self) -> Option<Duration> {
        self.auto_evaluate_ms.map(Duration::from_millis)
    }

    /// Wall-clock time between highlight frames.
    pub fn frame_interval(&self) -> Duration {
        if self.frame_rate > 0.0 {
            Duration::from_secs_f64(1.0 / self.frame_rate)
        } else {
            Duration::from_secs_f64(1.0 / default_frame_rate())
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cuetrace").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.frame_rate, 60.0);
        assert_eq!(config.cps, 0.5);
        assert!(config.auto_evaluate().is_none());
        assert_eq!(config.substitutions, builtin_rules());
    }

    #[test]
    fn missing_config_does_not_panic() {
        let _ = Config::load();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::parse("auto_evaluate_ms: 250\n").unwrap();
        assert_eq!(config.auto_evaluate(), Some(Duration::from_millis(250)));
        assert_eq!(config.cps, 0.5);
        assert_eq!(config.substitutions, builtin_rules());
    }

    #[test]
    fn custom_substitutions_replace_builtins() {
        let yaml = r#"
substitutions:
  - token: fm_bell
    fallback: sine
cps: 1.0
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.substitutions.len(), 1);
        assert_eq!(config.substitutions[0].token, "fm_bell");
        assert_eq!(config.substitutions[0].fallback, "sine");
        assert_eq!(config.cps, 1.0);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            Config::parse("frame_rate: [fast"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn frame_interval_follows_rate() {
        let config = Config {
            frame_rate: 50.0,
            ..Config::default()
        };
        assert!((config.frame_interval().as_secs_f64() - 0.02).abs() < 1e-9);

        let broken = Config {
            frame_rate: 0.0,
            ..Config::default()
        };
        assert!(broken.frame_interval() > Duration::ZERO);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "frame_rate: 30").unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.frame_rate, 30.0);
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
