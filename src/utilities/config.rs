use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::modules::elevator::{MAX_FLOOR, MIN_FLOOR};
use crate::utilities::error::ConfigError;

const CONFIG_FILE: &str = "config.json";
const FALLBACK_CONFIG_FILE: &str = "_config.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ElevatorSettings {
    pub travel_delay_ms: u64,
    pub door_delay_ms: u64,
}

impl ElevatorSettings {
    pub fn travel_delay(&self) -> Duration {
        Duration::from_millis(self.travel_delay_ms)
    }

    pub fn door_delay(&self) -> Duration {
        Duration::from_millis(self.door_delay_ms)
    }
}

impl Default for ElevatorSettings {
    fn default() -> Self {
        ElevatorSettings {
            travel_delay_ms: 300,
            door_delay_ms: 200,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ControllerSettings {
    pub operation_timeout_ms: u64,
    pub max_retries: u32,
    pub poll_interval_ms: u64,
}

impl ControllerSettings {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettings {
            operation_timeout_ms: 5000,
            max_retries: 1,
            poll_interval_ms: 500,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub elevator: ElevatorSettings,
    pub controller: ControllerSettings,
}

impl Config {
    /// Reads `config.json`, then `_config.json`, and falls back to the
    /// built-in defaults when neither exists.
    pub fn get() -> Result<Self, ConfigError> {
        for file_path in [CONFIG_FILE, FALLBACK_CONFIG_FILE] {
            if Path::new(file_path).exists() {
                return Self::from_file(file_path)
            }
        }
        info!("no configuration file provided, using default settings");
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = file_path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller.operation_timeout_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "controller.operation_timeout_ms must be positive",
            )))
        }
        if self.controller.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "controller.poll_interval_ms must be positive",
            )))
        }
        let worst_case_move = self.worst_case_move();
        if worst_case_move >= self.controller.operation_timeout() {
            warn!(
                worst_case_ms = worst_case_move.as_millis() as u64,
                timeout_ms = self.controller.operation_timeout_ms,
                "a full-range move can outlast the operation timeout"
            );
        }
        Ok(())
    }

    /// Time a single move across the whole shaft takes, door cycle included.
    pub fn worst_case_move(&self) -> Duration {
        let floors = (MAX_FLOOR - MIN_FLOOR) as u32;
        self.elevator.travel_delay() * floors + self.elevator.door_delay() * 3
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    pub config_path: Option<PathBuf>,
    pub status_view: bool,
}

pub fn parse_env_args() -> Args {
    parse_args(env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Args {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => parsed.config_path = Some(PathBuf::from(path)),
                None => warn!("--config needs a path, skipping"),
            },
            "--status" => parsed.status_view = true,
            _ => warn!(argument = %arg, "illegal argument, skipping"),
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.controller.operation_timeout(), Duration::from_secs(5));
        assert_eq!(config.controller.max_retries, 1);
        assert_eq!(config.controller.poll_interval(), Duration::from_millis(500));
        assert!(config.worst_case_move() < config.controller.operation_timeout());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_json(r#"{ "elevator": { "travel_delay_ms": 10 } }"#).unwrap();
        assert_eq!(config.elevator.travel_delay_ms, 10);
        assert_eq!(config.elevator.door_delay_ms, 200);
        assert_eq!(config.controller, ControllerSettings::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config =
            Config::from_json(r#"{ "controller": { "operation_timeout_ms": 0 } }"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::from_file("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn fallback_file_parses() {
        let config =
            Config::from_file(concat!(env!("CARGO_MANIFEST_DIR"), "/_config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn args() {
        let args = parse_args(
            ["--status", "--bogus", "--config", "custom.json"]
                .iter()
                .map(|s| s.to_string()),
        );
        assert_eq!(
            args,
            Args {
                config_path: Some(PathBuf::from("custom.json")),
                status_view: true,
            }
        );
    }
}
