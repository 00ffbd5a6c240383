/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::ConfigError;

/// Upper bound for any stage duration (one hour). Keeps timer deadlines far from `Instant` overflow.
pub const MAX_STAGE_DURATION_MS: u64 = 3_600_000;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub elevator: ElevatorConfig,
    pub timing: TimingConfig,
    pub database: DatabaseConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub n_floors: u8,
    pub initial_floor: u8,
}

/// All durations are in milliseconds.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub movement_duration: u64,
    pub door_operation_duration: u64,
    pub door_open_duration: u64,
    pub auto_close_delay: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorConfig {
            n_floors: 2,
            initial_floor: 1,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            movement_duration: 2000,
            door_operation_duration: 1000,
            door_open_duration: 1500,
            auto_close_delay: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            directory: PathBuf::from("Database"),
            file_name: "ElevatorLogs.db".to_string(),
        }
    }
}

impl TimingConfig {
    pub fn movement(&self) -> Duration {
        Duration::from_millis(self.movement_duration)
    }

    pub fn door_operation(&self) -> Duration {
        Duration::from_millis(self.door_operation_duration)
    }

    pub fn door_open(&self) -> Duration {
        Duration::from_millis(self.door_open_duration)
    }

    pub fn auto_close(&self) -> Duration {
        Duration::from_millis(self.auto_close_delay)
    }
}

impl DatabaseConfig {
    /// Relative directories are anchored next to the running executable.
    pub fn resolve_path(&self) -> PathBuf {
        let directory = if self.directory.is_absolute() {
            self.directory.clone()
        } else {
            let base = std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            base.join(&self.directory)
        };
        directory.join(&self.file_name)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elevator.n_floors != 2 {
            return Err(ConfigError::Invalid(format!(
                "n_floors must be 2, got {}",
                self.elevator.n_floors
            )));
        }
        if !(1..=self.elevator.n_floors).contains(&self.elevator.initial_floor) {
            return Err(ConfigError::Invalid(format!(
                "initial_floor must be between 1 and {}, got {}",
                self.elevator.n_floors, self.elevator.initial_floor
            )));
        }
        for (name, value) in [
            ("movement_duration", self.timing.movement_duration),
            ("door_operation_duration", self.timing.door_operation_duration),
            ("door_open_duration", self.timing.door_open_duration),
            ("auto_close_delay", self.timing.auto_close_delay),
        ] {
            if value > MAX_STAGE_DURATION_MS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at most {} ms, got {}",
                    name, MAX_STAGE_DURATION_MS, value
                )));
            }
        }
        if self.database.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("database file_name is empty".into()));
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        log::warn!(
            "Configuration file {} not found, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(path)?;
    parse_config(&config_str)
}

pub fn parse_config(config_str: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config_str)?;
    config.validate()?;
    Ok(config)
}

/***************************************/
/*             Unit tests              */
/***************************************/
