use crate::error::{LedgerError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

/// How many heights behind the deepest block a fork stays extendable
pub const DEFAULT_CUT_OFF_AGE: usize = 10;
static DEFAULT_LOG_LEVEL: &str = "info";

const CUT_OFF_AGE_KEY: &str = "CUT_OFF_AGE";
const LOG_LEVEL_KEY: &str = "LEDGER_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub cut_off_age: usize,
    pub log_level: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            cut_off_age: DEFAULT_CUT_OFF_AGE,
            log_level: String::from(DEFAULT_LOG_LEVEL),
        }
    }
}

impl LedgerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.cut_off_age == 0 {
            return Err(LedgerError::Config(
                "cut_off_age must be at least 1".to_string(),
            ));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(LedgerError::Config(format!(
                "Unknown log level: {}",
                self.log_level
            )));
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

pub struct Config {
    inner: RwLock<LedgerSettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Defaults, overridden by `CUT_OFF_AGE` and `LEDGER_LOG` when they hold
    /// acceptable values
    pub fn new() -> Config {
        let mut settings = LedgerSettings::default();
        if let Ok(age) = env::var(CUT_OFF_AGE_KEY) {
            match age.parse::<usize>() {
                Ok(age) if age > 0 => settings.cut_off_age = age,
                _ => log::warn!("Ignoring invalid {CUT_OFF_AGE_KEY}={age}"),
            }
        }
        if let Ok(level) = env::var(LOG_LEVEL_KEY) {
            if level.parse::<log::LevelFilter>().is_ok() {
                settings.log_level = level;
            } else {
                log::warn!("Ignoring invalid {LOG_LEVEL_KEY}={level}");
            }
        }
        Config {
            inner: RwLock::new(settings),
        }
    }

    pub fn from_settings(settings: LedgerSettings) -> Result<Config> {
        settings.validate()?;
        Ok(Config {
            inner: RwLock::new(settings),
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        let settings: LedgerSettings = toml::from_str(contents)?;
        Self::from_settings(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn get_settings(&self) -> LedgerSettings {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn get_cut_off_age(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .cut_off_age
    }

    pub fn set_cut_off_age(&self, cut_off_age: usize) -> Result<()> {
        if cut_off_age == 0 {
            return Err(LedgerError::Config(
                "cut_off_age must be at least 1".to_string(),
            ));
        }
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .cut_off_age = cut_off_age;
        Ok(())
    }

    pub fn get_log_level(&self) -> log::LevelFilter {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .log_level_filter()
    }
}
