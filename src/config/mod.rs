use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    currency::CurrencyCode,
    errors::ProjectionError,
    ledger::DateRange,
    simulation::ProjectionParams,
    utils::app_data_dir,
};

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_HORIZON_DAYS: u32 = 400;

/// Run parameters. Transaction definitions are supplied programmatically.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub currency: String,
    pub start_amount: f64,
    pub save_percentage: f64,
    pub horizon_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            start_amount: 0.0,
            save_percentage: 0.0,
            horizon_days: DEFAULT_HORIZON_DAYS,
            start_date: None,
        }
    }
}

impl Config {
    /// Parameters the sample budget is projected with when no config file exists.
    pub fn sample() -> Self {
        Self {
            start_amount: 1800.0,
            save_percentage: 30.0,
            ..Self::default()
        }
    }

    /// `save_percentage / 100`, clamped to `[0, 1]`.
    pub fn save_proportion(&self) -> f64 {
        (self.save_percentage / 100.0).clamp(0.0, 1.0)
    }

    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        DateRange::with_horizon(self.start_date.unwrap_or(today), self.horizon_days)
    }

    pub fn projection_params(&self, today: NaiveDate) -> ProjectionParams {
        ProjectionParams::new(
            self.date_range(today),
            self.start_amount,
            self.save_proportion(),
        )
        .with_currency(CurrencyCode::new(self.currency.as_str()))
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        if !self.start_amount.is_finite() {
            return Err(ProjectionError::InvalidConfig(
                "start_amount must be a finite number".into(),
            ));
        }
        if !self.save_percentage.is_finite() {
            return Err(ProjectionError::InvalidConfig(
                "save_percentage must be a finite number".into(),
            ));
        }
        if self.horizon_days == 0 {
            return Err(ProjectionError::InvalidConfig(
                "horizon_days must be at least 1".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(ProjectionError::InvalidConfig(
                "currency must not be empty".into(),
            ));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for `config.json` inside the application data directory.
    pub fn new() -> Self {
        Self::with_path(app_data_dir().join(CONFIG_FILE))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads and validates the configuration, falling back to defaults when
    /// the file does not exist.
    pub fn load(&self) -> Result<Config, ProjectionError> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)?
        } else {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), ProjectionError> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ProjectionError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
