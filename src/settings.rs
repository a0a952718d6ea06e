use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::http::RetryPolicy;

pub const ENV_PREFIX: &str = "PUBCHEM";

/// Run configuration. Every field can be set through `PUBCHEM_<FIELD>`; CLI flags win over env.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pug_base_url: String,
    pub view_base_url: String,
    pub max_attempts: u32,
    pub backoff_base_secs: f64,
    pub request_timeout_secs: f64,
    pub concurrency: usize,
    pub batch_size: usize,
    pub pause_secs: f64,
    pub json_output: PathBuf,
    pub xlsx_output: PathBuf,
    pub csv_input: PathBuf,
    pub csv_output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pug_base_url: "https://pubchem.ncbi.nlm.nih.gov/rest/pug".into(),
            view_base_url: "https://pubchem.ncbi.nlm.nih.gov/rest/pug_view".into(),
            max_attempts: 3,
            backoff_base_secs: 1.0,
            request_timeout_secs: 10.0,
            concurrency: 5,
            batch_size: 5,
            pause_secs: 2.0,
            json_output: "tox_data.json".into(),
            xlsx_output: "tox_data.xlsx".into(),
            csv_input: "your_input_file.csv".into(),
            csv_output: "chemicals_with_ghs.csv".into(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read PUBCHEM_* environment")?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: Config) -> Result<Self> {
        let settings: Settings = cfg
            .try_deserialize()
            .context("Invalid PUBCHEM_* settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        for (name, secs) in [
            ("backoff_base_secs", self.backoff_base_secs),
            ("request_timeout_secs", self.request_timeout_secs),
            ("pause_secs", self.pause_secs),
        ] {
            if let Err(e) = Duration::try_from_secs_f64(secs) {
                bail!("{} must be a non-negative number of seconds, got {}: {}", name, secs, e);
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs_f64(self.backoff_base_secs),
            ..RetryPolicy::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_secs_f64(self.pause_secs)
    }
}
