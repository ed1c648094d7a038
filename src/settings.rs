use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "FACULTY";

const DEFAULT_URLS: [&str; 2] = [
    "https://csie.asia.edu.tw/zh_tw/associate_professors_2?page_no=1&",
    "https://csie.asia.edu.tw/zh_tw/associate_professors_2?page_no=2&",
];
const DEFAULT_DB_PATH: &str = "professors.db";
const DEFAULT_OUTPUT_PATH: &str = "professors.txt";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Run settings: built-in defaults, then `FACULTY_*` env vars, then CLI flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub urls: Vec<String>,
    pub db_path: PathBuf,
    pub output_path: PathBuf,
    pub timeout_secs: u64,
}

/// Values given on the command line; `None`/empty leaves the setting as is.
#[derive(Debug, Default)]
pub struct Overrides {
    pub urls: Vec<String>,
    pub db_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_env(env_source())
    }

    fn from_env(env: Environment) -> Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("urls", DEFAULT_URLS.to_vec())?
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("output_path", DEFAULT_OUTPUT_PATH)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self> {
        if !overrides.urls.is_empty() {
            self.urls = overrides.urls;
        }
        if let Some(p) = overrides.db_path {
            self.db_path = p;
        }
        if let Some(p) = overrides.output_path {
            self.output_path = p;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.urls.is_empty() {
            bail!("No page URLs configured (set {}_URLS or pass --url)", ENV_PREFIX);
        }
        if self.urls.iter().any(|u| u.trim().is_empty()) {
            bail!("Blank page URL in configuration");
        }
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("urls")
}

// ── Tests ──
