use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use ::config::{Config, Environment, File, Source};
use generation::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::Deserialize;
use server_api::{
    credential::DEFAULT_API_KEY_ENV,
    instruction::{InstructionTemplate, InstructionVars},
    Sampling, DEFAULT_TEMPERATURE,
};

const SETTINGS_FILE: &str = "server";
const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

/// Unprefixed variables still honoured for compatibility; `APP__*` wins over them.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SERVER_BIND", "server_bind"),
    ("GEMINI_MODEL", "model"),
    ("GEMINI_BASE_URL", "api_base_url"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_bind: String,
    /// Environment variable holding the generation API key.
    pub api_key_env: String,
    /// Used only when `api_key_env` is unset or empty.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// Directory of built UI assets. Empty disables static serving.
    pub static_dir: String,
    pub instruction_template_path: Option<String>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:3000".into(),
            api_key_env: DEFAULT_API_KEY_ENV.into(),
            api_key: None,
            model: DEFAULT_MODEL.into(),
            api_base_url: DEFAULT_BASE_URL.into(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: 60,
            static_dir: "dist".into(),
            instruction_template_path: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn sampling(&self) -> Sampling {
        Sampling {
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn static_dir(&self) -> Option<PathBuf> {
        let dir = self.static_dir.trim();
        if dir.is_empty() {
            return None;
        }
        let path = Path::new(dir);
        path.is_dir().then(|| path.to_path_buf())
    }

    /// Renders the system instruction, from the override file when one is set.
    pub fn system_instruction(&self) -> anyhow::Result<String> {
        let template = match self.instruction_template_path.as_deref() {
            Some(path) => InstructionTemplate::new(fs::read_to_string(path).with_context(|| {
                format!("failed to read instruction template '{path}'")
            })?),
            None => InstructionTemplate::default(),
        };
        template
            .render(&InstructionVars::default())
            .context("failed to render instruction template")
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    build_settings(
        File::with_name(SETTINGS_FILE).required(false),
        legacy_env(|var| std::env::var(var).ok()),
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    )
}

fn build_settings(
    file: impl Source + Send + Sync + 'static,
    legacy: Environment,
    env: Environment,
) -> anyhow::Result<Settings> {
    Config::builder()
        .add_source(file)
        .add_source(legacy)
        .add_source(env)
        .build()
        .context("failed to load settings")?
        .try_deserialize::<Settings>()
        .context("invalid settings")
}

fn legacy_env(lookup: impl Fn(&str) -> Option<String>) -> Environment {
    let values: HashMap<String, String> = LEGACY_ENV
        .iter()
        .filter_map(|(var, key)| lookup(var).map(|value| (key.to_string(), value)))
        .collect();
    Environment::default().source(Some(values))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
