use std::{fs, io, path::Path, str::FromStr};

use anyhow::Context;
use rotator_core::RotatorConfig;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rotator: RotatorConfig,
    pub json_events: bool,
}

/// Defaults, then `path` if it exists, then `FLAPBOARD_*` / `APP__*` environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config: no config file, using defaults");
            Settings::default()
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

pub fn split_words(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// `APP__<KEY>` wins over `FLAPBOARD_<KEY>` when both are set.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| {
        lookup(&format!("APP__{key}")).or_else(|| lookup(&format!("FLAPBOARD_{key}")))
    };
    let rotator = &mut settings.rotator;

    if let Some(v) = var("WORDS") {
        rotator.words = split_words(&v);
    }
    if let Some(v) = parsed(&var, "MODE") {
        rotator.mode = v;
    }
    if let Some(v) = parsed(&var, "TIMING_MODE") {
        rotator.timing_mode = v;
    }
    if let Some(v) = parsed(&var, "FIRST_INTERVAL_MS") {
        rotator.first_word_interval_ms = v;
    }
    if let Some(v) = parsed(&var, "OTHER_INTERVAL_MS") {
        rotator.other_word_interval_ms = v;
    }
    if let Some(v) = parsed(&var, "LAST_INTERVAL_MS") {
        rotator.last_word_interval_ms = Some(v);
    }
    if let Some(v) = parsed(&var, "CASCADE_DELAY_MS") {
        rotator.cascade_delay_ms = v;
    }
    if let Some(v) = parsed(&var, "FLIP_SPEED_MS") {
        rotator.flip_speed_ms = v;
    }
    if let Some(v) = parsed(&var, "JSON_EVENTS") {
        settings.json_events = v;
    }
}

fn parsed<T, V>(var: &V, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, value = %raw, %error, "config: ignoring invalid environment override");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
