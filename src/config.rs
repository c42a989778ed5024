//! Settings store for long-lived secrets.
//!
//! Settings are read from a dotenv-style file (`KEY=value` lines, `#`
//! comments). Keys the file does not define fall back to the process
//! environment. The file is read once; the resulting [`Settings`] value is
//! handed to whoever needs it.

use anyhow::{Context, Result};
use log::debug;
use std::collections::HashMap;
use std::path::Path;

use crate::runtime::Runtime;

/// Settings key holding the Distance Matrix API key.
pub const API_KEY_SETTING: &str = "DISTANCE_MATRIX_API_KEY";

/// Settings file consulted when none is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "config.env";

/// Keys that may be supplied through the environment instead of the file.
const ENV_FALLBACK_KEYS: &[&str] = &[API_KEY_SETTING];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses dotenv-formatted text.
    pub fn parse(contents: &str) -> Result<Self> {
        let values = dotenvy::from_read_iter(contents.as_bytes())
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to parse settings")?;
        Ok(Self { values })
    }

    /// Loads the settings file at `path` if it exists, then fills missing
    /// keys from the environment.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let mut settings = if runtime.exists(path) {
            let contents = runtime.read_to_string(path)?;
            Settings::parse(&contents)
                .with_context(|| format!("Invalid settings file {:?}", path))?
        } else {
            debug!("Settings file {:?} not found, using environment only", path);
            Settings::default()
        };

        for key in ENV_FALLBACK_KEYS {
            if settings.values.contains_key(*key) {
                continue;
            }
            if let Ok(value) = runtime.env_var(key) {
                debug!("Using {} from the environment", key);
                settings.values.insert((*key).to_string(), value);
            }
        }

        Ok(settings)
    }

    /// The value under `key`, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Masks a secret for logging, keeping a short prefix and suffix.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
