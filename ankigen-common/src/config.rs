//! Configuration loading and root folder resolution
//!
//! The root folder holds the SQLite database, synthesized audio clips, and an
//! optional `ankigen.toml` settings file. Resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. `ANKIGEN_ROOT_FOLDER` environment variable
//! 3. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "ANKIGEN_ROOT_FOLDER";

/// Environment variable overriding the OpenAI API key from the settings file
pub const OPENAI_API_KEY_ENV: &str = "ANKIGEN_OPENAI_API_KEY";

/// Settings file name inside the root folder
pub const SETTINGS_FILE: &str = "ankigen.toml";

/// Resolve the root folder following the priority order above
pub fn resolve_root_folder(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    default_root_folder()
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("ankigen"))
        .unwrap_or_else(|| PathBuf::from("./ankigen_data"))
}

/// Ensure the root folder (and its audio subdirectory) exists
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    std::fs::create_dir_all(root.join("audio"))?;
    Ok(())
}

/// Database file path inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join("ankigen.db")
}

/// Service settings, loaded from `<root>/ankigen.toml`
///
/// Every field has a default so a missing file yields a working configuration
/// (the OpenAI key is the one value that must come from the file or the
/// environment before word generation can succeed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OpenAI API key for word generation
    pub openai_api_key: String,
    /// OpenAI chat model used for word generation
    pub openai_model: String,
    /// Timeout for one word-generation call, in seconds
    pub generation_timeout_secs: u64,
    /// Language code passed to the TTS endpoint
    pub tts_language: String,
    /// Timeout for one audio-synthesis call, in seconds
    pub tts_timeout_secs: u64,
    /// Bounded worker pool size for audio synthesis
    pub audio_workers: usize,
    /// Fuzzy duplicate similarity threshold, 0.0..=1.0 (ties are duplicates)
    pub similarity_threshold: f64,
    /// Default number of cards per generation request
    pub default_max_cards: u32,
    /// Upper bound on cards per generation request
    pub max_cards_limit: u32,
    /// Quality gate tunables
    pub quality: QualitySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_model: "gpt-3.5-turbo".to_string(),
            generation_timeout_secs: 30,
            tts_language: "en".to_string(),
            tts_timeout_secs: 15,
            audio_workers: 4,
            similarity_threshold: 0.8,
            default_max_cards: 10,
            max_cards_limit: 20,
            quality: QualitySettings::default(),
        }
    }
}

/// Quality gate configuration
///
/// Thresholds and score weights are tunables, not constants; they are carried
/// here so the pipeline receives them explicitly instead of reading ambient
/// process state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySettings {
    /// Minimum word length in characters
    pub min_word_len: usize,
    /// Maximum word length in characters
    pub max_word_len: usize,
    /// Minimum example sentence length in characters
    pub min_example_len: usize,
    /// Composite score threshold, 0.0..=1.0
    pub score_threshold: f64,
    /// Weight of the word sub-score in the composite
    pub word_weight: f64,
    /// Weight of the translation sub-score in the composite
    pub translation_weight: f64,
    /// Weight of the example sub-score in the composite
    pub example_weight: f64,
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self {
            min_word_len: 2,
            max_word_len: 40,
            min_example_len: 10,
            score_threshold: 0.7,
            word_weight: 0.2,
            translation_weight: 0.3,
            example_weight: 0.5,
        }
    }
}

impl Settings {
    /// Load settings from `<root>/ankigen.toml`, falling back to defaults when
    /// the file is absent. The OpenAI key may be overridden via environment.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE);

        let mut settings = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            Settings::default()
        };

        if let Ok(key) = std::env::var(OPENAI_API_KEY_ENV) {
            if !key.trim().is_empty() {
                settings.openai_api_key = key;
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings that would make the pipeline misbehave
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within 0.0..=1.0, got {}",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.quality.score_threshold) {
            return Err(Error::Config(format!(
                "quality.score_threshold must be within 0.0..=1.0, got {}",
                self.quality.score_threshold
            )));
        }
        if self.default_max_cards == 0 || self.default_max_cards > self.max_cards_limit {
            return Err(Error::Config(format!(
                "default_max_cards must be within 1..={}, got {}",
                self.max_cards_limit, self.default_max_cards
            )));
        }
        if self.audio_workers == 0 {
            return Err(Error::Config("audio_workers must be at least 1".to_string()));
        }
        Ok(())
    }
}
