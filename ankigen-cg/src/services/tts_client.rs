//! Audio synthesis service
//!
//! Trait seam for pronunciation synthesis plus the production client backed by
//! the Google Translate TTS endpoint. Synthesized clips are written under
//! `<root>/audio/` and referenced by relative path; synthesis failure is
//! reported to the caller, which treats it as a degradation rather than a
//! card-acceptance blocker.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use ankigen_common::config::Settings;

const TTS_BASE_URL: &str = "https://translate.google.com/translate_tts";

/// Audio synthesis client errors
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}")]
    Api(u16),

    #[error("Failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reference to a synthesized audio artifact (path relative to the root folder)
pub type AudioRef = String;

/// External service that turns a word into a pronunciation clip reference
#[async_trait]
pub trait AudioSynthesisService: Send + Sync {
    async fn synthesize(&self, word: &str) -> Result<AudioRef, TtsError>;
}

/// Google Translate TTS client writing MP3 clips under the root folder
pub struct GoogleTtsClient {
    http_client: reqwest::Client,
    language: String,
    audio_dir: PathBuf,
}

impl GoogleTtsClient {
    pub fn new(settings: &Settings, root_folder: &std::path::Path) -> Result<Self, TtsError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.tts_timeout_secs))
            .build()
            .map_err(|e| TtsError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            language: settings.tts_language.clone(),
            audio_dir: root_folder.join("audio"),
        })
    }

    /// Filesystem-safe clip name: normalized word plus a short unique suffix
    /// so regenerated decks never clobber older clips
    fn clip_name(word: &str) -> String {
        let safe: String = crate::services::normalizer::normalize_word(word)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let suffix = &Uuid::new_v4().simple().to_string()[..8];
        format!("{}-{}.mp3", safe.trim_matches('_'), suffix)
    }
}

#[async_trait]
impl AudioSynthesisService for GoogleTtsClient {
    async fn synthesize(&self, word: &str) -> Result<AudioRef, TtsError> {
        let response = self
            .http_client
            .get(TTS_BASE_URL)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.language.as_str()),
                ("q", word),
            ])
            .send()
            .await
            .map_err(|e| TtsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TtsError::Api(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TtsError::Network(e.to_string()))?;

        tokio::fs::create_dir_all(&self.audio_dir).await?;

        let file_name = Self::clip_name(word);
        let path = self.audio_dir.join(&file_name);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(word = %word, path = %path.display(), "Synthesized pronunciation clip");

        Ok(format!("audio/{}", file_name))
    }
}
