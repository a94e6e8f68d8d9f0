//! Explicit runtime configuration.
//!
//! Settings come from (lowest to highest priority) built-in defaults, an
//! optional JSON file, and environment variables. Front ends apply their own
//! flags on top and pass the result to constructors; nothing here is global.

use crate::error::{RenovizError, Result};
use crate::session::MAX_UPLOAD_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for building a renderer and sessions.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenovizConfig {
    /// Gemini API key. Falls back to `GOOGLE_API_KEY` / `GEMINI_API_KEY`.
    pub api_key: Option<String>,
    /// Model identifier, e.g. `gemini-2.5-flash-image`.
    pub model: Option<String>,
    /// API base URL override.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Upload size limit in bytes.
    pub max_upload_bytes: u64,
    /// JSON style catalog replacing the built-in one.
    pub styles_path: Option<PathBuf>,
}

impl Default for RenovizConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            styles_path: None,
        }
    }
}

impl std::fmt::Debug for RenovizConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenovizConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("styles_path", &self.styles_path)
            .finish()
    }
}

impl RenovizConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            RenovizError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| RenovizError::Config(format!("invalid {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, optionally overlaid by a file, then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `RENOVIZ_*` and API key variables using `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if self.api_key.is_none() {
            self.api_key = lookup("GOOGLE_API_KEY").or_else(|| lookup("GEMINI_API_KEY"));
        }
        if let Some(model) = lookup("RENOVIZ_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = lookup("RENOVIZ_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(secs) = lookup("RENOVIZ_TIMEOUT_SECS") {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                RenovizError::Config(format!("RENOVIZ_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        if let Some(path) = lookup("RENOVIZ_STYLES") {
            self.styles_path = Some(PathBuf::from(path));
        }
        self.validate()
    }

    /// Rejects values no request could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(RenovizError::Config("timeout must be at least 1 second".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(RenovizError::Config("upload limit must be positive".into()));
        }
        Ok(())
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Loads the configured style catalog, or the built-in one.
    pub fn catalog(&self) -> Result<crate::catalog::StyleCatalog> {
        match &self.styles_path {
            Some(path) => crate::catalog::StyleCatalog::load(path),
            None => Ok(crate::catalog::StyleCatalog::builtin()),
        }
    }

    /// Creates an empty session honoring the upload limit.
    pub fn session(&self) -> crate::session::RenovationSession {
        crate::session::RenovationSession::with_upload_limit(self.max_upload_bytes)
    }

    /// Builds a Gemini-backed renderer from this configuration.
    #[cfg(feature = "gemini")]
    pub fn renovator(&self) -> Result<crate::orchestrator::Renovator> {
        use crate::image::providers::GeminiProvider;

        let mut builder = GeminiProvider::builder().timeout(self.timeout());
        if let Some(ref key) = self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(ref model) = self.model {
            builder = builder.model(model.parse()?);
        }
        if let Some(ref url) = self.base_url {
            builder = builder.base_url(url);
        }
        Ok(crate::orchestrator::Renovator::new(builder.build()?))
    }
}
