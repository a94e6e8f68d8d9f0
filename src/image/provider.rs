//! Image editing service trait.

use crate::error::Result;
use crate::image::types::EditedImage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Which backend an editor talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    /// Google Gemini image models.
    Gemini,
    /// In-process substitute (tests, offline demos).
    Local,
}

impl std::fmt::Display for EditorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// A generative service that rewrites an image according to an instruction.
///
/// This is the only seam between the renovation workflow and the network.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Sends one instruction plus one inline image and returns the first
    /// image the service produced.
    async fn edit(&self, instruction: &str, image: &[u8], mime_type: &str)
        -> Result<EditedImage>;

    /// Returns the kind of this editor.
    fn kind(&self) -> EditorKind;

    /// Returns the name of this editor for display.
    fn name(&self) -> &str {
        match self.kind() {
            EditorKind::Gemini => "Gemini (Google)",
            EditorKind::Local => "Local",
        }
    }

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
