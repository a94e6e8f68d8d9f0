#![warn(missing_docs)]
//! Renoviz - AI room renovation renders.
//!
//! Upload a photo of a room, pick a room type and a design style, and get a
//! photorealistic redesign of the same space from a generative image model.
//!
//! # Quick Start
//!
//! ```no_run
//! use renoviz::{RenovationSession, Renovator, GeminiProvider, RoomType, StyleCatalog};
//!
//! #[tokio::main]
//! async fn main() -> renoviz::Result<()> {
//!     let renovator = Renovator::new(GeminiProvider::builder().build()?);
//!     let catalog = StyleCatalog::builtin();
//!
//!     let mut session = RenovationSession::new();
//!     session.accept_file("living-room.jpg").await?;
//!     session.select_room(RoomType::LivingRoom);
//!     session.select_style(catalog.get("japandi").cloned().unwrap());
//!     session.generate(&renovator).await?;
//!
//!     if let Some(download) = session.view().download() {
//!         download.write_to(".")?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `gemini` (default): Gemini (Google) image editing provider
//! - `cli`: Command-line interface

pub mod catalog;
pub mod config;
mod error;
pub mod image;
pub mod orchestrator;
pub mod presenter;
pub mod prompt;
pub mod session;

// Re-export error types at crate root
pub use error::{RenovizError, Result};

pub use catalog::{DesignStyle, RoomType, StyleCatalog};
pub use config::RenovizConfig;
pub use image::{EditedImage, EditorKind, EncodedImage, GenerationMetadata, ImageEditor, ImageFormat};
pub use orchestrator::Renovator;
pub use presenter::{Download, ResultPane, SessionView, SourcePane, DOWNLOAD_FILE_NAME};
pub use session::{Phase, RenderJob, RenovationSession, MAX_UPLOAD_BYTES};

#[cfg(feature = "gemini")]
pub use image::providers::{GeminiModel, GeminiProvider, GeminiProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{DesignStyle, RoomType, StyleCatalog};
    pub use crate::error::{RenovizError, Result};
    pub use crate::image::{EncodedImage, ImageEditor};
    pub use crate::orchestrator::Renovator;
    pub use crate::session::RenovationSession;

    #[cfg(feature = "gemini")]
    pub use crate::image::providers::GeminiProvider;
}
