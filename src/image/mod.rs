//! Image types and the editing service seam.

mod provider;
pub mod providers;
mod types;

pub use provider::{EditorKind, ImageEditor};
pub use types::{
    guess_mime_type, EditedImage, EncodedImage, GenerationMetadata, ImageFormat,
    DEFAULT_RESULT_MIME, DEFAULT_UPLOAD_MIME,
};
