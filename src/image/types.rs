//! Core image types: formats, encoded images, and edit results.

use crate::error::{RenovizError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// MIME type assumed for uploads whose type cannot be determined.
pub const DEFAULT_UPLOAD_MIME: &str = "image/jpeg";

/// MIME type assumed for service results that omit their type.
pub const DEFAULT_RESULT_MIME: &str = "image/png";

/// Well-known image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
    /// GIF format.
    Gif,
    /// HEIC/HEIF format (phone cameras).
    Heic,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Heic => "image/heic",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            "heic" | "heif" => Some(Self::Heic),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        // HEIC: ....ftypheic / ftypheix / ftypmif1
        if &data[4..8] == b"ftyp" && matches!(&data[8..12], b"heic" | b"heix" | b"mif1") {
            return Some(Self::Heic);
        }

        None
    }
}

/// Returns the MIME type for a file path, from its extension or, failing
/// that, from the leading bytes of its content.
pub fn guess_mime_type(path: &Path, head: &[u8]) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .or_else(|| ImageFormat::from_magic_bytes(head))
        .map(|f| f.mime_type())
        .unwrap_or(DEFAULT_UPLOAD_MIME)
}

/// Image bytes together with their MIME type.
///
/// This is the self-contained representation used for both the uploaded
/// source photo and the generated renovation. It converts losslessly to and
/// from a `data:` URL.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: Vec<u8>,
    mime_type: String,
}

impl EncodedImage {
    /// Creates an image from raw bytes and a MIME type.
    ///
    /// A blank MIME type is replaced by `image/jpeg`.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            DEFAULT_UPLOAD_MIME.to_string()
        } else {
            mime_type.trim().to_string()
        };
        Self { data, mime_type }
    }

    /// Parses a `data:<mime>;base64,<payload>` URL.
    ///
    /// A bare base64 payload (no `data:` prefix) is also accepted and gets the
    /// default upload MIME type. Whitespace inside the payload and missing
    /// padding are tolerated.
    pub fn from_data_url(input: &str) -> Result<Self> {
        let (mime_type, payload) = split_data_url(input);
        let data = decode_base64_lenient(payload)
            .map_err(|e| RenovizError::Decode(e.to_string()))?;
        Ok(Self::new(data, mime_type.unwrap_or(DEFAULT_UPLOAD_MIME)))
    }

    /// Raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// MIME type, e.g. `image/png`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the known format matching the MIME type, if any.
    pub fn format(&self) -> Option<ImageFormat> {
        self.mime_type
            .strip_prefix("image/")
            .and_then(ImageFormat::from_extension)
    }

    /// Returns true if the MIME type is in the `image/*` family.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// Writes the image bytes, unchanged, to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
}

/// The result of one image edit call.
#[derive(Debug, Clone)]
#[must_use = "edited image should be saved or processed"]
pub struct EditedImage {
    /// Returned image.
    pub image: EncodedImage,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

/// Splits a data URL into its MIME type (if present) and base64 payload.
fn split_data_url(input: &str) -> (Option<&str>, &str) {
    let input = input.trim();
    let Some(rest) = input.strip_prefix("data:") else {
        return (None, input);
    };
    match rest.split_once(',') {
        Some((header, payload)) => {
            let mime = header.split(';').next().map(str::trim).filter(|m| !m.is_empty());
            (mime, payload)
        }
        None => (None, rest),
    }
}

/// Decodes a base64 string that may be imperfectly formatted.
///
/// Strips embedded whitespace and accepts missing padding.
pub(crate) fn decode_base64_lenient(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD.decode(&cleaned)
}
