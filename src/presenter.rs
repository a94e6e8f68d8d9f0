//! Before/after presentation of a session.

use crate::error::Result;
use crate::image::EncodedImage;
use crate::session::RenovationSession;
use std::path::{Path, PathBuf};

/// File name offered for the generated image.
pub const DOWNLOAD_FILE_NAME: &str = "renovated-design.png";

/// Text shown in the empty result pane.
pub const PLACEHOLDER_TEXT: &str = "Select a style and click Generate";

/// Text shown in the empty source pane.
pub const UPLOAD_PROMPT_TEXT: &str = "Upload a photo of your room to get started.";

/// Left-hand pane: the photo being renovated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePane<'a> {
    /// The uploaded photo, exactly as accepted.
    Image(&'a EncodedImage),
    /// No photo yet.
    UploadPrompt,
}

impl SourcePane<'_> {
    /// Text to draw in place of an image, if any.
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            Self::Image(_) => None,
            Self::UploadPrompt => Some(UPLOAD_PROMPT_TEXT),
        }
    }
}

/// Right-hand pane: the renovation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultPane<'a> {
    /// A request is in flight; nothing else is shown.
    Loading,
    /// The last generated image.
    Generated(&'a EncodedImage),
    /// Nothing generated yet.
    Placeholder,
}

impl ResultPane<'_> {
    /// Text to draw in place of an image, if any.
    pub fn caption(&self) -> Option<&'static str> {
        match self {
            Self::Placeholder => Some(PLACEHOLDER_TEXT),
            Self::Loading | Self::Generated(_) => None,
        }
    }
}

/// What a front end should draw for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    /// Source pane.
    pub source: SourcePane<'a>,
    /// Result pane.
    pub result: ResultPane<'a>,
    /// Dismissible error banner.
    pub error: Option<&'a str>,
    /// Whether the generate action is enabled.
    pub can_generate: bool,
}

impl<'a> SessionView<'a> {
    /// Derives the view from session state.
    pub fn of(session: &'a RenovationSession) -> Self {
        let loading = session.is_loading();

        let source = match session.source() {
            Some(image) => SourcePane::Image(image),
            None => SourcePane::UploadPrompt,
        };

        let result = match (loading, session.generated()) {
            (true, _) => ResultPane::Loading,
            (false, Some(image)) => ResultPane::Generated(image),
            (false, None) => ResultPane::Placeholder,
        };

        Self {
            source,
            result,
            error: session.error(),
            can_generate: !loading && session.source().is_some() && session.style().is_some(),
        }
    }

    /// Download action for the result, available once an image is shown.
    pub fn download(&self) -> Option<Download<'a>> {
        match self.result {
            ResultPane::Generated(image) => Some(Download { image }),
            _ => None,
        }
    }
}

/// The generated image offered as a file.
#[derive(Debug, Clone, Copy)]
pub struct Download<'a> {
    image: &'a EncodedImage,
}

impl Download<'_> {
    /// Suggested file name.
    pub fn file_name(&self) -> &'static str {
        DOWNLOAD_FILE_NAME
    }

    /// Bytes that end up in the file.
    pub fn bytes(&self) -> &[u8] {
        self.image.data()
    }

    /// Inline form, usable as a link target.
    pub fn data_url(&self) -> String {
        self.image.to_data_url()
    }

    /// Writes the image into `dir` under the download file name.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(DOWNLOAD_FILE_NAME);
        self.save_as(&path)?;
        Ok(path)
    }

    /// Writes the image to an explicit path.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.image.save(path)?;
        tracing::info!(path = %path.display(), bytes = self.image.size(), "saved renovation");
        Ok(())
    }
}
