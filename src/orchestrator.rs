//! Render request orchestration: validate, instruct, call the editor once.

use crate::catalog::{DesignStyle, RoomType};
use crate::error::{RenovizError, Result};
use crate::image::{EditedImage, EncodedImage, ImageEditor};
use crate::prompt::build_instruction;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Issues renovation requests against an [`ImageEditor`].
///
/// At most one request runs at a time; an overlapping call fails with
/// [`RenovizError::Busy`] before reaching the editor. Failed requests are
/// never retried.
pub struct Renovator {
    editor: Arc<dyn ImageEditor>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Renovator {
    /// Wraps an editor.
    pub fn new(editor: impl ImageEditor + 'static) -> Self {
        Self::from_arc(Arc::new(editor))
    }

    /// Wraps a shared editor.
    pub fn from_arc(editor: Arc<dyn ImageEditor>) -> Self {
        Self {
            editor,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The underlying editor.
    pub fn editor(&self) -> &dyn ImageEditor {
        self.editor.as_ref()
    }

    /// Returns true while a request is running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Renders `source` as `room` in `style`, returning the generated image.
    pub async fn generate_renovation(
        &self,
        source: Option<&EncodedImage>,
        room: RoomType,
        style: Option<&DesignStyle>,
    ) -> Result<EncodedImage> {
        self.generate_with_metadata(source, room, style)
            .await
            .map(|edited| edited.image)
    }

    /// Like [`generate_renovation`](Self::generate_renovation), keeping the
    /// service metadata.
    pub async fn generate_with_metadata(
        &self,
        source: Option<&EncodedImage>,
        room: RoomType,
        style: Option<&DesignStyle>,
    ) -> Result<EditedImage> {
        let source = source.ok_or(RenovizError::MissingInput("original image"))?;
        let style = style.ok_or(RenovizError::MissingInput("style"))?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("rejecting overlapping renovation request");
            return Err(RenovizError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let instruction = build_instruction(room, style);

        tracing::info!(
            editor = %self.editor.kind(),
            room = %room,
            style = %style.id,
            image_bytes = source.size(),
            mime_type = source.mime_type(),
            "requesting renovation"
        );

        match self
            .editor
            .edit(&instruction, source.data(), source.mime_type())
            .await
        {
            Ok(edited) => {
                tracing::info!(
                    image_bytes = edited.image.size(),
                    mime_type = edited.image.mime_type(),
                    duration_ms = edited.metadata.duration_ms,
                    "renovation generated"
                );
                Ok(edited)
            }
            Err(e) => {
                tracing::warn!(error = %e, "renovation failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for Renovator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renovator")
            .field("editor", &self.editor.name())
            .field("in_flight", &self.is_busy())
            .finish()
    }
}
