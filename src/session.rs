//! Input collection and the per-user renovation state machine.
//!
//! A [`RenovationSession`] holds everything one user is working on: the
//! source photo, the room and style selections, the last generated image and
//! the current error message. Front ends mutate it through the methods below
//! and render it through [`RenovationSession::view`].

use crate::catalog::{DesignStyle, RoomType};
use crate::error::{RenovizError, Result};
use crate::image::{guess_mime_type, EncodedImage};
use crate::orchestrator::Renovator;
use crate::presenter::SessionView;
use std::path::Path;

/// Largest accepted upload: 5 MB.
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Where the session is in the generate cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet, or input changed since the last request.
    #[default]
    Idle,
    /// Checking that image and style are present.
    Validating,
    /// Waiting on the image service.
    Requesting,
    /// The last request produced an image.
    Succeeded,
    /// The last request (or its validation) failed.
    Failed,
}

/// Inputs captured for one in-flight request.
#[derive(Debug, Clone)]
pub struct RenderJob {
    source: EncodedImage,
    room: RoomType,
    style: DesignStyle,
    generation: u64,
}

impl RenderJob {
    /// Input generation the job was started from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sends the captured inputs through `renovator`.
    pub async fn run(&self, renovator: &Renovator) -> Result<EncodedImage> {
        renovator
            .generate_renovation(Some(&self.source), self.room, Some(&self.style))
            .await
    }
}

/// State of one renovation session.
#[derive(Debug, Clone)]
pub struct RenovationSession {
    source: Option<EncodedImage>,
    generated: Option<EncodedImage>,
    room: RoomType,
    style: Option<DesignStyle>,
    phase: Phase,
    error: Option<String>,
    max_upload_bytes: u64,
    /// Bumped whenever the source photo is replaced or cleared.
    generation: u64,
}

impl Default for RenovationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RenovationSession {
    /// Creates an empty session with the default 5 MB upload limit.
    pub fn new() -> Self {
        Self::with_upload_limit(MAX_UPLOAD_BYTES)
    }

    /// Creates an empty session with a custom upload limit.
    pub fn with_upload_limit(max_upload_bytes: u64) -> Self {
        Self {
            source: None,
            generated: None,
            room: RoomType::default(),
            style: None,
            phase: Phase::Idle,
            error: None,
            max_upload_bytes,
            generation: 0,
        }
    }

    /// Stores `image` as the new source photo.
    ///
    /// Oversized images are rejected and the current source is kept. On
    /// success the previous result and error are cleared; room and style
    /// stay as they are so the same settings can be tried on a new photo.
    ///
    /// A request already in flight keeps the session loading; its outcome
    /// is discarded when it completes.
    pub fn accept_image(&mut self, image: EncodedImage) -> Result<()> {
        self.check_size(image.size() as u64)?;
        if !image.is_image() {
            let err = RenovizError::UnsupportedMedia(image.mime_type().to_string());
            self.error = Some(err.user_message());
            return Err(err);
        }

        tracing::debug!(
            image_bytes = image.size(),
            mime_type = image.mime_type(),
            "accepted source image"
        );
        self.source = Some(image);
        self.generated = None;
        self.error = None;
        self.supersede();
        Ok(())
    }

    /// Reads an image file from disk and accepts it.
    ///
    /// The size limit is checked against file metadata before reading.
    pub async fn accept_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        self.check_size(size)?;

        let data = tokio::fs::read(path).await?;

        let mime_type = guess_mime_type(path, &data);
        self.accept_image(EncodedImage::new(data, mime_type))
    }

    fn check_size(&mut self, size: u64) -> Result<()> {
        if size > self.max_upload_bytes {
            let err = RenovizError::FileTooLarge {
                size,
                limit: self.max_upload_bytes,
            };
            tracing::warn!(size, limit = self.max_upload_bytes, "upload rejected");
            self.error = Some(err.user_message());
            return Err(err);
        }
        Ok(())
    }

    /// Sets the room type.
    pub fn select_room(&mut self, room: RoomType) {
        self.room = room;
    }

    /// Sets the design style.
    pub fn select_style(&mut self, style: DesignStyle) {
        self.style = Some(style);
    }

    /// Clears source, result, style and error. The room type is kept.
    ///
    /// Like a new upload, this discards the outcome of any request in flight.
    pub fn reset(&mut self) {
        self.source = None;
        self.generated = None;
        self.style = None;
        self.error = None;
        self.supersede();
    }

    fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.phase != Phase::Requesting {
            self.phase = Phase::Idle;
        }
    }

    /// Clears the error message.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Runs one generate cycle against `renovator`.
    ///
    /// Validation failures never reach the service. Any failure is stored as
    /// the session error message and leaves source, selections and the
    /// previous result untouched. The returned error is the same failure, for
    /// callers that want more than the message.
    pub async fn generate(&mut self, renovator: &Renovator) -> Result<()> {
        let job = self.begin_request()?;
        let outcome = job.run(renovator).await;
        self.complete_request(&job, outcome)
    }

    /// Validates input and moves the session to [`Phase::Requesting`].
    ///
    /// Event-driven front ends call this, render the loading state, run the
    /// returned job, and hand its outcome to [`complete_request`](Self::complete_request).
    /// Only one job runs at a time: while one is in flight this returns
    /// [`RenovizError::Busy`] and leaves the session as it is.
    pub fn begin_request(&mut self) -> Result<RenderJob> {
        if self.is_loading() {
            return Err(RenovizError::Busy);
        }
        self.phase = Phase::Validating;
        let Some(source) = self.source.clone() else {
            return Err(self.fail(RenovizError::MissingInput("original image")));
        };
        let Some(style) = self.style.clone() else {
            return Err(self.fail(RenovizError::MissingInput("style")));
        };

        self.phase = Phase::Requesting;
        self.error = None;
        tracing::debug!(phase = ?self.phase, "session state changed");

        Ok(RenderJob {
            source,
            room: self.room,
            style,
            generation: self.generation,
        })
    }

    /// Applies the outcome of `job`, started with [`begin_request`](Self::begin_request).
    ///
    /// If the source photo was replaced or the session reset after the job
    /// started, the outcome is dropped and the session returns to
    /// [`Phase::Idle`] with its current source and no result.
    pub fn complete_request(
        &mut self,
        job: &RenderJob,
        outcome: Result<EncodedImage>,
    ) -> Result<()> {
        if job.generation != self.generation {
            tracing::debug!(
                job_generation = job.generation,
                generation = self.generation,
                succeeded = outcome.is_ok(),
                "discarding outcome of superseded request"
            );
            if self.phase == Phase::Requesting {
                self.phase = Phase::Idle;
            }
            return Ok(());
        }

        match outcome {
            Ok(image) => {
                self.generated = Some(image);
                self.error = None;
                self.phase = Phase::Succeeded;
                tracing::debug!(phase = ?self.phase, "session state changed");
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, err: RenovizError) -> RenovizError {
        self.error = Some(err.user_message());
        self.phase = Phase::Failed;
        tracing::debug!(phase = ?self.phase, error = %err, "session state changed");
        err
    }

    /// Current source photo.
    pub fn source(&self) -> Option<&EncodedImage> {
        self.source.as_ref()
    }

    /// Last generated image.
    pub fn generated(&self) -> Option<&EncodedImage> {
        self.generated.as_ref()
    }

    /// Selected room type.
    pub fn room(&self) -> RoomType {
        self.room
    }

    /// Selected style.
    pub fn style(&self) -> Option<&DesignStyle> {
        self.style.as_ref()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns true while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Requesting
    }

    /// Current error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Returns the presentation of the current state.
    pub fn view(&self) -> SessionView<'_> {
        SessionView::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::{FakeEditor, RecordedCall, Script};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<RecordedCall>>>;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn jpeg_of_size(len: usize) -> EncodedImage {
        let mut data = vec![0u8; len];
        data[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        EncodedImage::new(data, "image/jpeg")
    }

    fn scandinavian() -> DesignStyle {
        DesignStyle::new(
            "scandinavian",
            "Scandinavian",
            "light wood, white walls, minimalism",
        )
    }

    fn png_renovator() -> (Renovator, Calls) {
        let editor = FakeEditor::new(Script::Image(PNG.to_vec(), "image/png"));
        let calls = editor.calls.clone();
        (Renovator::new(editor), calls)
    }

    #[test]
    fn test_oversized_upload_keeps_existing_source() {
        let mut session = RenovationSession::new();
        let first = jpeg_of_size(1024);
        session.accept_image(first.clone()).unwrap();

        let err = session
            .accept_image(jpeg_of_size(MAX_UPLOAD_BYTES as usize + 1))
            .unwrap_err();

        assert!(matches!(err, RenovizError::FileTooLarge { .. }));
        assert_eq!(session.source(), Some(&first));
        assert_eq!(
            session.error(),
            Some("File size too large. Please upload an image under 5MB.")
        );
    }

    #[test]
    fn test_upload_at_limit_is_accepted() {
        let mut session = RenovationSession::new();
        session
            .accept_image(jpeg_of_size(MAX_UPLOAD_BYTES as usize))
            .unwrap();
        assert!(session.source().is_some());
    }

    #[test]
    fn test_non_image_upload_rejected() {
        let mut session = RenovationSession::new();
        let err = session
            .accept_image(EncodedImage::new(b"hello".to_vec(), "text/plain"))
            .unwrap_err();
        assert!(matches!(err, RenovizError::UnsupportedMedia(_)));
        assert!(session.source().is_none());
    }

    #[tokio::test]
    async fn test_upload_clears_result_and_error_but_keeps_selections() {
        let (renovator, _) = png_renovator();
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_room(RoomType::Bathroom);
        session.select_style(scandinavian());
        session.generate(&renovator).await.unwrap();
        assert!(session.generated().is_some());

        let _ = session.accept_image(jpeg_of_size(MAX_UPLOAD_BYTES as usize + 10));
        assert!(session.error().is_some());

        session.accept_image(jpeg_of_size(4096)).unwrap();
        assert!(session.generated().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.room(), RoomType::Bathroom);
        assert_eq!(session.style(), Some(&scandinavian()));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_changing_style_keeps_generated_image() {
        let (renovator, _) = png_renovator();
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_style(scandinavian());
        session.generate(&renovator).await.unwrap();

        session.select_style(DesignStyle::new("industrial", "Industrial", "brick"));
        session.select_room(RoomType::Bedroom);
        assert!(session.generated().is_some());
    }

    #[tokio::test]
    async fn test_generate_without_image() {
        let (renovator, calls) = png_renovator();
        let mut session = RenovationSession::new();
        session.select_style(scandinavian());

        assert!(session.generate(&renovator).await.is_err());
        assert_eq!(session.error(), Some("Please upload an original image first."));
        assert_eq!(session.phase(), Phase::Failed);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_without_style() {
        let (renovator, calls) = png_renovator();
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2 * 1024 * 1024)).unwrap();

        let err = session.generate(&renovator).await.unwrap_err();
        assert!(matches!(err, RenovizError::MissingInput("style")));
        assert_eq!(session.error(), Some("Please select a design style below."));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_clears_prior_error() {
        let (renovator, _) = png_renovator();
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        let _ = session.generate(&renovator).await;
        assert!(session.error().is_some());

        session.select_style(scandinavian());
        session.generate(&renovator).await.unwrap();

        assert!(session.error().is_none());
        assert_eq!(session.phase(), Phase::Succeeded);
        let generated = session.generated().unwrap();
        assert_eq!(generated.data(), &PNG);
        assert_eq!(generated.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_result_and_inputs() {
        let (ok, _) = png_renovator();
        let empty = Renovator::new(FakeEditor::new(Script::NoImage));

        let mut session = RenovationSession::new();
        let source = jpeg_of_size(2048);
        session.accept_image(source.clone()).unwrap();
        session.select_room(RoomType::Kitchen);
        session.select_style(scandinavian());
        session.generate(&ok).await.unwrap();
        let previous = session.generated().cloned();

        let err = session.generate(&empty).await.unwrap_err();
        assert!(matches!(err, RenovizError::NoImageReturned));
        assert_eq!(session.error(), Some("The model did not return an image."));
        assert_eq!(session.generated().cloned(), previous);
        assert_eq!(session.source(), Some(&source));
        assert_eq!(session.room(), RoomType::Kitchen);
        assert!(session.style().is_some());
    }

    #[tokio::test]
    async fn test_service_message_becomes_error() {
        let failing = Renovator::new(FakeEditor::new(Script::Fail(503, "The model is overloaded.")));
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_style(scandinavian());

        assert!(session.generate(&failing).await.is_err());
        assert_eq!(session.error(), Some("The model is overloaded."));

        session.dismiss_error();
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_reset_keeps_room() {
        let (renovator, _) = png_renovator();
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_room(RoomType::BuildingExterior);
        session.select_style(scandinavian());
        session.generate(&renovator).await.unwrap();

        session.reset();

        assert!(session.source().is_none());
        assert!(session.generated().is_none());
        assert!(session.style().is_none());
        assert!(session.error().is_none());
        assert_eq!(session.room(), RoomType::BuildingExterior);
    }

    #[tokio::test]
    async fn test_upload_during_request_discards_old_outcome() {
        let (renovator, calls) = png_renovator();
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_style(scandinavian());

        let job = session.begin_request().unwrap();
        let replacement = jpeg_of_size(4096);
        session.accept_image(replacement.clone()).unwrap();
        assert_eq!(session.phase(), Phase::Requesting);
        assert!(session.is_loading());

        let outcome = job.run(&renovator).await;
        assert!(outcome.is_ok());
        session.complete_request(&job, outcome).unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert!(session.generated().is_none());
        assert_eq!(session.source(), Some(&replacement));
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn test_reset_during_request_discards_old_failure() {
        let failing = Renovator::new(FakeEditor::new(Script::Fail(500, "boom")));
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_style(scandinavian());

        let job = session.begin_request().unwrap();
        session.reset();
        assert!(session.is_loading());

        let outcome = job.run(&failing).await;
        assert!(outcome.is_err());
        session.complete_request(&job, outcome).unwrap();

        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.error().is_none());
        assert!(session.source().is_none());
    }

    #[test]
    fn test_begin_request_while_loading_is_busy() {
        let mut session = RenovationSession::new();
        session.accept_image(jpeg_of_size(2048)).unwrap();
        session.select_style(scandinavian());

        let first = session.begin_request().unwrap();
        let err = session.begin_request().unwrap_err();
        assert!(matches!(err, RenovizError::Busy));
        assert_eq!(session.phase(), Phase::Requesting);
        assert!(session.error().is_none());

        session
            .complete_request(&first, Ok(EncodedImage::new(PNG.to_vec(), "image/png")))
            .unwrap();
        assert_eq!(session.phase(), Phase::Succeeded);
        assert!(session.generated().is_some());
    }

    #[tokio::test]
    async fn test_accept_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.png");
        let bytes: Vec<u8> = PNG.iter().copied().chain(0u8..200).collect();
        std::fs::write(&path, &bytes).unwrap();

        let mut session = RenovationSession::new();
        session.accept_file(&path).await.unwrap();

        let source = session.source().unwrap();
        assert_eq!(source.mime_type(), "image/png");
        assert_eq!(source.data(), bytes.as_slice());
    }

    #[tokio::test]
    async fn test_accept_file_checks_size_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpg");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let mut session = RenovationSession::with_upload_limit(1024);
        let err = session.accept_file(&path).await.unwrap_err();
        assert!(matches!(err, RenovizError::FileTooLarge { size: 2048, limit: 1024 }));
        assert!(session.source().is_none());
    }
}
