//! Shared types for the promptdrop upload session.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Progress value of a file whose simulated upload has finished.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Identity of an admitted file within one controller.
///
/// Assigned on admission from a monotonic counter, so ids are never
/// reused, even across [`reset`](crate::Controller::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Session generation counter.
///
/// Bumped on every reset. Async work (preview decoding, the model
/// call) is tagged with the epoch it was started in, and completions
/// from an older epoch are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The epoch that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A selected file as handed over by the picker.
///
/// The byte content is shared, so cloning a handle (into an effect, a
/// preview task, or the submission request) never copies the file.
#[derive(Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    mime: String,
    content: Arc<[u8]>,
}

impl FileHandle {
    /// Create a handle from a file name, MIME type, and its bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            content: content.into(),
        }
    }

    /// File name including extension.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type, e.g. `image/png`.
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Raw file content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Whether the MIME type is an `image/*` type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime
            .split_once('/')
            .is_some_and(|(kind, sub)| kind.eq_ignore_ascii_case("image") && !sub.is_empty())
    }
}

// Content is left out: files can be tens of megabytes.
impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.content.len())
            .finish()
    }
}

/// Preview state of an admitted file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    /// Not an image, or decoding failed.
    #[default]
    None,
    /// Image file whose data URL is still being produced.
    Pending,
    /// `data:` URL ready to be used as an `<img src>`.
    Ready(String),
}

impl Preview {
    /// The data URL, if one is ready.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Ready(url) => Some(url),
            Self::None | Self::Pending => None,
        }
    }
}

/// Lifecycle stage of one file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStage {
    /// Just admitted, progress is 0.
    Admitted,
    /// Simulated upload under way.
    Progressing,
    /// Progress reached 100 and the entry is marked succeeded.
    Complete,
}

/// One entry in the session's file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Identity assigned on admission.
    pub id: FileId,
    /// The file as received from the picker.
    pub file: FileHandle,
    /// Image preview state.
    pub preview: Preview,
    /// Simulated upload progress, 0 to 100.
    pub progress: u8,
    /// Set once progress reaches 100.
    pub succeeded: bool,
    /// Reserved for per-file validation failures; no current path sets it.
    pub errored: bool,
}

impl UploadedFile {
    /// A freshly admitted entry at progress 0.
    #[must_use]
    pub fn admitted(id: FileId, file: FileHandle) -> Self {
        let preview = if file.is_image() {
            Preview::Pending
        } else {
            Preview::None
        };
        Self {
            id,
            file,
            preview,
            progress: 0,
            succeeded: false,
            errored: false,
        }
    }

    /// Whether the simulated upload is still running.
    #[must_use]
    pub const fn is_uploading(&self) -> bool {
        self.progress < PROGRESS_COMPLETE && !self.errored
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> FileStage {
        match self.progress {
            0 => FileStage::Admitted,
            p if p >= PROGRESS_COMPLETE => FileStage::Complete,
            _ => FileStage::Progressing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str, mime: &str) -> FileHandle {
        FileHandle::new(name, mime, vec![1_u8, 2, 3])
    }

    #[test]
    fn image_detection_uses_mime_kind() {
        assert!(handle("a.png", "image/png").is_image());
        assert!(handle("a.JPG", "IMAGE/JPEG").is_image());
        assert!(!handle("a.pdf", "application/pdf").is_image());
        assert!(!handle("a", "image/").is_image());
        assert!(!handle("a", "").is_image());
    }

    #[test]
    fn admitted_image_starts_with_pending_preview() {
        let file = UploadedFile::admitted(FileId(1), handle("a.png", "image/png"));
        assert_eq!(file.preview, Preview::Pending);
        assert_eq!(file.progress, 0);
        assert_eq!(file.stage(), FileStage::Admitted);
        assert!(file.is_uploading());
    }

    #[test]
    fn admitted_document_has_no_preview() {
        let file = UploadedFile::admitted(FileId(1), handle("a.pdf", "application/pdf"));
        assert_eq!(file.preview, Preview::None);
    }

    #[test]
    fn stage_follows_progress() {
        let mut file = UploadedFile::admitted(FileId(1), handle("a.pdf", "application/pdf"));
        file.progress = 45;
        assert_eq!(file.stage(), FileStage::Progressing);
        file.progress = PROGRESS_COMPLETE;
        assert_eq!(file.stage(), FileStage::Complete);
        assert!(!file.is_uploading());
    }

    #[test]
    fn errored_file_is_not_uploading() {
        let mut file = UploadedFile::admitted(FileId(1), handle("a.pdf", "application/pdf"));
        file.errored = true;
        assert!(!file.is_uploading());
    }

    #[test]
    fn debug_omits_content() {
        let rendered = format!("{:?}", handle("a.png", "image/png"));
        assert!(rendered.contains("size: 3"), "{rendered}");
        assert!(!rendered.contains("content"), "{rendered}");
    }

    #[test]
    fn epoch_advances() {
        assert_eq!(Epoch::default().next(), Epoch(1));
    }
}
