//! The upload session value and its derived read-model.
//!
//! [`UploadSession`] is never mutated in place by the controller: every
//! transition builds a new value through the `with_*` methods, so a
//! host that stores the session in a reactive cell sees each change as
//! a fresh value.

use serde::Serialize;

use crate::constraints::Constraints;
use crate::submit::SubmitError;
use crate::types::{FileId, FileStage, PROGRESS_COMPLETE, UploadedFile};

/// Complete state of one widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadSession {
    /// Admitted files in selection order.
    pub files: Vec<UploadedFile>,
    /// Prompt text sent with the first file.
    pub prompt: String,
    /// Text returned by the last successful submission.
    pub result: Option<String>,
    /// Whether a submission is in flight.
    pub loading: bool,
    /// Why the last submission failed, cleared on the next submit.
    pub last_error: Option<SubmitError>,
}

impl UploadSession {
    /// Look up a file by id.
    #[must_use]
    pub fn file(&self, id: FileId) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Whether another file may be added.
    #[must_use]
    pub fn can_upload(&self, constraints: &Constraints) -> bool {
        !constraints.disabled && self.files.len() < constraints.max_files
    }

    /// Number of files not flagged as errored.
    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        self.files.iter().filter(|f| !f.errored).count()
    }

    /// Whether any file is still in its simulated upload.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.files.iter().any(UploadedFile::is_uploading)
    }

    /// Whether `submit` would start a model call.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.files.is_empty() && !self.is_uploading()
    }

    /// Whether the remove buttons should be enabled.
    #[must_use]
    pub fn can_remove(&self, constraints: &Constraints) -> bool {
        !constraints.disabled && !self.is_uploading()
    }

    /// A copy with `files` replaced.
    #[must_use]
    pub fn with_files(&self, files: Vec<UploadedFile>) -> Self {
        Self {
            files,
            ..self.clone()
        }
    }

    /// A copy with one file replaced by `update(file)`.
    ///
    /// Returns an unchanged copy when `id` is not present.
    #[must_use]
    pub fn with_file(&self, id: FileId, update: impl FnOnce(&UploadedFile) -> UploadedFile) -> Self {
        let mut update = Some(update);
        let files = self
            .files
            .iter()
            .map(|f| match update.take_if(|_| f.id == id) {
                Some(update) => update(f),
                None => f.clone(),
            })
            .collect();
        self.with_files(files)
    }

    /// A copy with the prompt replaced.
    #[must_use]
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..self.clone()
        }
    }

    /// A copy with the result replaced.
    ///
    /// Setting a result ends loading, so a result is never visible
    /// while a submission is in flight.
    #[must_use]
    pub fn with_result(&self, result: Option<String>) -> Self {
        Self {
            loading: if result.is_some() { false } else { self.loading },
            result,
            ..self.clone()
        }
    }

    /// A copy with the loading flag replaced.
    ///
    /// Starting to load clears any previous result and error.
    #[must_use]
    pub fn with_loading(&self, loading: bool) -> Self {
        if loading {
            Self {
                loading,
                result: None,
                last_error: None,
                ..self.clone()
            }
        } else {
            Self {
                loading,
                ..self.clone()
            }
        }
    }

    /// A copy with the last error replaced.
    #[must_use]
    pub fn with_error(&self, last_error: Option<SubmitError>) -> Self {
        Self {
            last_error,
            ..self.clone()
        }
    }

    /// Serializable snapshot of everything a renderer needs.
    #[must_use]
    pub fn view(&self, constraints: &Constraints) -> SessionView {
        SessionView {
            files: self
                .files
                .iter()
                .map(|f| FileView {
                    id: f.id,
                    name: f.file.name().to_owned(),
                    mime: f.file.mime().to_owned(),
                    size: f.file.size(),
                    progress: f.progress,
                    stage: f.stage(),
                    has_preview: f.preview.url().is_some(),
                    succeeded: f.succeeded,
                    errored: f.errored,
                })
                .collect(),
            prompt: self.prompt.clone(),
            result: self.result.clone(),
            loading: self.loading,
            error: self.last_error.as_ref().map(ToString::to_string),
            can_upload: self.can_upload(constraints),
            can_submit: self.can_submit(),
            can_remove: self.can_remove(constraints),
            is_uploading: self.is_uploading(),
            uploaded_count: self.uploaded_count(),
            max_files: constraints.max_files,
        }
    }
}

/// Per-file part of [`SessionView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileView {
    /// File identity.
    pub id: FileId,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime: String,
    /// Size in bytes.
    pub size: u64,
    /// Simulated progress, 0 to 100.
    pub progress: u8,
    /// Lifecycle stage.
    pub stage: FileStage,
    /// Whether a preview image is available.
    pub has_preview: bool,
    /// Whether the simulated upload finished.
    pub succeeded: bool,
    /// Reserved validation flag.
    pub errored: bool,
}

/// Derived read-model of a session, without file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Files in selection order.
    pub files: Vec<FileView>,
    /// Prompt text.
    pub prompt: String,
    /// Model output, if any.
    pub result: Option<String>,
    /// Whether a submission is in flight.
    pub loading: bool,
    /// Last submission failure, rendered.
    pub error: Option<String>,
    /// See [`UploadSession::can_upload`].
    pub can_upload: bool,
    /// See [`UploadSession::can_submit`].
    pub can_submit: bool,
    /// See [`UploadSession::can_remove`].
    pub can_remove: bool,
    /// See [`UploadSession::is_uploading`].
    pub is_uploading: bool,
    /// See [`UploadSession::uploaded_count`].
    pub uploaded_count: usize,
    /// Configured file cap.
    pub max_files: usize,
}

impl SessionView {
    /// Footer line such as `1/3 files uploaded`.
    #[must_use]
    pub fn count_label(&self) -> String {
        format!("{}/{} files uploaded", self.uploaded_count, self.max_files)
    }
}

/// Progress after one simulation tick, clamped to 100.
#[must_use]
pub const fn advance(progress: u8, step: u8) -> u8 {
    let next = progress.saturating_add(step);
    if next > PROGRESS_COMPLETE {
        PROGRESS_COMPLETE
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileHandle;

    fn entry(id: u64, progress: u8) -> UploadedFile {
        let mut f = UploadedFile::admitted(
            FileId(id),
            FileHandle::new(format!("f{id}.pdf"), "application/pdf", vec![0_u8; 8]),
        );
        f.progress = progress;
        f.succeeded = progress >= PROGRESS_COMPLETE;
        f
    }

    fn session(files: Vec<UploadedFile>) -> UploadSession {
        UploadSession {
            files,
            ..UploadSession::default()
        }
    }

    #[test]
    fn cannot_submit_empty_session() {
        assert!(!UploadSession::default().can_submit());
    }

    #[test]
    fn cannot_submit_while_any_file_is_progressing() {
        let s = session(vec![entry(1, 100), entry(2, 95)]);
        assert!(s.is_uploading());
        assert!(!s.can_submit());
    }

    #[test]
    fn cannot_submit_while_loading() {
        let s = session(vec![entry(1, 100)]).with_loading(true);
        assert!(!s.can_submit());
    }

    #[test]
    fn can_submit_when_all_files_complete() {
        assert!(session(vec![entry(1, 100)]).can_submit());
    }

    #[test]
    fn can_upload_respects_cap_and_disabled() {
        let c = Constraints {
            max_files: 2,
            ..Constraints::default()
        };
        assert!(session(vec![entry(1, 0)]).can_upload(&c));
        assert!(!session(vec![entry(1, 0), entry(2, 0)]).can_upload(&c));

        let disabled = Constraints {
            disabled: true,
            ..c
        };
        assert!(!UploadSession::default().can_upload(&disabled));
    }

    #[test]
    fn uploaded_count_skips_errored() {
        let mut bad = entry(2, 100);
        bad.errored = true;
        assert_eq!(session(vec![entry(1, 100), bad]).uploaded_count(), 1);
    }

    #[test]
    fn with_file_touches_only_the_target() {
        let s = session(vec![entry(1, 10), entry(2, 10)]);
        let next = s.with_file(FileId(2), |f| UploadedFile {
            progress: 15,
            ..f.clone()
        });
        assert_eq!(next.files[0].progress, 10);
        assert_eq!(next.files[1].progress, 15);
        assert_eq!(s.files[1].progress, 10, "original value is untouched");
    }

    #[test]
    fn with_file_unknown_id_is_identity() {
        let s = session(vec![entry(1, 10)]);
        assert_eq!(s.with_file(FileId(9), |_| entry(9, 50)), s);
    }

    #[test]
    fn result_ends_loading_and_loading_clears_result() {
        let loading = UploadSession::default().with_loading(true);
        let done = loading.with_result(Some("text".into()));
        assert!(!done.loading);
        assert_eq!(done.result.as_deref(), Some("text"));

        let again = done.with_loading(true);
        assert!(again.result.is_none());
    }

    #[test]
    fn advance_clamps_at_complete() {
        assert_eq!(advance(0, 5), 5);
        assert_eq!(advance(95, 5), 100);
        assert_eq!(advance(98, 5), 100);
        assert_eq!(advance(100, 5), 100);
        assert_eq!(advance(250, 10), 100);
    }

    #[test]
    fn view_reports_derived_flags() {
        let view = session(vec![entry(1, 40)]).view(&Constraints::default());
        assert!(view.is_uploading);
        assert!(!view.can_submit);
        assert!(!view.can_upload);
        assert_eq!(view.count_label(), "1/1 files uploaded");
        assert_eq!(view.files[0].stage, FileStage::Progressing);
    }
}
