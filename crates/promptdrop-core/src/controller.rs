//! Single-threaded reducer driving an [`UploadSession`].
//!
//! The host feeds [`Event`]s in dispatch order and executes the
//! [`Effect`]s each one returns:
//!
//! ```rust
//! # use promptdrop_core::{Constraints, Controller, Effect, Event, FileHandle};
//! let mut controller = Controller::new(Constraints::default());
//! let file = FileHandle::new("apple.png", "image/png", vec![0_u8; 16]);
//! for effect in controller.dispatch(Event::AddFiles(vec![file])) {
//!     match effect {
//!         Effect::StartProgress { .. } => { /* start a 100 ms timer */ }
//!         Effect::DecodePreview { .. } => { /* spawn the data URL encoder */ }
//!         _ => {}
//!     }
//! }
//! assert_eq!(controller.session().files.len(), 1);
//! ```
//!
//! Timers, preview tasks, and the model call all live in the host.
//! The controller only decides when they start and stop, and ignores
//! completions that arrive for files or epochs that no longer exist.

use crate::constraints::Constraints;
use crate::ingest::{self, PROGRESS_STEP};
use crate::session::{UploadSession, advance};
use crate::submit::{SubmitConfig, SubmitError, SubmitRequest};
use crate::types::{Epoch, FileHandle, FileId, PROGRESS_COMPLETE, Preview, UploadedFile};

/// Inputs to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The picker delivered a batch of files.
    AddFiles(Vec<FileHandle>),
    /// The user removed a file.
    RemoveFile(FileId),
    /// The prompt text changed.
    SetPrompt(String),
    /// The user asked for a model call.
    Submit,
    /// The user dismissed the result.
    Close,
    /// Clear everything.
    Reset,
    /// One period of a file's progress timer elapsed.
    ProgressTick(FileId),
    /// A preview task finished. `None` means decoding failed.
    PreviewDecoded {
        /// Epoch the task was started in.
        epoch: Epoch,
        /// File the preview belongs to.
        id: FileId,
        /// Data URL, or `None` on failure.
        preview: Option<String>,
    },
    /// The model call settled.
    SubmissionSettled {
        /// Epoch the call was started in.
        epoch: Epoch,
        /// Generated text or the failure.
        outcome: Result<String, SubmitError>,
    },
}

/// Work the host must perform after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a repeating [`PROGRESS_TICK`](crate::PROGRESS_TICK) timer
    /// that dispatches [`Event::ProgressTick`] for `id`.
    StartProgress {
        /// File to tick.
        id: FileId,
    },
    /// The file reached 100; its timer may be released.
    ProgressFinished {
        /// Completed file.
        id: FileId,
    },
    /// The file is gone; cancel its timer.
    CancelProgress {
        /// Removed file.
        id: FileId,
    },
    /// Produce a data URL for the file and dispatch
    /// [`Event::PreviewDecoded`].
    DecodePreview {
        /// Current epoch, to echo back.
        epoch: Epoch,
        /// File to decode.
        id: FileId,
        /// The file itself.
        file: FileHandle,
    },
    /// Call the model and dispatch [`Event::SubmissionSettled`].
    Generate(SubmitRequest),
    /// Part of a batch did not fit and was dropped.
    FilesDropped {
        /// Number of files dropped.
        count: usize,
    },
    /// The file list changed.
    FilesChanged,
    /// A file was removed by the user.
    FileRemoved(UploadedFile),
    /// The session was reset; drop any per-session host state such as
    /// picker messages.
    SessionCleared,
}

/// Owns one upload session and its bookkeeping.
#[derive(Debug, Clone)]
pub struct Controller {
    constraints: Constraints,
    submit: SubmitConfig,
    session: UploadSession,
    epoch: Epoch,
    next_id: u64,
}

impl Controller {
    /// A controller with an empty session.
    #[must_use]
    pub fn new(constraints: Constraints) -> Self {
        Self::with_submit_config(constraints, SubmitConfig::default())
    }

    /// A controller with explicit submission settings.
    #[must_use]
    pub fn with_submit_config(constraints: Constraints, submit: SubmitConfig) -> Self {
        Self {
            constraints,
            submit,
            session: UploadSession::default(),
            epoch: Epoch::default(),
            next_id: 0,
        }
    }

    /// Current session value.
    #[must_use]
    pub const fn session(&self) -> &UploadSession {
        &self.session
    }

    /// Constraints this controller enforces.
    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Current epoch.
    #[must_use]
    pub const fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Whether another file may be added.
    #[must_use]
    pub fn can_upload(&self) -> bool {
        self.session.can_upload(&self.constraints)
    }

    /// Whether `submit` would start a model call.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.session.can_submit()
    }

    /// Apply one event and return the effects it produced.
    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::AddFiles(batch) => self.add_files(batch),
            Event::RemoveFile(id) => self.remove_file(id),
            Event::SetPrompt(prompt) => {
                self.set_prompt(prompt);
                Vec::new()
            }
            Event::Submit => self.submit().map(Effect::Generate).into_iter().collect(),
            Event::Close => self.close(),
            Event::Reset => self.reset(),
            Event::ProgressTick(id) => self.tick(id),
            Event::PreviewDecoded { epoch, id, preview } => {
                self.apply_preview(epoch, id, preview);
                Vec::new()
            }
            Event::SubmissionSettled { epoch, outcome } => {
                self.settle(epoch, outcome);
                Vec::new()
            }
        }
    }

    /// Admit a batch, starting a progress timer and, for images, a
    /// preview task for every admitted file.
    pub fn add_files(&mut self, batch: Vec<FileHandle>) -> Vec<Effect> {
        let admission = ingest::admit(&self.session, &self.constraints, batch, &mut self.next_id);
        self.session = admission.session;

        let mut effects = Vec::with_capacity(admission.admitted.len() * 2 + 2);
        for id in admission.admitted.iter().copied() {
            if let Some(entry) = self.session.file(id)
                && entry.preview == Preview::Pending
            {
                effects.push(Effect::DecodePreview {
                    epoch: self.epoch,
                    id,
                    file: entry.file.clone(),
                });
            }
            effects.push(Effect::StartProgress { id });
        }
        if admission.dropped > 0 {
            effects.push(Effect::FilesDropped {
                count: admission.dropped,
            });
        }
        if !admission.admitted.is_empty() {
            effects.push(Effect::FilesChanged);
        }
        effects
    }

    /// Drop the entry with `id`. Unknown ids are a no-op.
    pub fn remove_file(&mut self, id: FileId) -> Vec<Effect> {
        let Some(removed) = self.session.file(id).cloned() else {
            return Vec::new();
        };
        let files = self
            .session
            .files
            .iter()
            .filter(|f| f.id != id)
            .cloned()
            .collect();
        self.session = self.session.with_files(files);

        let mut effects = Vec::with_capacity(3);
        if removed.progress < PROGRESS_COMPLETE {
            effects.push(Effect::CancelProgress { id });
        }
        effects.push(Effect::FileRemoved(removed));
        effects.push(Effect::FilesChanged);
        effects
    }

    /// Replace the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.session = self.session.with_prompt(prompt);
    }

    /// Replace the result text. A result ends loading.
    pub fn set_result(&mut self, result: Option<String>) {
        self.session = self.session.with_result(result);
    }

    /// Replace the loading flag. Starting to load clears the result.
    pub fn set_loading(&mut self, loading: bool) {
        self.session = self.session.with_loading(loading);
    }

    /// Start a submission if one is allowed.
    ///
    /// Returns `None` (and changes nothing) when [`can_submit`] is
    /// false, including while a previous submission is in flight.
    ///
    /// [`can_submit`]: Self::can_submit
    pub fn submit(&mut self) -> Option<SubmitRequest> {
        if !self.session.can_submit() {
            return None;
        }
        let file = self.session.files.first()?.file.clone();
        self.session = self.session.with_loading(true);
        Some(SubmitRequest {
            epoch: self.epoch,
            prompt: self.session.prompt.clone(),
            file,
            timeout: self.submit.timeout,
        })
    }

    /// Dismiss the result and clear the session.
    pub fn close(&mut self) -> Vec<Effect> {
        self.reset()
    }

    /// Clear prompt, result, error, and files, and start a new epoch.
    ///
    /// Every still-running progress timer is cancelled and any preview
    /// or model call in flight becomes stale.
    pub fn reset(&mut self) -> Vec<Effect> {
        let mut effects: Vec<Effect> = self
            .session
            .files
            .iter()
            .filter(|f| f.progress < PROGRESS_COMPLETE)
            .map(|f| Effect::CancelProgress { id: f.id })
            .collect();
        let had_files = !self.session.files.is_empty();

        self.session = UploadSession::default();
        self.epoch = self.epoch.next();

        if had_files {
            effects.push(Effect::FilesChanged);
        }
        effects.push(Effect::SessionCleared);
        effects
    }

    /// Advance a file's simulated progress by one step.
    ///
    /// Ticks for unknown or already complete files return
    /// [`Effect::CancelProgress`] so a leaked timer gets stopped.
    pub fn tick(&mut self, id: FileId) -> Vec<Effect> {
        let Some(entry) = self.session.file(id) else {
            return vec![Effect::CancelProgress { id }];
        };
        if entry.progress >= PROGRESS_COMPLETE {
            return vec![Effect::CancelProgress { id }];
        }

        let progress = advance(entry.progress, PROGRESS_STEP);
        let succeeded = progress >= PROGRESS_COMPLETE;
        self.session = self.session.with_file(id, |f| UploadedFile {
            progress,
            succeeded,
            ..f.clone()
        });

        if succeeded {
            vec![Effect::ProgressFinished { id }]
        } else {
            Vec::new()
        }
    }

    /// Apply a finished preview task, unless it is stale.
    pub fn apply_preview(&mut self, epoch: Epoch, id: FileId, preview: Option<String>) {
        if epoch != self.epoch {
            return;
        }
        let preview = preview.map_or(Preview::None, Preview::Ready);
        self.session = self.session.with_file(id, |f| UploadedFile {
            preview,
            ..f.clone()
        });
    }

    /// Apply the model call's outcome, unless it is stale.
    ///
    /// Blank text ends loading without a result.
    pub fn settle(&mut self, epoch: Epoch, outcome: Result<String, SubmitError>) {
        if epoch != self.epoch || !self.session.loading {
            return;
        }
        self.session = match outcome {
            Ok(text) if text.trim().is_empty() => self.session.with_loading(false),
            Ok(text) => self.session.with_result(Some(text)),
            Err(err) => self.session.with_loading(false).with_error(Some(err)),
        };
    }
}
