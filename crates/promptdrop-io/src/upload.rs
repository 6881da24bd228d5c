//! The upload hook: owns a [`Controller`] and runs its effects.
//!
//! [`use_file_upload`] keeps the controller in a Dioxus signal, so every
//! dispatch replaces the session and re-renders its readers. Effects are
//! executed here:
//!
//! - each admitted file gets its own progress task, ticking every
//!   [`PROGRESS_TICK`] until the controller reports it finished or the
//!   task is cancelled on removal or reset;
//! - image previews are encoded in a spawned task so admitting the next
//!   file never waits on them;
//! - the model call runs in a spawned task under the configured timeout.
//!
//! Preview and model completions carry the epoch they started in; the
//! controller drops them if a reset happened in between.

use std::collections::HashMap;

use dioxus::core::Task;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use promptdrop_core::{
    Constraints, Controller, Effect, Event, FileHandle, FileId, PROGRESS_TICK, SubmitConfig,
    SubmitError, SubmitRequest, UploadSession, UploadedFile, preview,
};
use promptdrop_gemini::{GeminiClient, GeminiConfig};

use crate::timeout::{millis, with_timeout};

/// Configuration for [`use_file_upload`].
#[derive(Clone, PartialEq, Default)]
pub struct UploadOptions {
    /// Count, size, and type limits.
    pub constraints: Constraints,
    /// Model call settings.
    pub submit: SubmitConfig,
    /// Model connection. `None` makes every submission fail visibly.
    pub gemini: Option<GeminiConfig>,
    /// Fired with the full file list whenever it changes.
    pub on_change: Option<EventHandler<Vec<UploadedFile>>>,
    /// Fired with the removed entry when the user removes a file.
    pub on_remove: Option<EventHandler<UploadedFile>>,
    /// Files admitted right after mount, as if picked by the user.
    pub initial_files: Vec<FileHandle>,
}

impl UploadOptions {
    /// The event that admits `initial_files`, if there are any.
    fn seed(&self) -> Option<Event> {
        (!self.initial_files.is_empty()).then(|| Event::AddFiles(self.initial_files.clone()))
    }
}

/// Handle returned by [`use_file_upload`].
///
/// `Copy`, so it can be moved into any number of event handlers.
#[derive(Clone, Copy, PartialEq)]
pub struct UploadHandle {
    controller: Signal<Controller>,
    tickers: Signal<HashMap<FileId, Task>>,
    client: Signal<Option<GeminiClient>>,
    rejections: Signal<Vec<String>>,
    on_change: Option<EventHandler<Vec<UploadedFile>>>,
    on_remove: Option<EventHandler<UploadedFile>>,
}

/// Create an upload session for the calling component.
///
/// The options are read once, on first render. Timers and tasks are
/// cancelled when the component unmounts.
pub fn use_file_upload(options: UploadOptions) -> UploadHandle {
    let controller =
        use_signal(|| Controller::with_submit_config(options.constraints.clone(), options.submit));
    let tickers = use_signal(HashMap::new);
    let client = use_signal(|| {
        let config = options.gemini.clone()?;
        match GeminiClient::new(config) {
            Ok(client) => {
                log::info!("model calls go to {}", client.model());
                Some(client)
            }
            Err(e) => {
                log::warn!("submissions are disabled: {e}");
                None
            }
        }
    });

    let rejections = use_signal(Vec::new);

    let handle = UploadHandle {
        controller,
        tickers,
        client,
        rejections,
        on_change: options.on_change,
        on_remove: options.on_remove,
    };

    // Runs after the first render; the seed is taken so it fires once.
    let mut seed = options.seed();
    use_effect(move || {
        if let Some(event) = seed.take() {
            handle.dispatch(event);
        }
    });
    use_drop(move || handle.cancel_all());
    handle
}

impl UploadHandle {
    /// Current session. Subscribes the caller to changes.
    #[must_use]
    pub fn session(&self) -> UploadSession {
        self.controller.read().session().clone()
    }

    /// Constraints the session enforces.
    #[must_use]
    pub fn constraints(&self) -> Constraints {
        self.controller.peek().constraints().clone()
    }

    /// Whether another file may be added. Subscribes the caller.
    #[must_use]
    pub fn can_upload(&self) -> bool {
        self.controller.read().can_upload()
    }

    /// Picker messages for the last batch. Subscribes the caller.
    #[must_use]
    pub fn rejections(&self) -> Vec<String> {
        self.rejections.read().clone()
    }

    /// Replace the picker messages. Cleared again on reset.
    pub fn report_rejections(mut self, messages: Vec<String>) {
        self.rejections.set(messages);
    }

    /// Hand a picked batch to ingestion.
    pub fn add_files(self, files: Vec<FileHandle>) {
        self.dispatch(Event::AddFiles(files));
    }

    /// Remove one file. Unknown ids are ignored.
    pub fn remove_file(self, id: FileId) {
        self.dispatch(Event::RemoveFile(id));
    }

    /// Replace the prompt text.
    pub fn set_prompt(self, prompt: String) {
        self.dispatch(Event::SetPrompt(prompt));
    }

    /// Start a model call if the session allows one.
    pub fn submit(self) {
        self.dispatch(Event::Submit);
    }

    /// Dismiss the result and clear the session.
    pub fn close(self) {
        self.dispatch(Event::Close);
    }

    /// Apply an event and run the resulting effects.
    pub fn dispatch(mut self, event: Event) {
        let effects = self.controller.write().dispatch(event);
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(mut self, effect: Effect) {
        match effect {
            Effect::StartProgress { id } => {
                let task = spawn(async move {
                    loop {
                        TimeoutFuture::new(millis(PROGRESS_TICK)).await;
                        if !self.tick(id) {
                            break;
                        }
                    }
                });
                if let Some(stale) = self.tickers.write().insert(id, task) {
                    stale.cancel();
                }
            }
            Effect::ProgressFinished { id } => {
                self.tickers.write().remove(&id);
            }
            Effect::CancelProgress { id } => {
                if let Some(task) = self.tickers.write().remove(&id) {
                    task.cancel();
                }
            }
            Effect::DecodePreview { epoch, id, file } => {
                spawn(async move {
                    // Let the new entry render before encoding.
                    TimeoutFuture::new(0).await;
                    let preview = match preview::data_url(&file) {
                        Ok(url) => Some(url),
                        Err(e) => {
                            log::warn!("no preview for {}: {e}", file.name());
                            None
                        }
                    };
                    self.dispatch(Event::PreviewDecoded { epoch, id, preview });
                });
            }
            Effect::Generate(request) => {
                spawn(async move {
                    let outcome = self.generate(&request).await;
                    self.dispatch(Event::SubmissionSettled {
                        epoch: request.epoch,
                        outcome,
                    });
                });
            }
            Effect::FilesDropped { count } => {
                log::info!("dropped {count} file(s) over the upload limit");
            }
            Effect::FilesChanged => {
                if let Some(on_change) = self.on_change {
                    let files = self.controller.peek().session().files.clone();
                    on_change.call(files);
                }
            }
            Effect::FileRemoved(file) => {
                if let Some(on_remove) = self.on_remove {
                    on_remove.call(file);
                }
            }
            Effect::SessionCleared => {
                self.rejections.set(Vec::new());
            }
        }
    }

    /// Dispatch one progress tick from inside `id`'s own task.
    ///
    /// Returns whether the task should keep ticking. The task is never
    /// cancelled from here; it ends by returning.
    fn tick(mut self, id: FileId) -> bool {
        let effects = self.controller.write().dispatch(Event::ProgressTick(id));
        let mut running = true;
        for effect in effects {
            match effect {
                Effect::ProgressFinished { id: done } | Effect::CancelProgress { id: done }
                    if done == id =>
                {
                    self.tickers.write().remove(&id);
                    running = false;
                }
                other => self.run(other),
            }
        }
        running
    }

    #[allow(clippy::future_not_send)] // WASM is single-threaded
    async fn generate(self, request: &SubmitRequest) -> Result<String, SubmitError> {
        let Some(client) = self.client.peek().clone() else {
            log::error!("submission failed: no model configured");
            return Err(SubmitError::Rejected("no model configured".into()));
        };

        let call = client.generate(&request.prompt, request.file.mime(), request.file.content());
        match with_timeout(call, request.timeout).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                log::error!("submission of {} failed: {e}", request.file.name());
                Err(SubmitError::Rejected(e.to_string()))
            }
            Err(elapsed) => {
                log::error!("submission of {} failed: {elapsed}", request.file.name());
                Err(SubmitError::TimedOut(request.timeout))
            }
        }
    }

    fn cancel_all(mut self) {
        // The signal may already be gone during teardown.
        if let Ok(mut tickers) = self.tickers.try_write() {
            for (_, task) in tickers.drain() {
                task.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use dioxus::core::VirtualDom;

    use super::*;

    fn pdf(name: &str) -> FileHandle {
        FileHandle::new(name, "application/pdf", vec![1_u8; 8])
    }

    #[test]
    fn no_initial_files_means_no_seed() {
        assert_eq!(UploadOptions::default().seed(), None);
    }

    #[test]
    fn initial_files_seed_one_batch() {
        let options = UploadOptions {
            initial_files: vec![pdf("a.pdf"), pdf("b.pdf")],
            ..UploadOptions::default()
        };
        assert_eq!(
            options.seed(),
            Some(Event::AddFiles(vec![pdf("a.pdf"), pdf("b.pdf")]))
        );
    }

    #[test]
    fn seeded_batch_respects_the_cap() {
        let options = UploadOptions {
            initial_files: vec![pdf("a.pdf"), pdf("b.pdf")],
            ..UploadOptions::default()
        };
        let mut controller = Controller::new(options.constraints.clone());
        let effects = controller.dispatch(options.seed().unwrap_or(Event::Reset));
        assert_eq!(controller.session().files.len(), 1);
        assert!(effects.contains(&Effect::FilesDropped { count: 1 }));
    }

    #[test]
    fn hook_mounts_and_tears_down() {
        fn host() -> Element {
            let upload = use_file_upload(UploadOptions {
                initial_files: vec![pdf("a.pdf")],
                ..UploadOptions::default()
            });
            let count = upload.session().files.len();
            let notes = upload.rejections().len();
            rsx! { "{count} {notes}" }
        }

        let mut dom = VirtualDom::new(host);
        dom.rebuild_in_place();
        drop(dom);
    }
}
