//! The complete widget: result, prompt, drop zone, file list, submit.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdLoader;
use promptdrop_core::{Constraints, FileHandle, SubmitConfig, UploadedFile};
use promptdrop_gemini::GeminiConfig;

use super::{DropZone, FileList, ResultPanel};
use crate::upload::{UploadOptions, use_file_upload};

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Count, size, and type limits.
    #[props(default)]
    constraints: Constraints,
    /// Model call settings.
    #[props(default)]
    submit: SubmitConfig,
    /// Model connection. Without an API key, submissions fail with a
    /// message.
    #[props(default)]
    gemini: GeminiConfig,
    /// Fired with the full file list whenever it changes.
    #[props(default)]
    on_change: Option<EventHandler<Vec<UploadedFile>>>,
    /// Fired with the removed entry when the user removes a file.
    #[props(default)]
    on_remove: Option<EventHandler<UploadedFile>>,
    /// Files admitted right after mount.
    #[props(default)]
    initial_files: Vec<FileHandle>,
}

/// Upload a file, write a prompt, and show the model's answer.
///
/// The props are read once, on first render.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let upload = use_file_upload(UploadOptions {
        constraints: props.constraints,
        submit: props.submit,
        gemini: Some(props.gemini),
        on_change: props.on_change,
        on_remove: props.on_remove,
        initial_files: props.initial_files,
    });

    let constraints = upload.constraints();
    let session = upload.session();
    let view = session.view(&constraints);
    let busy = session.loading || view.is_uploading;

    rsx! {
        div { class: "pd-widget",
            if let Some(text) = session.result.clone() {
                ResultPanel { text, on_close: move |()| upload.close() }
            }

            if let Some(err) = view.error.clone() {
                p { class: "pd-error", role: "alert", "{err}" }
            }

            textarea {
                class: "pd-prompt",
                rows: 6,
                placeholder: "Enter your prompt here...",
                value: "{session.prompt}",
                oninput: move |evt| upload.set_prompt(evt.value()),
            }

            section { class: "pd-card",
                header {
                    h2 { class: "pd-card__title", "File Upload" }
                    p { class: "pd-muted", "Drag and drop files here or click to select files." }
                }

                DropZone {
                    constraints: constraints.clone(),
                    enabled: view.can_upload,
                    rejections: upload.rejections(),
                    on_files: move |files| upload.add_files(files),
                    on_rejected: move |messages| upload.report_rejections(messages),
                }

                FileList {
                    files: session.files.clone(),
                    can_remove: view.can_remove,
                    on_remove: move |id| upload.remove_file(id),
                }

                footer { class: "pd-card__footer",
                    p { class: "pd-muted",
                        "{view.count_label()}"
                        if view.is_uploading {
                            span { class: "pd-accent", " • Uploading..." }
                        }
                    }
                    button {
                        class: "pd-button",
                        disabled: !view.can_submit,
                        onclick: move |_| upload.submit(),
                        if busy {
                            Icon { width: 16, height: 16, icon: LdLoader, class: "pd-spin" }
                        } else {
                            "Submit"
                        }
                    }
                }
            }
        }
    }
}
