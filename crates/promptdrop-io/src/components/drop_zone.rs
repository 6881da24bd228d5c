//! Drag-and-drop zone with a file picker.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use promptdrop_core::{Constraints, FileHandle};

use crate::picker;

/// Props for the [`DropZone`] component.
#[derive(Props, Clone, PartialEq)]
pub struct DropZoneProps {
    /// Type and size filters, also used for the `accept` attribute.
    constraints: Constraints,
    /// Whether the zone takes new files.
    enabled: bool,
    /// Messages for refused files, shown under the zone.
    rejections: Vec<String>,
    /// Called with the files that passed the filters.
    on_files: EventHandler<Vec<FileHandle>>,
    /// Called with one message per refused file in a batch.
    on_rejected: EventHandler<Vec<String>>,
}

/// A dashed drop target that also opens the file picker on click.
///
/// Refused files (wrong type, too large, unreadable) are listed under
/// the zone; accepted ones are forwarded through `on_files` in
/// selection order.
#[component]
pub fn DropZone(props: DropZoneProps) -> Element {
    let mut dragging = use_signal(|| false);

    let constraints = props.constraints.clone();
    let enabled = props.enabled;
    let on_files = props.on_files;
    let on_rejected = props.on_rejected;

    // Shared by the picker (`handle_files`) and drag-and-drop
    // (`handle_drop`) paths.
    let process_files = move |files: Vec<FileData>| {
        let constraints = constraints.clone();
        async move {
            if !enabled || files.is_empty() {
                return;
            }
            let batch = picker::read_files(files, &constraints).await;
            for reason in &batch.rejected {
                log::warn!("picker refused a file: {reason}");
            }
            if batch.skipped > 0 {
                log::info!("left {} file(s) over the limit unread", batch.skipped);
            }
            on_rejected.call(batch.rejected.iter().map(ToString::to_string).collect());
            if !batch.accepted.is_empty() {
                on_files.call(batch.accepted);
            }
        }
    };

    let handle_files = {
        let process_files = process_files.clone();
        move |evt: FormEvent| process_files(evt.files())
    };

    let handle_drop = move |evt: DragEvent| {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files())
    };

    let state_class = match (enabled, dragging()) {
        (false, _) => "pd-dropzone--disabled",
        (true, true) => "pd-dropzone--active",
        (true, false) => "",
    };
    let accept = props.constraints.accept_attribute();
    let multiple = props.constraints.max_files > 1;
    let max_files = props.constraints.max_files;
    let max_mib = props.constraints.max_size_mib();

    rsx! {
        label {
            class: "pd-dropzone {state_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(enabled);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            input {
                r#type: "file",
                accept: "{accept}",
                multiple: multiple,
                disabled: !enabled,
                class: "pd-hidden",
                onchange: handle_files,
            }

            Icon { width: 24, height: 24, icon: LdUpload, class: "pd-muted" }

            p { class: "pd-dropzone__title",
                if enabled {
                    "Drag and drop files here, or click to select files."
                } else {
                    "Maximum files reached"
                }
            }
            p { class: "pd-dropzone__hint",
                "Maximum {max_files} file(s), up to {max_mib}MB each"
            }

            for reason in props.rejections.iter() {
                p { class: "pd-error", "{reason}" }
            }
        }
    }
}
