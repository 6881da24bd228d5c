//! List of admitted files with preview, size, and progress bar.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdFile, LdX};
use promptdrop_core::{FileId, MIB, PROGRESS_COMPLETE, UploadedFile};

/// Props for the [`FileList`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileListProps {
    /// Entries in selection order.
    files: Vec<UploadedFile>,
    /// Whether the remove buttons are enabled.
    can_remove: bool,
    /// Called with the id of the entry to remove.
    on_remove: EventHandler<FileId>,
}

/// One row per file: thumbnail or icon, name, size in MB, and a
/// progress bar while the simulated upload runs.
#[component]
pub fn FileList(props: FileListProps) -> Element {
    if props.files.is_empty() {
        return rsx! {};
    }

    rsx! {
        ul { class: "pd-file-list",
            for file in props.files.iter() {
                {render_row(file, props.can_remove, props.on_remove)}
            }
        }
    }
}

fn render_row(file: &UploadedFile, can_remove: bool, on_remove: EventHandler<FileId>) -> Element {
    let id = file.id;
    let name = file.file.name().to_owned();
    let size = format_mib(file.file.size());
    let progress = file.progress;

    rsx! {
        li { key: "{id}", class: "pd-file",
            if let Some(url) = file.preview.url() {
                img { class: "pd-file__thumb", src: "{url}", alt: "{name}" }
            } else {
                Icon { width: 32, height: 32, icon: LdFile, class: "pd-muted" }
            }

            div { class: "pd-file__info",
                p { class: "pd-file__name", title: "{name}", "{name}" }
                p { class: "pd-file__size", "{size} MB" }

                if progress < PROGRESS_COMPLETE {
                    div {
                        class: "pd-progress",
                        role: "progressbar",
                        "aria-valuemin": "0",
                        "aria-valuemax": "100",
                        "aria-valuenow": "{progress}",
                        div { class: "pd-progress__bar", style: "width: {progress}%" }
                    }
                }
            }

            button {
                class: "pd-icon-button",
                disabled: !can_remove,
                aria_label: "Remove {name}",
                onclick: move |_| on_remove.call(id),
                Icon { width: 16, height: 16, icon: LdX }
            }
        }
    }
}

/// Format a byte count as mebibytes with two decimals.
#[allow(clippy::cast_precision_loss)] // display only
fn format_mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / MIB as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_render_with_two_decimals() {
        assert_eq!(format_mib(0), "0.00");
        assert_eq!(format_mib(5 * MIB), "5.00");
        assert_eq!(format_mib(MIB + MIB / 4), "1.25");
    }
}
