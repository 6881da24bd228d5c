//! Dioxus UI components for promptdrop.
//!
//! Provides the drop zone, the file list with progress bars, the
//! result panel, and the assembled [`FileUpload`] widget.

mod drop_zone;
mod file_list;
mod file_upload;
mod result_panel;

pub use drop_zone::DropZone;
pub use file_list::FileList;
pub use file_upload::FileUpload;
pub use result_panel::ResultPanel;
