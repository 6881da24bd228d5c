//! promptdrop-io: Browser I/O and Dioxus component library.
//!
//! Reads picked and dropped files, runs the effects of the
//! `promptdrop-core` controller (progress timers, preview encoding, the
//! model call under a timeout), and provides the UI components of the
//! promptdrop web application.

pub mod components;
pub mod picker;
pub mod timeout;
pub mod upload;

pub use components::{DropZone, FileList, FileUpload, ResultPanel};
pub use picker::{PickedBatch, PickerError};
pub use upload::{UploadHandle, UploadOptions, use_file_upload};
