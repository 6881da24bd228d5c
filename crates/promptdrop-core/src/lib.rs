//! promptdrop-core: upload session state machine (sans-IO).
//!
//! Tracks the files a user has selected, their simulated upload
//! progress and previews, the prompt, and the outcome of the single
//! model call, and decides which side effects the host must run.
//!
//! This crate has **no I/O dependencies**: timers, file reading, and
//! the network call are performed by the host (`promptdrop-io` in the
//! browser, `promptdrop-ask` on the command line) in response to the
//! [`Effect`]s returned by [`Controller::dispatch`].

pub mod constraints;
pub mod controller;
pub mod ingest;
pub mod preview;
pub mod session;
pub mod submit;
pub mod types;

pub use constraints::{Constraints, MIB, Rejection, mime_for_name, resolve_mime};
pub use controller::{Controller, Effect, Event};
pub use ingest::{Admission, PROGRESS_STEP, PROGRESS_TICK};
pub use preview::PreviewError;
pub use session::{FileView, SessionView, UploadSession};
pub use submit::{SubmitConfig, SubmitError, SubmitRequest};
pub use types::{Epoch, FileHandle, FileId, FileStage, PROGRESS_COMPLETE, Preview, UploadedFile};
