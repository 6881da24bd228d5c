//! Reading picked or dropped files and applying the picker filters.
//!
//! This is the picker side of ingestion: it turns Dioxus `FileData`
//! into [`FileHandle`]s and refuses files whose type or size the
//! [`Constraints`] do not allow. The controller still enforces capacity
//! against the whole session.

use dioxus::html::FileData;
use promptdrop_core::{Constraints, FileHandle, Rejection, resolve_mime};

/// Why a picked file did not make it into the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PickerError {
    /// The constraints refuse the file.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The browser could not read the file.
    #[error("failed to read {name}: {message}")]
    Read {
        /// File name.
        name: String,
        /// Error reported by the browser.
        message: String,
    },
}

/// Files that passed the filters, and the reasons the others did not.
#[derive(Debug, Default)]
pub struct PickedBatch {
    /// Files to hand to the controller, in selection order.
    pub accepted: Vec<FileHandle>,
    /// One entry per refused file.
    pub rejected: Vec<PickerError>,
    /// Files left unread because `max_files` were already accepted.
    pub skipped: usize,
}

/// What to do with a picked file, decided from its metadata.
#[derive(Debug, PartialEq, Eq)]
enum Precheck<'a> {
    /// Read the bytes; the file is stored with this MIME type.
    Read { mime: &'a str },
    /// The batch already holds `max_files` files.
    Skip,
    /// Type or declared size is not allowed.
    Refuse(Rejection),
}

fn precheck<'a>(
    constraints: &Constraints,
    name: &str,
    declared_mime: Option<&'a str>,
    size: u64,
    accepted: usize,
) -> Precheck<'a> {
    if accepted >= constraints.max_files {
        return Precheck::Skip;
    }
    let mime = resolve_mime(name, declared_mime);
    match constraints.check_declared(name, mime, size) {
        Ok(()) => Precheck::Read { mime },
        Err(rejection) => Precheck::Refuse(rejection),
    }
}

/// Read every file and split the batch into accepted and rejected.
///
/// Type and size are checked against the browser's metadata before
/// any bytes are read, and reading stops once `max_files` files are
/// accepted.
#[allow(clippy::future_not_send)] // WASM is single-threaded; FileData is !Send
pub async fn read_files(files: Vec<FileData>, constraints: &Constraints) -> PickedBatch {
    let mut batch = PickedBatch::default();
    for file in files {
        let name = file.name();
        let declared = file.content_type();
        let accepted = batch.accepted.len();
        let mime = match precheck(constraints, &name, declared.as_deref(), file.size(), accepted) {
            Precheck::Read { mime } => mime.to_owned(),
            Precheck::Skip => {
                batch.skipped += 1;
                continue;
            }
            Precheck::Refuse(rejection) => {
                batch.rejected.push(rejection.into());
                continue;
            }
        };
        match file.read_bytes().await {
            Ok(bytes) => {
                let handle = FileHandle::new(name, mime, bytes.to_vec());
                match constraints.check(&handle) {
                    Ok(()) => batch.accepted.push(handle),
                    Err(rejection) => batch.rejected.push(rejection.into()),
                }
            }
            Err(e) => batch.rejected.push(PickerError::Read {
                name,
                message: e.to_string(),
            }),
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use promptdrop_core::MIB;

    use super::*;

    #[test]
    fn oversized_file_is_refused_before_reading() {
        let constraints = Constraints::default();
        assert_eq!(
            precheck(&constraints, "huge.png", Some("image/png"), 8 * 1024 * MIB, 0),
            Precheck::Refuse(Rejection::TooLarge {
                name: "huge.png".into(),
                size: 8 * 1024 * MIB,
                max: Constraints::DEFAULT_MAX_SIZE_BYTES,
            })
        );
    }

    #[test]
    fn unsupported_type_is_refused_before_reading() {
        let constraints = Constraints::default();
        assert!(matches!(
            precheck(&constraints, "setup.exe", Some("application/x-msdownload"), 10, 0),
            Precheck::Refuse(Rejection::UnsupportedType { .. })
        ));
    }

    #[test]
    fn reading_stops_at_the_file_cap() {
        let constraints = Constraints {
            max_files: 2,
            ..Constraints::default()
        };
        assert_eq!(
            precheck(&constraints, "a.png", None, 10, 1),
            Precheck::Read { mime: "image/png" }
        );
        assert_eq!(precheck(&constraints, "b.png", None, 10, 2), Precheck::Skip);
    }

    #[test]
    fn browser_type_is_kept() {
        let constraints = Constraints::default();
        assert_eq!(
            precheck(&constraints, "scan", Some("application/pdf"), 10, 0),
            Precheck::Read {
                mime: "application/pdf"
            }
        );
    }
}
