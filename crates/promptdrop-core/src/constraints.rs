//! Picker constraints: file count cap, size cap, and accepted types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::FileHandle;

/// One mebibyte, the unit sizes are presented in.
pub const MIB: u64 = 1024 * 1024;

/// Fallback MIME type for files whose extension is not recognised.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension → MIME table used when the picker does not supply a type.
const KNOWN_TYPES: &[(&str, &str)] = &[
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("json", "application/json"),
];

/// Reasons the picker refuses a file before it reaches ingestion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Neither the MIME type nor the extension is accepted.
    #[error("unsupported file type: {name}")]
    UnsupportedType {
        /// Offending file name.
        name: String,
    },

    /// The file exceeds the configured size cap.
    #[error("{name} is {size} bytes, the limit is {max} bytes")]
    TooLarge {
        /// Offending file name.
        name: String,
        /// Actual size in bytes.
        size: u64,
        /// Configured cap in bytes.
        max: u64,
    },

    /// The widget is disabled.
    #[error("uploads are disabled")]
    Disabled,
}

/// Immutable per-session configuration of what may be uploaded.
///
/// `accepted_types` maps a MIME pattern (`image/*` or an exact type
/// such as `application/pdf`) to the file extensions allowed for it,
/// each written with its leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Maximum number of files in the session.
    pub max_files: usize,
    /// Maximum size of a single file, in bytes.
    pub max_size_bytes: u64,
    /// MIME pattern → allowed extensions.
    pub accepted_types: BTreeMap<String, Vec<String>>,
    /// Whether the widget refuses all new files.
    pub disabled: bool,
}

impl Constraints {
    /// Default file count cap.
    pub const DEFAULT_MAX_FILES: usize = 1;

    /// Default size cap.
    pub const DEFAULT_MAX_SIZE_BYTES: u64 = 20 * MIB;

    /// Whether `file` passes the type and size filters.
    ///
    /// Capacity is not checked here; it belongs to ingestion, which
    /// sees the whole session.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Disabled`] when the widget is disabled,
    /// [`Rejection::UnsupportedType`] when neither the MIME type nor the
    /// extension is listed, and [`Rejection::TooLarge`] when the file
    /// exceeds `max_size_bytes`.
    pub fn check(&self, file: &FileHandle) -> Result<(), Rejection> {
        self.check_declared(file.name(), file.mime(), file.size())
    }

    /// [`check`](Self::check) on metadata alone, before any bytes are
    /// read.
    ///
    /// # Errors
    ///
    /// Same as [`check`](Self::check).
    pub fn check_declared(&self, name: &str, mime: &str, size: u64) -> Result<(), Rejection> {
        if self.disabled {
            return Err(Rejection::Disabled);
        }
        if !self.accepts(name, mime) {
            return Err(Rejection::UnsupportedType {
                name: name.to_owned(),
            });
        }
        if size > self.max_size_bytes {
            return Err(Rejection::TooLarge {
                name: name.to_owned(),
                size,
                max: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Whether a file with this name and MIME type is accepted.
    ///
    /// A file matches a rule when its MIME type matches the rule's
    /// pattern, or when its extension is in the rule's list. An empty
    /// table accepts everything.
    #[must_use]
    pub fn accepts(&self, name: &str, mime: &str) -> bool {
        if self.accepted_types.is_empty() {
            return true;
        }
        let ext = extension(name);
        self.accepted_types.iter().any(|(pattern, extensions)| {
            mime_matches(pattern, mime)
                || ext.is_some_and(|ext| {
                    extensions
                        .iter()
                        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
                })
        })
    }

    /// Value for an `<input type="file" accept=...>` attribute.
    #[must_use]
    pub fn accept_attribute(&self) -> String {
        self.accepted_types
            .iter()
            .flat_map(|(pattern, extensions)| {
                std::iter::once(pattern.clone()).chain(extensions.iter().cloned())
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Size cap rounded to whole mebibytes, for display.
    #[must_use]
    pub const fn max_size_mib(&self) -> u64 {
        self.max_size_bytes.div_ceil(MIB)
    }
}

impl Default for Constraints {
    fn default() -> Self {
        let mut accepted_types = BTreeMap::new();
        accepted_types.insert(
            "image/*".to_owned(),
            [".jpeg", ".jpg", ".png", ".gif", ".webp"]
                .map(str::to_owned)
                .to_vec(),
        );
        accepted_types.insert("application/pdf".to_owned(), vec![".pdf".to_owned()]);
        Self {
            max_files: Self::DEFAULT_MAX_FILES,
            max_size_bytes: Self::DEFAULT_MAX_SIZE_BYTES,
            accepted_types,
            disabled: false,
        }
    }
}

/// Guess a MIME type from a file name's extension.
///
/// Returns [`OCTET_STREAM`] for unknown or missing extensions.
#[must_use]
pub fn mime_for_name(name: &str) -> &'static str {
    extension(name)
        .and_then(|ext| {
            KNOWN_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|&(_, mime)| mime)
        })
        .unwrap_or(OCTET_STREAM)
}

/// The extension of `name`, without the dot.
fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Whether `mime` matches a pattern such as `image/*` or `application/pdf`.
fn mime_matches(pattern: &str, mime: &str) -> bool {
    match pattern.strip_suffix("/*") {
        Some(kind) => mime
            .split_once('/')
            .is_some_and(|(mime_kind, _)| mime_kind.eq_ignore_ascii_case(kind)),
        None => pattern.eq_ignore_ascii_case(mime),
    }
}

/// MIME type for a picked file: the type the browser reported, or a
/// guess from the extension when it reported none.
#[must_use]
pub fn resolve_mime<'a>(name: &str, declared: Option<&'a str>) -> &'a str {
    declared
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| mime_for_name(name))
}
