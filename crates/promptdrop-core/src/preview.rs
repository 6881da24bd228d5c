//! Data URL encoding for image previews.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::types::FileHandle;

/// Errors that can occur while producing a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// Only `image/*` files get a preview.
    #[error("{mime} is not an image type")]
    NotAnImage {
        /// The file's MIME type.
        mime: String,
    },

    /// The file has no content to show.
    #[error("{name} is empty")]
    Empty {
        /// The file's name.
        name: String,
    },
}

/// Encode an image file as a `data:<mime>;base64,<payload>` URL.
///
/// # Errors
///
/// Returns [`PreviewError::NotAnImage`] for non-image MIME types and
/// [`PreviewError::Empty`] for zero-byte files.
pub fn data_url(file: &FileHandle) -> Result<String, PreviewError> {
    if !file.is_image() {
        return Err(PreviewError::NotAnImage {
            mime: file.mime().to_owned(),
        });
    }
    if file.content().is_empty() {
        return Err(PreviewError::Empty {
            name: file.name().to_owned(),
        });
    }
    let payload = STANDARD.encode(file.content());
    Ok(format!("data:{};base64,{payload}", file.mime()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_image_as_data_url() {
        let file = FileHandle::new("dot.png", "image/png", b"abc".to_vec());
        assert_eq!(data_url(&file), Ok("data:image/png;base64,YWJj".to_owned()));
    }

    #[test]
    fn refuses_non_image() {
        let file = FileHandle::new("a.pdf", "application/pdf", b"%PDF".to_vec());
        assert!(matches!(data_url(&file), Err(PreviewError::NotAnImage { .. })));
    }

    #[test]
    fn refuses_empty_image() {
        let file = FileHandle::new("a.png", "image/png", Vec::new());
        assert_eq!(
            data_url(&file),
            Err(PreviewError::Empty {
                name: "a.png".into()
            })
        );
    }
}
