//! Upload extension policy for draft and report attachments.
//!
//! File contents are never inspected; the only gate is the filename
//! extension. Report photo questions use the narrower image-only list.

/// Extensions accepted as photo answers.
pub const PHOTO_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "bmp"];

/// Extensions accepted for any file upload.
pub const ALLOWED_EXTENSIONS: [&str; 13] = [
    "jpeg", "jpg", "png", "gif", "bmp", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "pdf", "txt",
];

/// Rejection raised when an uploaded filename fails the extension gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentError {
    /// The extension is outside [`ALLOWED_EXTENSIONS`].
    #[error("That file type is not supported.")]
    UnsupportedType,
    /// The extension is outside [`PHOTO_EXTENSIONS`].
    #[error(
        "That file type is not supported. Please upload an image with one of \
         these extensions: jpeg, jpg, png, gif, bmp"
    )]
    UnsupportedPhotoType,
}

/// Extracts the lowercased extension from a filename, if it has one.
///
/// # Examples
///
/// ```
/// # use backend::domain::attachments::extension;
/// assert_eq!(extension("budget.PDF"), Some("pdf".to_owned()));
/// assert_eq!(extension("no-extension"), None);
/// ```
#[must_use]
pub fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Checks a filename against the general allow-list.
pub fn validate(filename: &str) -> Result<(), AttachmentError> {
    match extension(filename) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AttachmentError::UnsupportedType),
    }
}

/// Checks a filename against the photo-only allow-list.
pub fn validate_photo(filename: &str) -> Result<(), AttachmentError> {
    match extension(filename) {
        Some(ext) if PHOTO_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AttachmentError::UnsupportedPhotoType),
    }
}
