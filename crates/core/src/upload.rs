//! Avatar upload filtering and storage naming.

use std::path::Path;

use crate::error::CoreError;

/// Extensions (lowercase, without the dot) accepted for avatars.
pub const ALLOWED_AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Message shown when an upload is refused because of its extension.
pub const REJECTED_FILE_MESSAGE: &str = "Only image files (png, jpg, jpeg, gif) are allowed.";

/// Return the normalized extension of an acceptable avatar file name.
///
/// The check is case-insensitive and looks only at the final extension, so
/// `photo.PNG` passes and `photo.png.exe` does not.
pub fn avatar_extension(file_name: &str) -> Result<&'static str, CoreError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| CoreError::Validation(REJECTED_FILE_MESSAGE.into()))?;

    ALLOWED_AVATAR_EXTENSIONS
        .iter()
        .find(|allowed| **allowed == ext)
        .copied()
        .ok_or_else(|| CoreError::Validation(REJECTED_FILE_MESSAGE.into()))
}

/// Generate the on-disk file name for an accepted avatar.
///
/// The client's file name is never reused, only its extension.
pub fn stored_avatar_name(extension: &str) -> String {
    format!("{}.{extension}", uuid::Uuid::new_v4())
}
