use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use super::error::CameraError;
use crate::model::Photo;

/// Maps an image file extension to its content type.
fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Reads a photo picked from disk.
///
/// The content type comes from the file extension. Empty files and
/// unknown extensions are rejected.
pub fn load_photo_file(path: &Path) -> Result<Photo, CameraError> {
    let not_an_image = || CameraError::NotAnImage(path.display().to_string());

    let content_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(content_type_for)
        .ok_or_else(not_an_image)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(not_an_image)?;

    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(not_an_image());
    }
    Ok(Photo::new(file_name, content_type, bytes))
}

/// A viewable copy of the selected photo.
///
/// The copy lives in a temporary file that is deleted when the preview is
/// dropped or replaced.
#[derive(Debug)]
pub struct PhotoPreview {
    file: NamedTempFile,
    file_name: String,
}

impl PhotoPreview {
    pub fn create(photo: &Photo) -> io::Result<Self> {
        let suffix = Path::new(&photo.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();
        let mut file = tempfile::Builder::new()
            .prefix("walkin-preview-")
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(&photo.bytes)?;
        file.flush()?;
        Ok(Self {
            file,
            file_name: photo.file_name.clone(),
        })
    }

    /// Location of the temporary copy.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Name of the photo this preview shows.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}
