use std::{path::Path, sync::Arc};

use crate::error::{Error, ValidationError};

/// Largest accepted upload, in bytes.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/jpg", "image/gif"];

const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// An image chosen by the user, as the picker or a drop hands it over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    /// Wraps a file handed over by the host, with the MIME type it reports.
    pub fn new(
        name: impl Into<String>,
        mime: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, inferring its MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, mime_from_path(path), bytes))
    }

    /// File name without any directory part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type as reported by the host, not sniffed from the content.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Raw file content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn mime_from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => UNKNOWN_MIME_TYPE,
    }
}

/// Checks that a file may be uploaded.
///
/// The size limit is checked first, so an oversized file always reports the
/// size message whatever its type.
pub fn validate(file: &SelectedFile) -> Result<(), ValidationError> {
    if file.size() > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            limit: MAX_FILE_SIZE,
        });
    }
    if !ALLOWED_MIME_TYPES.contains(&file.mime()) {
        return Err(ValidationError::InvalidType(file.mime().to_string()));
    }
    Ok(())
}
