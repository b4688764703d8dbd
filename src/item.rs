// Upload items: what the user passed in, and what goes on the wire.
//
// `UploadRequest` is the classified command-line item. `UploadItem` is the
// file part of one multipart POST, built either from a local file or from
// the body of a fetched URL.

use std::io;
use std::path::{Path, PathBuf};

use mime_guess::mime::{self, Mime};
use reqwest::blocking::multipart::Part;

use crate::error::{UploadError, UploadResult};

/// Multipart field the image host reads files from.
pub const FILE_FIELD: &str = "file-upload[]";

/// Filename sent when the real one is unusable or untrusted.
pub const PLACEHOLDER_FILENAME: &str = "justfilename";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRequest {
    File(PathBuf),
    Url(String),
}

impl UploadRequest {
    /// Existing filesystem entries win over URLs, so a local file that
    /// happens to be called `http...` is still uploaded as a file.
    pub fn classify(item: &str) -> UploadResult<Self> {
        if Path::new(item).exists() {
            Ok(UploadRequest::File(PathBuf::from(item)))
        } else if item.starts_with("http") {
            Ok(UploadRequest::Url(item.to_string()))
        } else {
            Err(UploadError::invalid_input(format!(
                "Not an existing file or image URL: {}",
                item
            )))
        }
    }
}

/// Classify every item up front so a typo in the last argument fails
/// before anything is uploaded.
pub fn partition<S: AsRef<str>>(items: &[S]) -> UploadResult<Vec<UploadRequest>> {
    items
        .iter()
        .map(|item| UploadRequest::classify(item.as_ref()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct UploadItem {
    pub field_name: &'static str,
    pub filename: String,
    pub mime_type: Mime,
    pub content: Vec<u8>,
}

impl UploadItem {
    /// Read a local image. The MIME type comes from the extension and is
    /// checked before the file is read.
    pub fn from_file(path: &Path) -> UploadResult<Self> {
        if !path.exists() {
            return Err(UploadError::not_found(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let mime_type = image_mime_for_path(path)?;
        let content = std::fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                UploadError::not_found(format!("File not found: {}", path.display()))
            }
            _ => UploadError::invalid_input(format!("Cannot read {}: {}", path.display(), e)),
        })?;

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(sanitize_filename)
            .unwrap_or_else(|| PLACEHOLDER_FILENAME.to_string());

        Ok(Self {
            field_name: FILE_FIELD,
            filename,
            mime_type,
            content,
        })
    }

    /// Wrap a fetched body. The remote filename is never used.
    pub fn from_remote(content: Vec<u8>, content_type: Option<&str>) -> UploadResult<Self> {
        Ok(Self {
            field_name: FILE_FIELD,
            filename: PLACEHOLDER_FILENAME.to_string(),
            mime_type: image_mime_from_header(content_type)?,
            content,
        })
    }

    /// Build the multipart part. The bytes are copied so the item can be
    /// sent again on retry.
    pub fn to_part(&self) -> UploadResult<Part> {
        Part::bytes(self.content.clone())
            .file_name(self.filename.clone())
            .mime_str(self.mime_type.as_ref())
            .map_err(|e| UploadError::invalid_input(format!("Unusable MIME type: {}", e)))
    }
}

/// Keep names the multipart encoder handles everywhere (Latin-1) and use a
/// placeholder for anything else.
pub fn sanitize_filename(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| (c as u32) <= 0xFF) {
        name.to_string()
    } else {
        PLACEHOLDER_FILENAME.to_string()
    }
}

pub fn image_mime_for_path(path: &Path) -> UploadResult<Mime> {
    match mime_guess::from_path(path).first() {
        Some(mime) if mime.type_() == mime::IMAGE => Ok(mime),
        Some(mime) => Err(unknown_image_type(mime.as_ref())),
        None => Err(unknown_image_type("None")),
    }
}

pub fn image_mime_from_header(content_type: Option<&str>) -> UploadResult<Mime> {
    let raw = content_type.map(str::trim).unwrap_or("");
    if raw.is_empty() {
        return Err(unknown_image_type("None"));
    }
    match raw.parse::<Mime>() {
        Ok(mime) if mime.type_() == mime::IMAGE => Ok(mime),
        _ => Err(unknown_image_type(raw)),
    }
}

fn unknown_image_type(found: &str) -> UploadError {
    UploadError::invalid_input(format!("Unknown image file type {}", found))
}
