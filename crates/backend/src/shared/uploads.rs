//! Multipart image uploads: reading the form and storing files under the
//! uploads directory, which is served at `/uploads`.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use contracts::shared::upload::{remove_flag_name, ImageChange};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// URL prefix the uploads directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads";

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "ico"];

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Parts of one multipart request
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub files: BTreeMap<String, UploadedFile>,
    pub texts: BTreeMap<String, String>,
}

/// Why a multipart form could not be read
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// `field` is unknown when the limit is hit between parts
    #[error("upload exceeds {limit} bytes")]
    TooLarge { field: Option<String>, limit: usize },
    #[error(transparent)]
    Malformed(#[from] MultipartError),
}

impl FormError {
    /// Body limit hits become `TooLarge` for the part being read
    fn classify(e: MultipartError, field: Option<&str>, limit: usize) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge {
                field: field.map(str::to_string),
                limit,
            }
        } else {
            Self::Malformed(e)
        }
    }

    /// Attribute a size error without a part to `fallback`
    pub fn or_field(self, fallback: Option<&str>) -> Self {
        match self {
            Self::TooLarge { field: None, limit } => Self::TooLarge {
                field: fallback.map(str::to_string),
                limit,
            },
            other => other,
        }
    }
}

impl MultipartForm {
    /// Read every part; files larger than `max_file_bytes` are refused.
    ///
    /// A request cut off by the body limit is reported against the part
    /// being read at that moment.
    pub async fn read(multipart: &mut Multipart, max_file_bytes: usize) -> Result<Self, FormError> {
        let mut form = Self::default();
        let mut current: Option<String> = None;
        loop {
            let next = multipart.next_field().await;
            let Some(field) = next.map_err(|e| FormError::classify(e, current.as_deref(), max_file_bytes))?
            else {
                break;
            };
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            current = Some(name.clone());

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| FormError::classify(e, Some(&name), max_file_bytes))?;
                    if bytes.len() > max_file_bytes {
                        return Err(FormError::TooLarge {
                            field: Some(name),
                            limit: max_file_bytes,
                        });
                    }
                    // Browsers send an empty part for an untouched file input
                    if !file_name.is_empty() && !bytes.is_empty() {
                        form.files.insert(
                            name,
                            UploadedFile {
                                file_name,
                                bytes: bytes.to_vec(),
                            },
                        );
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| FormError::classify(e, Some(&name), max_file_bytes))?;
                    form.texts.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// Requested change of image field `field`
    pub fn image_change(&self, field: &str) -> ImageChange {
        let file_name = self.files.get(field).map(|f| f.file_name.clone());
        ImageChange::from_parts(file_name, self.text(&remove_flag_name(field)))
    }
}

/// Lower-cased extension if it is an accepted image type
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Write `file` to `<root>/<folder>/<uuid>.<ext>` and return its public URL
pub fn store(root: &Path, folder: &str, file: &UploadedFile) -> anyhow::Result<String> {
    let ext = image_extension(&file.file_name)
        .ok_or_else(|| anyhow::anyhow!("unsupported image type: {}", file.file_name))?;
    let dir = root.join(folder);
    std::fs::create_dir_all(&dir)?;

    let stored_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    std::fs::write(dir.join(&stored_name), &file.bytes)?;
    tracing::info!("Stored upload {} as {}/{}", file.file_name, folder, stored_name);

    Ok(format!("{}/{}/{}", PUBLIC_PREFIX, folder, stored_name))
}

/// Delete a previously stored file by its public URL; foreign URLs are ignored
pub fn remove(root: &Path, url: &str) {
    let Some(path) = local_path(root, url) else {
        return;
    };
    if let Err(e) = std::fs::remove_file(&path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove upload {}: {}", path.display(), e);
        }
    }
}

fn local_path(root: &Path, url: &str) -> Option<PathBuf> {
    let relative = url.strip_prefix(PUBLIC_PREFIX)?.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|part| part == ".." || part.is_empty()) {
        return None;
    }
    Some(root.join(relative))
}
