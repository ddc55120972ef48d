//! Output naming and the save handoff

use crate::constants::{MERGED_FILE_PREFIX, PDF_EXTENSION, PDF_MIME_TYPE};
use crate::types::*;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// A finished document held in memory until it is saved
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>, page_count: usize) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: PDF_MIME_TYPE,
            bytes,
            page_count,
        }
    }
}

/// Name of a merged document, e.g. `images-2024-03-09-14-05-30.pdf`
pub fn merged_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "{}-{}.{}",
        MERGED_FILE_PREFIX,
        timestamp.format("%Y-%m-%d-%H-%M-%S"),
        PDF_EXTENSION
    )
}

/// Name of a single-image document: the base name of the image with its last
/// extension replaced. Directory components (`/` or `\`) are dropped, so the
/// result always stays inside the output directory. `position` numbers the
/// fallback name when nothing is left.
pub fn per_image_file_name(display_name: &str, position: usize) -> String {
    let base_name = display_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(display_name);

    let stem = match base_name.rfind('.') {
        Some(dot) if dot + 1 < base_name.len() => &base_name[..dot],
        _ => base_name,
    };

    if stem.trim().is_empty() || stem == "." || stem == ".." {
        format!("image-{}.{}", position + 1, PDF_EXTENSION)
    } else {
        format!("{}.{}", stem, PDF_EXTENSION)
    }
}

/// Save one document into `dir`
pub async fn save_document(document: &RenderedDocument, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(&document.file_name);
    tokio::fs::write(&path, &document.bytes)
        .await
        .map_err(|source| ConvertError::Save {
            file_name: document.file_name.clone(),
            source,
        })?;
    log::info!("Saved {} ({} bytes)", path.display(), document.bytes.len());
    Ok(path)
}

/// Save documents in order. Stops at the first failure; the buffers are only
/// borrowed, so a retry does not need a rebuild.
pub async fn save_documents(
    documents: &[RenderedDocument],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::with_capacity(documents.len());
    for document in documents {
        paths.push(save_document(document, dir).await?);
    }
    Ok(paths)
}
