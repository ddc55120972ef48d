//! Image ingestion
//!
//! Turns incoming files into [`ImageAsset`]s. Files that are not images are
//! filtered out silently; images that cannot be read are reported
//! individually and never stop the rest of the batch.

use crate::session::WorkingSet;
use crate::types::*;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// A file handed over by the input boundary (file picker, drop, CLI)
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// Declared media type, e.g. `image/png`. `None` when unknown.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }
}

/// Outcome of adding a batch of files
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Ids of the images appended to the working set, in input order
    pub added: Vec<ImageId>,
    /// Names of files filtered out as non-images
    pub skipped: Vec<String>,
    /// Images that looked like images but could not be read
    pub errors: Vec<ConvertError>,
}

/// Read the image header and build an asset
pub fn ingest_file(file: IncomingFile) -> Result<ImageAsset> {
    let ingestion_error = |reason: String| ConvertError::Ingestion {
        name: file.name.clone(),
        reason,
    };

    let reader = ImageReader::new(Cursor::new(&file.bytes[..]))
        .with_guessed_format()
        .map_err(|e| ingestion_error(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| ingestion_error("not a recognized raster image".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ingestion_error(e.to_string()))?;

    Ok(ImageAsset::new(
        file.name,
        file.bytes,
        width,
        height,
        SourceEncoding::from_format(format),
    ))
}

/// Whether a file passes the `image/*` check.
///
/// A declared media type decides on its own; without one, the content is
/// sniffed.
pub fn is_image_file(file: &IncomingFile) -> bool {
    match &file.media_type {
        Some(media_type) => media_type.to_ascii_lowercase().starts_with("image/"),
        None => image::guess_format(&file.bytes).is_ok(),
    }
}

/// Add a batch of files to the working set
pub fn add_images(set: &mut WorkingSet, files: Vec<IncomingFile>) -> IngestReport {
    let mut report = IngestReport::default();

    for file in files {
        if !is_image_file(&file) {
            log::debug!("Skipping non-image file {}", file.name);
            report.skipped.push(file.name);
            continue;
        }

        match ingest_file(file) {
            Ok(asset) => {
                log::debug!(
                    "Added {} as {} ({}x{})",
                    asset.display_name(),
                    asset.id(),
                    asset.pixel_width(),
                    asset.pixel_height()
                );
                report.added.push(asset.id());
                set.add(asset);
            }
            Err(e) => {
                log::warn!("{}", e);
                report.errors.push(e);
            }
        }
    }

    report
}

/// Load a file from disk, deriving its media type from the extension
pub async fn load_image_file(path: impl AsRef<Path>) -> Result<IncomingFile> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ConvertError::Ingestion {
            name: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_string());

    Ok(IncomingFile::new(name, media_type, bytes))
}

/// Load several files in order; unreadable files are reported, not fatal
pub async fn load_image_files(
    paths: &[impl AsRef<Path>],
) -> (Vec<IncomingFile>, Vec<ConvertError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match load_image_file(path).await {
            Ok(file) => files.push(file),
            Err(e) => errors.push(e),
        }
    }
    (files, errors)
}
