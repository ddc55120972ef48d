//! Building output documents
//!
//! Pages are processed strictly in order, one image at a time:
//! 1. Create a page of the effective page size
//! 2. Normalize the image
//! 3. Place it at the resolved rectangle
//! 4. Optionally draw the caption
//!
//! Any failure aborts the whole document. A document with missing pages is
//! never produced.

use crate::constants::CAPTION_MIN_OFFSET_MM;
use crate::layout::{OutputDocument, PageSpec, resolve_placement, usable_area};
use crate::normalize::{NormalizeOptions, NormalizedImage, normalize};
use crate::options::LayoutSettings;
use crate::output::RenderedDocument;
use crate::render::{DocumentBackend, LopdfBackend};
use crate::types::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation request, checked between pages
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Caption baseline: at the left margin, halfway down the bottom margin
pub fn caption_position(page: EffectivePageSize, margin_mm: f32) -> (f32, f32) {
    let (margin, _, _) = usable_area(page, margin_mm);
    let margin = margin as f32;
    (margin, (margin / 2.0).max(CAPTION_MIN_OFFSET_MM))
}

/// Build a document with the default lopdf backend
pub async fn build_document(
    document: &OutputDocument,
    settings: &LayoutSettings,
    cancel: &CancelFlag,
) -> Result<RenderedDocument> {
    let backend = LopdfBackend::new(document.title());
    build_document_with(document, settings, cancel, backend).await
}

/// Build a document with any backend.
///
/// Each page is normalized and drawn on the blocking pool, one page at a
/// time, so the backend never sees two pages concurrently.
pub async fn build_document_with<B>(
    document: &OutputDocument,
    settings: &LayoutSettings,
    cancel: &CancelFlag,
    mut backend: B,
) -> Result<RenderedDocument>
where
    B: DocumentBackend + Send + 'static,
{
    let options = begin_build(document, settings)?;

    for (completed, page) in document.pages.iter().enumerate() {
        check_cancelled(document, cancel, completed)?;

        let page_settings = settings.clone();
        let page_spec = page.clone();
        backend = tokio::task::spawn_blocking(move || {
            build_page(&mut backend, &page_spec, &page_settings, &options).map(|()| backend)
        })
        .await??;

        log::debug!(
            "Placed {} on page {} of {}",
            page.asset.id(),
            page.index + 1,
            document.file_name
        );
    }

    let bytes = tokio::task::spawn_blocking(move || backend.finish()).await??;
    log::info!(
        "Built {} ({} pages, {} bytes)",
        document.file_name,
        document.page_count(),
        bytes.len()
    );

    Ok(RenderedDocument::new(
        document.file_name.clone(),
        bytes,
        document.page_count(),
    ))
}

/// Build a document synchronously on the current thread
pub fn build_document_blocking<B: DocumentBackend>(
    document: &OutputDocument,
    settings: &LayoutSettings,
    cancel: &CancelFlag,
    mut backend: B,
) -> Result<Vec<u8>> {
    let options = begin_build(document, settings)?;

    for (completed, page) in document.pages.iter().enumerate() {
        check_cancelled(document, cancel, completed)?;
        build_page(&mut backend, page, settings, &options)?;
    }

    backend.finish()
}

/// Checks made once before the first page
fn begin_build(document: &OutputDocument, settings: &LayoutSettings) -> Result<NormalizeOptions> {
    if document.is_empty() {
        return Err(ConvertError::NoPages);
    }
    settings.validate()?;
    Ok(settings.normalize_options())
}

fn check_cancelled(document: &OutputDocument, cancel: &CancelFlag, completed: usize) -> Result<()> {
    if cancel.is_cancelled() {
        log::info!(
            "Build of {} cancelled after {} page(s)",
            document.file_name,
            completed
        );
        return Err(ConvertError::Cancelled {
            completed_pages: completed,
        });
    }
    Ok(())
}

/// Normalize and draw one page. Failures name the page and its image.
fn build_page<B: DocumentBackend>(
    backend: &mut B,
    page: &PageSpec,
    settings: &LayoutSettings,
    options: &NormalizeOptions,
) -> Result<()> {
    let normalized = normalize(&page.asset, options).map_err(|e| embed_error(page, e))?;
    render_page(backend, page, &normalized, settings).map_err(|e| embed_error(page, e))
}

fn render_page<B: DocumentBackend>(
    backend: &mut B,
    page: &PageSpec,
    image: &NormalizedImage,
    settings: &LayoutSettings,
) -> Result<()> {
    let page_size = settings.effective_page_size();
    let margin = settings.clamped_margin();

    // Placement follows the asset's ingested dimensions so that a missing
    // dimension falls back to the full printable area
    let placement = resolve_placement(
        page.asset.pixel_width(),
        page.asset.pixel_height(),
        page_size,
        margin,
    );

    backend.create_page(page_size)?;
    backend.draw_image(image, &placement)?;

    if settings.caption.enabled {
        let position = caption_position(page_size, margin);
        backend.draw_text(page.asset.display_name(), position, &settings.caption)?;
    }

    Ok(())
}

fn embed_error(page: &PageSpec, error: ConvertError) -> ConvertError {
    match error {
        ConvertError::Embed { .. } | ConvertError::Cancelled { .. } => error,
        other => ConvertError::Embed {
            image_id: page.asset.id(),
            page_index: page.index,
            reason: other.to_string(),
        },
    }
}
