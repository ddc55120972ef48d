//! The working set and the conversion entry point

use crate::builder::{CancelFlag, build_document};
use crate::layout::{NamingContext, sequence};
use crate::options::LayoutSettings;
use crate::output::RenderedDocument;
use crate::types::*;

/// Ordered images being composed, owned by a single session
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    assets: Vec<ImageAsset>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, asset: ImageAsset) {
        self.assets.push(asset);
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn assets(&self) -> &[ImageAsset] {
        &self.assets
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
        self.assets.iter()
    }

    pub fn get(&self, id: ImageId) -> Option<&ImageAsset> {
        self.assets.iter().find(|a| a.id() == id)
    }

    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.assets.iter().position(|a| a.id() == id)
    }

    /// Remove an image by id
    pub fn remove(&mut self, id: ImageId) -> Option<ImageAsset> {
        let index = self.position(id)?;
        Some(self.assets.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<ImageAsset> {
        (index < self.assets.len()).then(|| self.assets.remove(index))
    }

    /// Swap with the previous image. Returns false when nothing moved.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.assets.len() {
            return false;
        }
        self.assets.swap(index - 1, index);
        true
    }

    /// Swap with the next image. Returns false when nothing moved.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.assets.len() {
            return false;
        }
        self.assets.swap(index, index + 1);
        true
    }

    /// Move the image at `from` so that it ends up at `to` (drag and drop)
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        let len = self.assets.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let asset = self.assets.remove(from);
        self.assets.insert(to, asset);
        true
    }

    pub fn clear(&mut self) {
        self.assets.clear();
    }

    /// Sum of the source file sizes
    pub fn total_bytes(&self) -> usize {
        self.assets.iter().map(ImageAsset::byte_len).sum()
    }
}

/// A document that failed to build
#[derive(Debug)]
pub struct DocumentFailure {
    pub file_name: String,
    pub error: ConvertError,
}

/// Result of a conversion: everything that built, and everything that did not
#[derive(Debug, Default)]
pub struct ConversionOutcome {
    pub documents: Vec<RenderedDocument>,
    pub failures: Vec<DocumentFailure>,
}

impl ConversionOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn was_cancelled(&self) -> bool {
        self.failures
            .iter()
            .any(|f| matches!(f.error, ConvertError::Cancelled { .. }))
    }
}

/// Convert the working set into documents.
///
/// Documents are built one after another. A failed document is recorded and
/// the remaining ones still build; cancellation stops the conversion. An
/// empty working set produces an empty outcome. The working set itself is
/// never modified.
///
/// `progress` is called with `(documents_done, documents_total)` after each
/// document.
pub async fn convert(
    set: &WorkingSet,
    settings: &LayoutSettings,
    mode: LayoutMode,
    naming: &NamingContext,
    cancel: &CancelFlag,
    mut progress: impl FnMut(usize, usize),
) -> Result<ConversionOutcome> {
    settings.validate()?;

    let documents = sequence(set.assets(), mode, naming);
    let total = documents.len();
    let mut outcome = ConversionOutcome::default();

    if total == 0 {
        log::debug!("Nothing to convert");
        return Ok(outcome);
    }

    log::info!(
        "Converting {} image(s) into {} document(s)",
        set.len(),
        total
    );

    for (done, document) in documents.iter().enumerate() {
        match build_document(document, settings, cancel).await {
            Ok(rendered) => outcome.documents.push(rendered),
            Err(error) => {
                log::warn!("{}: {}", document.file_name, error);
                let cancelled = matches!(error, ConvertError::Cancelled { .. });
                outcome.failures.push(DocumentFailure {
                    file_name: document.file_name.clone(),
                    error,
                });
                if cancelled {
                    break;
                }
            }
        }
        progress(done + 1, total);
    }

    Ok(outcome)
}
