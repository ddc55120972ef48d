//! Grouping images into output documents
//!
//! The sequencer is strictly order-preserving. Reordering happens on the
//! working set before a conversion starts.

use chrono::{Local, NaiveDateTime};

use crate::output::{merged_file_name, per_image_file_name};
use crate::types::{ImageAsset, LayoutMode};

use super::{OutputDocument, PageSpec};

/// Inputs for deriving output file names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingContext {
    /// Timestamp encoded into merged document names
    pub timestamp: NaiveDateTime,
}

impl NamingContext {
    pub fn now() -> Self {
        Self {
            timestamp: Local::now().naive_local(),
        }
    }

    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self { timestamp }
    }
}

/// Turn an ordered image list into an ordered list of output documents.
///
/// * `Merged` yields one document with one page per image, in input order.
/// * `OnePerDocument` yields one single-page document per image, named after
///   the image. Duplicate names are left for the caller to resolve.
///
/// An empty image list yields no documents.
pub fn sequence(
    images: &[ImageAsset],
    mode: LayoutMode,
    naming: &NamingContext,
) -> Vec<OutputDocument> {
    if images.is_empty() {
        return Vec::new();
    }

    match mode {
        LayoutMode::Merged => {
            let pages = images
                .iter()
                .enumerate()
                .map(|(index, asset)| PageSpec {
                    index,
                    asset: asset.clone(),
                })
                .collect();

            vec![OutputDocument {
                file_name: merged_file_name(naming.timestamp),
                pages,
            }]
        }
        LayoutMode::OnePerDocument => images
            .iter()
            .enumerate()
            .map(|(position, asset)| OutputDocument {
                file_name: per_image_file_name(asset.display_name(), position),
                pages: vec![PageSpec {
                    index: 0,
                    asset: asset.clone(),
                }],
            })
            .collect(),
    }
}

/// Number of documents `sequence` produces for `image_count` images
pub fn document_count(image_count: usize, mode: LayoutMode) -> usize {
    match (mode, image_count) {
        (_, 0) => 0,
        (LayoutMode::Merged, _) => 1,
        (LayoutMode::OnePerDocument, n) => n,
    }
}
