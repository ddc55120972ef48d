//! Layout data types
//!
//! These types sit between sequencing and PDF rendering. All lengths are
//! millimeters with the origin at the bottom-left corner of the page.

use crate::types::ImageAsset;

/// Position and size of an image drawn onto a page
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
    /// Millimeters per source pixel
    pub scale: f32,
}

impl Placement {
    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// One page of an output document
#[derive(Debug, Clone)]
pub struct PageSpec {
    /// Position of the page within its document (0-based)
    pub index: usize,
    pub asset: ImageAsset,
}

/// One exportable file: an ordered list of pages
#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub file_name: String,
    pub pages: Vec<PageSpec>,
}

impl OutputDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Document title: the file name without its extension
    pub fn title(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name)
    }
}
