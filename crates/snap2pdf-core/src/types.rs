use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Cannot add {name}: {reason}")]
    Ingestion { name: String, reason: String },
    #[error("Failed to decode {image_id}: {reason}")]
    Decode { image_id: ImageId, reason: String },
    #[error("Layout error: {0}")]
    Layout(String),
    #[error("Failed to embed {} on page {}: {}", .image_id, .page_index + 1, .reason)]
    Embed {
        image_id: ImageId,
        page_index: usize,
        reason: String,
    },
    #[error("Failed to save {file_name}: {source}")]
    Save {
        file_name: String,
        source: std::io::Error,
    },
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to build")]
    NoPages,
    #[error("Build cancelled after {completed_pages} page(s)")]
    Cancelled { completed_pages: usize },
}

pub type Result<T> = std::result::Result<T, ConvertError>;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for an ingested image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl ImageId {
    pub fn next() -> Self {
        ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "img-{}", self.0)
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Portrait: the catalog dimensions as listed (width < height)
    #[default]
    Portrait,
    /// Landscape: width and height swapped
    Landscape,
}

/// Named page sizes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Square,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PageSize {
    /// The fixed catalog offered to users (everything except `Custom`)
    pub const CATALOG: [PageSize; 5] = [
        PageSize::A4,
        PageSize::A5,
        PageSize::Letter,
        PageSize::Legal,
        PageSize::Square,
    ];

    /// Get base dimensions (always portrait)
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Square => (215.9, 215.9),
            PageSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Get dimensions with orientation applied
    pub fn effective(self, orientation: Orientation) -> EffectivePageSize {
        let (w, h) = self.dimensions_mm();
        match orientation {
            Orientation::Portrait => EffectivePageSize::new(w, h),
            Orientation::Landscape => EffectivePageSize::new(h, w),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
            PageSize::Square => "Square",
            PageSize::Custom { .. } => "Custom",
        }
    }

    /// Look up a catalog entry by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<PageSize> {
        Self::CATALOG
            .into_iter()
            .find(|size| size.name().eq_ignore_ascii_case(name))
    }
}

/// Page dimensions in millimeters after the orientation swap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectivePageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl EffectivePageSize {
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }
}

/// Encoding of the bytes an image arrived with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Png,
    Jpeg,
    /// Anything else the decoder understands (WebP, GIF, BMP, TIFF, ...)
    Other,
}

impl SourceEncoding {
    pub fn from_format(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Png => SourceEncoding::Png,
            image::ImageFormat::Jpeg => SourceEncoding::Jpeg,
            _ => SourceEncoding::Other,
        }
    }
}

/// An ingested image. Immutable once created; the byte buffer is shared.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    id: ImageId,
    display_name: String,
    bytes: Arc<[u8]>,
    pixel_width: u32,
    pixel_height: u32,
    source_encoding: SourceEncoding,
}

impl ImageAsset {
    pub fn new(
        display_name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
        pixel_width: u32,
        pixel_height: u32,
        source_encoding: SourceEncoding,
    ) -> Self {
        Self {
            id: ImageId::next(),
            display_name: display_name.into(),
            bytes: bytes.into(),
            pixel_width,
            pixel_height,
            source_encoding,
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn source_encoding(&self) -> SourceEncoding {
        self.source_encoding
    }
}

/// How images are grouped into output documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutMode {
    /// One document, one page per image
    #[default]
    Merged,
    /// One single-page document per image
    OnePerDocument,
}

/// Summary shown before converting
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionStatistics {
    /// Images in the working set
    pub image_count: usize,
    /// Documents the conversion will produce
    pub document_count: usize,
    /// Total pages across all documents
    pub page_count: usize,
    /// Sum of the source file sizes
    pub total_input_bytes: usize,
}

impl ConversionStatistics {
    pub fn total_size_mb(&self) -> f64 {
        self.total_input_bytes as f64 / (1024.0 * 1024.0)
    }
}
