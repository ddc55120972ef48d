//! Shared constants for page layout and PDF output

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Layout Settings
// =============================================================================

/// Default margin around each image (mm)
pub const DEFAULT_MARGIN_MM: f32 = 10.0;

/// Largest margin a user may choose (mm)
pub const MAX_MARGIN_MM: f32 = 50.0;

// =============================================================================
// Captions
// =============================================================================

/// Caption font size (points)
pub const CAPTION_FONT_SIZE_PT: f32 = 8.0;

/// Lowest the caption baseline may sit above the page edge (mm)
pub const CAPTION_MIN_OFFSET_MM: f32 = 2.0;

/// Caption fill color, mid gray
pub const CAPTION_GRAY: [f32; 3] = [0.45, 0.45, 0.45];

// =============================================================================
// Output
// =============================================================================

pub const PDF_MIME_TYPE: &str = "application/pdf";

pub const PDF_EXTENSION: &str = "pdf";

/// Prefix of merged output file names
pub const MERGED_FILE_PREFIX: &str = "images";
