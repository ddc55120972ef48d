//! Image placement within a page
//!
//! Fits an image into the printable area of a page (the page minus a uniform
//! margin), preserving aspect ratio and centering it on both axes.

use crate::types::EffectivePageSize;

use super::Placement;

/// Calculate the printable area of a page as `(margin, usable_width, usable_height)`.
///
/// A margin that would leave no usable area on either axis is dropped to
/// zero for the whole page. Negative and non-finite margins are treated as zero.
pub fn usable_area(page: EffectivePageSize, margin_mm: f32) -> (f64, f64, f64) {
    let page_width = f64::from(page.width_mm.max(0.0));
    let page_height = f64::from(page.height_mm.max(0.0));
    let margin = if margin_mm.is_finite() {
        f64::from(margin_mm.max(0.0))
    } else {
        0.0
    };

    let usable_width = page_width - 2.0 * margin;
    let usable_height = page_height - 2.0 * margin;

    if usable_width <= 0.0 || usable_height <= 0.0 {
        (0.0, page_width, page_height)
    } else {
        (margin, usable_width, usable_height)
    }
}

/// Calculate where an image of the given pixel size is drawn on a page.
///
/// The image is scaled by `min(usable_w / px_w, usable_h / px_h)`, which may
/// be greater than 1 (small images are enlarged to fill the page), and
/// centered inside the margins.
///
/// Images with a zero width or height have no usable aspect ratio; they fill
/// the whole printable area instead.
///
/// # Arguments
/// * `pixel_width` - Source image width in pixels
/// * `pixel_height` - Source image height in pixels
/// * `page` - Page dimensions after orientation
/// * `margin_mm` - Uniform margin on every side
pub fn resolve_placement(
    pixel_width: u32,
    pixel_height: u32,
    page: EffectivePageSize,
    margin_mm: f32,
) -> Placement {
    let (margin, usable_width, usable_height) = usable_area(page, margin_mm);

    let (src_width, src_height) = if pixel_width == 0 || pixel_height == 0 {
        (usable_width, usable_height)
    } else {
        (f64::from(pixel_width), f64::from(pixel_height))
    };

    let scale = if src_width > 0.0 && src_height > 0.0 {
        (usable_width / src_width).min(usable_height / src_height)
    } else {
        0.0
    };

    let width = src_width * scale;
    let height = src_height * scale;

    Placement {
        x: (margin + (usable_width - width) / 2.0) as f32,
        y: (margin + (usable_height - height) / 2.0) as f32,
        width: width as f32,
        height: height as f32,
        scale: scale as f32,
    }
}
