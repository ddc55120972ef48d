//! PDF rendering
//!
//! The document builder talks to a [`DocumentBackend`]: a narrow capability
//! interface for creating pages, drawing images and text, and serializing.
//! [`LopdfBackend`] is the default implementation.

mod image;
mod pdf;

pub use pdf::LopdfBackend;

use crate::layout::Placement;
use crate::normalize::NormalizedImage;
use crate::options::CaptionStyle;
use crate::types::{EffectivePageSize, Result};

/// A document encoder that receives pages in order.
///
/// All coordinates are millimeters from the bottom-left corner of the page.
pub trait DocumentBackend {
    /// Start a new page; subsequent drawing goes to it
    fn create_page(&mut self, size: EffectivePageSize) -> Result<()>;

    /// Draw an image scaled into `rect` on the current page
    fn draw_image(&mut self, image: &NormalizedImage, rect: &Placement) -> Result<()>;

    /// Draw a single line of text with its baseline starting at `position`
    fn draw_text(&mut self, text: &str, position: (f32, f32), style: &CaptionStyle) -> Result<()>;

    /// Serialize every page, in creation order, into one buffer
    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}
