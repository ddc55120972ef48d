//! Layout calculation for image pages
//!
//! This module handles the geometric and ordering side of a conversion:
//! - Placement of an image inside the printable area of a page
//! - Grouping an ordered image list into output documents and pages

mod placement;
mod sequence;
mod types;

pub use placement::*;
pub use sequence::*;
pub use types::*;
