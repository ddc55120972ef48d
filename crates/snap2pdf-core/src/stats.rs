use crate::layout::document_count;
use crate::session::WorkingSet;
use crate::types::*;

/// Calculate what a conversion of the working set would produce
pub fn calculate_statistics(set: &WorkingSet, mode: LayoutMode) -> ConversionStatistics {
    let image_count = set.len();

    ConversionStatistics {
        image_count,
        document_count: document_count(image_count, mode),
        // Every image becomes exactly one page in either mode
        page_count: image_count,
        total_input_bytes: set.total_bytes(),
    }
}
