pub mod builder;
pub mod constants;
pub mod ingest;
pub mod layout;
mod normalize;
mod options;
pub mod output;
pub mod render;
mod session;
mod stats;
mod types;

pub use builder::{CancelFlag, build_document, build_document_blocking, build_document_with};
pub use ingest::{IncomingFile, IngestReport, add_images, load_image_file, load_image_files};
pub use layout::{NamingContext, OutputDocument, PageSpec, Placement, resolve_placement, sequence};
pub use normalize::*;
pub use options::*;
pub use output::{RenderedDocument, save_document, save_documents};
pub use session::*;
pub use stats::calculate_statistics;
pub use types::*;
