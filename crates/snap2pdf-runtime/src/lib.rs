use std::path::PathBuf;

// Re-export types from the library crate
pub use snap2pdf_core::{
    CancelFlag, ConversionStatistics, ImageId, IncomingFile, LayoutMode, LayoutSettings,
    RenderedDocument,
};

mod session;
mod worker;

pub use session::Session;
pub use worker::{SessionHandle, session_task, spawn_session};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum SessionCommand {
    /// Read files from disk and add the images among them
    AddFiles {
        paths: Vec<PathBuf>,
    },
    /// Add files already in memory (drag and drop, picker)
    AddImages {
        files: Vec<IncomingFile>,
    },
    Remove {
        id: ImageId,
    },
    MoveUp {
        index: usize,
    },
    MoveDown {
        index: usize,
    },
    MoveTo {
        from: usize,
        to: usize,
    },
    Clear,
    UpdateSettings {
        settings: LayoutSettings,
    },
    LoadSettings {
        path: PathBuf,
    },
    SaveSettings {
        path: PathBuf,
    },
    CalculateStats {
        mode: LayoutMode,
    },
    Convert {
        mode: LayoutMode,
    },
    /// Write the documents from the last conversion into a directory.
    /// Can be repeated after a failure without converting again.
    Save {
        output_dir: PathBuf,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    ImagesAdded {
        added: usize,
        skipped: Vec<String>,
        errors: Vec<String>,
    },
    WorkingSetChanged {
        items: Vec<ImageSummary>,
    },
    SettingsChanged {
        settings: LayoutSettings,
    },
    SettingsSaved {
        path: PathBuf,
    },
    StatsCalculated {
        stats: ConversionStatistics,
    },
    ConversionComplete {
        documents: Vec<DocumentSummary>,
        failures: Vec<String>,
    },
    Saved {
        paths: Vec<PathBuf>,
    },
    Error {
        message: String,
    },
}

/// What the UI shows for one image in the working set
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub id: ImageId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub byte_len: usize,
}

/// A document produced by the last conversion
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub file_name: String,
    pub page_count: usize,
    pub byte_len: usize,
}
