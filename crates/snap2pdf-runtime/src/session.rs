use crate::{DocumentSummary, ImageSummary, SessionCommand, SessionUpdate};
use snap2pdf_core::{
    CancelFlag, LayoutMode, LayoutSettings, NamingContext, RenderedDocument, WorkingSet,
    add_images, calculate_statistics, convert, load_image_files, save_documents,
};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// State of one composition session.
///
/// Owns the working set; only add/remove/reorder commands change it.
pub struct Session {
    working_set: WorkingSet,
    settings: LayoutSettings,
    /// Output of the last conversion, kept for save retries
    rendered: Vec<RenderedDocument>,
    cancel: CancelFlag,
}

impl Session {
    pub fn new(cancel: CancelFlag) -> Self {
        Self {
            working_set: WorkingSet::new(),
            settings: LayoutSettings::default(),
            rendered: Vec::new(),
            cancel,
        }
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn rendered(&self) -> &[RenderedDocument] {
        &self.rendered
    }

    fn summaries(&self) -> Vec<ImageSummary> {
        self.working_set
            .iter()
            .map(|asset| ImageSummary {
                id: asset.id(),
                name: asset.display_name().to_string(),
                width: asset.pixel_width(),
                height: asset.pixel_height(),
                byte_len: asset.byte_len(),
            })
            .collect()
    }

    fn send_working_set(&self, update_tx: &mpsc::UnboundedSender<SessionUpdate>) {
        let _ = update_tx.send(SessionUpdate::WorkingSetChanged {
            items: self.summaries(),
        });
    }

    /// Process one command, reporting through `update_tx`
    pub async fn handle(
        &mut self,
        cmd: SessionCommand,
        update_tx: &mpsc::UnboundedSender<SessionUpdate>,
    ) {
        match cmd {
            SessionCommand::AddFiles { paths } => {
                let (files, load_errors) = load_image_files(&paths).await;
                let mut report = add_images(&mut self.working_set, files);
                report.errors.extend(load_errors);
                let _ = update_tx.send(SessionUpdate::ImagesAdded {
                    added: report.added.len(),
                    skipped: report.skipped,
                    errors: report.errors.iter().map(ToString::to_string).collect(),
                });
                self.send_working_set(update_tx);
            }
            SessionCommand::AddImages { files } => {
                let report = add_images(&mut self.working_set, files);
                let _ = update_tx.send(SessionUpdate::ImagesAdded {
                    added: report.added.len(),
                    skipped: report.skipped,
                    errors: report.errors.iter().map(ToString::to_string).collect(),
                });
                self.send_working_set(update_tx);
            }
            SessionCommand::Remove { id } => {
                if self.working_set.remove(id).is_some() {
                    self.send_working_set(update_tx);
                } else {
                    let _ = update_tx.send(SessionUpdate::Error {
                        message: format!("{} is not in the working set", id),
                    });
                }
            }
            SessionCommand::MoveUp { index } => {
                if self.working_set.move_up(index) {
                    self.send_working_set(update_tx);
                }
            }
            SessionCommand::MoveDown { index } => {
                if self.working_set.move_down(index) {
                    self.send_working_set(update_tx);
                }
            }
            SessionCommand::MoveTo { from, to } => {
                if self.working_set.move_to(from, to) {
                    self.send_working_set(update_tx);
                }
            }
            SessionCommand::Clear => {
                self.working_set.clear();
                self.send_working_set(update_tx);
            }
            SessionCommand::UpdateSettings { settings } => {
                self.apply_settings(settings, update_tx);
            }
            SessionCommand::LoadSettings { path } => match LayoutSettings::load(&path).await {
                Ok(settings) => self.apply_settings(settings, update_tx),
                Err(e) => {
                    let _ = update_tx.send(SessionUpdate::Error {
                        message: format!("Failed to load settings: {e}"),
                    });
                }
            },
            SessionCommand::SaveSettings { path } => match self.settings.save(&path).await {
                Ok(()) => {
                    let _ = update_tx.send(SessionUpdate::SettingsSaved { path });
                }
                Err(e) => {
                    let _ = update_tx.send(SessionUpdate::Error {
                        message: format!("Failed to save settings: {e}"),
                    });
                }
            },
            SessionCommand::CalculateStats { mode } => {
                let stats = calculate_statistics(&self.working_set, mode);
                let _ = update_tx.send(SessionUpdate::StatsCalculated { stats });
            }
            SessionCommand::Convert { mode } => {
                self.handle_convert(mode, update_tx).await;
            }
            SessionCommand::Save { output_dir } => {
                self.handle_save(output_dir, update_tx).await;
            }
        }
    }

    fn apply_settings(
        &mut self,
        settings: LayoutSettings,
        update_tx: &mpsc::UnboundedSender<SessionUpdate>,
    ) {
        match settings.validate() {
            Ok(()) => {
                self.settings = settings.clone();
                let _ = update_tx.send(SessionUpdate::SettingsChanged { settings });
            }
            Err(e) => {
                let _ = update_tx.send(SessionUpdate::Error {
                    message: format!("Invalid settings: {e}"),
                });
            }
        }
    }

    async fn handle_convert(
        &mut self,
        mode: LayoutMode,
        update_tx: &mpsc::UnboundedSender<SessionUpdate>,
    ) {
        if self.working_set.is_empty() {
            log::debug!("Convert requested with an empty working set");
            let _ = update_tx.send(SessionUpdate::ConversionComplete {
                documents: Vec::new(),
                failures: Vec::new(),
            });
            return;
        }

        self.cancel.reset();
        let result = convert(
            &self.working_set,
            &self.settings,
            mode,
            &NamingContext::now(),
            &self.cancel,
            |current, total| {
                let _ = update_tx.send(SessionUpdate::Progress {
                    operation: "Converting".to_string(),
                    current,
                    total,
                });
            },
        )
        .await;

        match result {
            Ok(outcome) => {
                let documents = outcome
                    .documents
                    .iter()
                    .map(|doc| DocumentSummary {
                        file_name: doc.file_name.clone(),
                        page_count: doc.page_count,
                        byte_len: doc.bytes.len(),
                    })
                    .collect();
                let failures = outcome
                    .failures
                    .iter()
                    .map(|f| format!("{}: {}", f.file_name, f.error))
                    .collect();
                self.rendered = outcome.documents;
                let _ = update_tx.send(SessionUpdate::ConversionComplete {
                    documents,
                    failures,
                });
            }
            Err(e) => {
                let _ = update_tx.send(SessionUpdate::Error {
                    message: format!("Failed to convert: {e}"),
                });
            }
        }
    }

    async fn handle_save(
        &mut self,
        output_dir: PathBuf,
        update_tx: &mpsc::UnboundedSender<SessionUpdate>,
    ) {
        if self.rendered.is_empty() {
            let _ = update_tx.send(SessionUpdate::Error {
                message: "Nothing to save; convert first".to_string(),
            });
            return;
        }

        match save_documents(&self.rendered, &output_dir).await {
            Ok(paths) => {
                let _ = update_tx.send(SessionUpdate::Saved { paths });
            }
            Err(e) => {
                let _ = update_tx.send(SessionUpdate::Error {
                    message: format!("{e}"),
                });
            }
        }
    }
}
