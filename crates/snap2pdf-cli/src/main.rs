mod logger;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use snap2pdf_core::{
    CancelFlag, LayoutMode, LayoutSettings, NamingContext, WorkingSet, add_images,
    calculate_statistics, convert, load_image_files, save_documents,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snap2pdf", about = "Compose images into PDF documents", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Place images on pages and write PDF files
    Convert {
        /// Input image files, in page order
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// One merged document, or one document per image
        #[arg(long, default_value = "merged", value_enum)]
        mode: ModeArg,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Write the effective settings to this JSON file
        #[arg(long)]
        save_settings: Option<PathBuf>,

        /// Show statistics only, don't generate PDF
        #[arg(long)]
        stats_only: bool,
    },

    /// Show what a conversion would produce
    Stats {
        /// Input image files
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        #[arg(long, default_value = "merged", value_enum)]
        mode: ModeArg,
    },
}

/// Layout flags; anything not given falls back to the settings file, then defaults
#[derive(Args)]
struct LayoutArgs {
    /// Settings JSON file to start from
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Page size
    #[arg(long, value_enum)]
    page: Option<PageArg>,

    /// Custom page width in mm (with --page-height)
    #[arg(long, requires = "page_height")]
    page_width: Option<f32>,

    /// Custom page height in mm (with --page-width)
    #[arg(long, requires = "page_width")]
    page_height: Option<f32>,

    /// Page orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Margin in mm (clamped to 0-50)
    #[arg(long)]
    margin: Option<f32>,

    /// Print the image name under each image
    #[arg(long)]
    captions: bool,

    /// Downscale images whose longest side exceeds this many pixels
    #[arg(long)]
    max_dimension: Option<u32>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Merged,
    Separate,
}

#[derive(Clone, Copy, ValueEnum)]
enum PageArg {
    A4,
    A5,
    Letter,
    Legal,
    Square,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<ModeArg> for LayoutMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Merged => Self::Merged,
            ModeArg::Separate => Self::OnePerDocument,
        }
    }
}

impl From<PageArg> for snap2pdf_core::PageSize {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::A4 => Self::A4,
            PageArg::A5 => Self::A5,
            PageArg::Letter => Self::Letter,
            PageArg::Legal => Self::Legal,
            PageArg::Square => Self::Square,
        }
    }
}

impl From<OrientationArg> for snap2pdf_core::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl LayoutArgs {
    async fn resolve(&self) -> Result<LayoutSettings> {
        let mut settings = match &self.settings {
            Some(path) => LayoutSettings::load(path)
                .await
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => LayoutSettings::default(),
        };

        if let Some(page) = self.page {
            settings.page_size = page.into();
        }
        if let (Some(width_mm), Some(height_mm)) = (self.page_width, self.page_height) {
            settings.page_size = snap2pdf_core::PageSize::Custom {
                width_mm,
                height_mm,
            };
        }
        if let Some(orientation) = self.orientation {
            settings.orientation = orientation.into();
        }
        if let Some(margin) = self.margin {
            settings.margin_mm = margin;
        }
        if self.captions {
            settings.caption.enabled = true;
        }
        if self.max_dimension.is_some() {
            settings.max_image_dimension = self.max_dimension;
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Read the inputs into a working set, logging anything left out
async fn load_working_set(input: &[PathBuf]) -> Result<WorkingSet> {
    let (files, load_errors) = load_image_files(input).await;
    for e in &load_errors {
        log::warn!("{}", e);
    }

    let mut set = WorkingSet::new();
    let report = add_images(&mut set, files);
    for name in &report.skipped {
        log::info!("Skipped {} (not an image)", name);
    }

    if set.is_empty() {
        bail!("None of the inputs could be used as an image");
    }
    Ok(set)
}

fn print_statistics(set: &WorkingSet, mode: LayoutMode) {
    let stats = calculate_statistics(set, mode);
    println!("Conversion Statistics:");
    println!("  Images: {}", stats.image_count);
    println!("  Documents: {}", stats.document_count);
    println!("  Pages: {}", stats.page_count);
    println!("  Input size: {:.2} MB", stats.total_size_mb());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Warn
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logger::StderrLogger::new(level).init()?;

    match cli.command {
        Commands::Stats { input, mode } => {
            let set = load_working_set(&input).await?;
            print_statistics(&set, mode.into());
        }

        Commands::Convert {
            input,
            output,
            mode,
            layout,
            save_settings,
            stats_only,
        } => {
            let mode = mode.into();
            let settings = layout.resolve().await?;
            let set = load_working_set(&input).await?;
            print_statistics(&set, mode);

            if stats_only {
                return Ok(());
            }

            let cancel = CancelFlag::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, stopping after the current page");
                    ctrl_c.cancel();
                }
            });

            tokio::fs::create_dir_all(&output)
                .await
                .with_context(|| format!("Failed to create {}", output.display()))?;

            let outcome = convert(
                &set,
                &settings,
                mode,
                &NamingContext::now(),
                &cancel,
                |done, total| log::info!("Built document {}/{}", done, total),
            )
            .await?;

            let paths = save_documents(&outcome.documents, &output).await?;
            for path in &paths {
                println!("Wrote {}", path.display());
            }

            if let Some(path) = save_settings {
                settings
                    .save(&path)
                    .await
                    .with_context(|| format!("Failed to save settings to {}", path.display()))?;
                println!("Settings → {}", path.display());
            }

            if outcome.was_cancelled() {
                bail!("Conversion cancelled");
            }
            if !outcome.is_complete() {
                for failure in &outcome.failures {
                    log::error!("{}: {}", failure.file_name, failure.error);
                }
                bail!(
                    "{} of {} documents failed",
                    outcome.failures.len(),
                    outcome.failures.len() + outcome.documents.len()
                );
            }
        }
    }

    Ok(())
}
