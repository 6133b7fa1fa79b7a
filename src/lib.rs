//! Labelprep: training-ready annotation normalization.
//!
//! Synthetic-data exports arrive as one COCO JSON document per dataset
//! split, each produced independently, under generated file names and
//! with sparse, non-contiguous category ids. Labelprep turns those
//! exports into the two representations training pipelines expect:
//!
//! - a stabilized per-split COCO document with contiguous `0..N-1`
//!   category ids, plus a merged class manifest shared across splits
//!   (the `remap` stage), and
//! - one normalized, center-format YOLO label file per rendered image
//!   (the `labels` stage).
//!
//! Both stages are idempotent and independently invokable; `prepare`
//! runs them together with a single shared category index map.
//!
//! # Modules
//!
//! - [`coco`]: annotation document model and I/O
//! - [`mapping`]: dense category index map shared by both stages
//! - [`remap`]: category-id remapping and manifest reconciliation
//! - [`labels`]: normalized label emission
//! - [`report`]: structured run diagnostics
//! - [`error`]: error types for labelprep operations

pub mod coco;
pub mod error;
pub mod labels;
pub mod mapping;
pub mod remap;
pub mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::mapping::CategoryIndexMap;
use crate::remap::manifest::{self, ManifestBuilder};
use crate::report::{PipelineReport, SplitReport};

pub use error::PrepError;

/// Hint file read from the dataset root unless overridden.
const DEFAULT_HINT_FILE: &str = "classes_unique.txt";

/// Manifest written to the dataset root unless overridden.
const DEFAULT_CLASSMAP_FILE: &str = "classmap.txt";

/// The labelprep CLI application.
#[derive(Parser)]
#[command(name = "labelprep")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Rewrite each split's annotation document with contiguous category ids.
    Remap(RemapArgs),

    /// Emit a normalized YOLO label file per image in each split.
    Labels(LabelArgs),

    /// Run both stages with one shared category mapping per split.
    Prepare(PrepareArgs),
}

/// Arguments shared by every subcommand.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Dataset root containing one subdirectory per split.
    root: PathBuf,

    /// Comma-separated split names to process.
    #[arg(long, default_value = "train,val,test", value_delimiter = ',')]
    splits: Vec<String>,
}

/// Arguments for the remap subcommand.
#[derive(clap::Args)]
struct RemapArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Class-name hint file, one name per line (default:
    /// <ROOT>/classes_unique.txt; a missing file is fine).
    #[arg(long)]
    class_hints: Option<PathBuf>,

    /// Where to write the merged class manifest (default:
    /// <ROOT>/classmap.txt).
    #[arg(long)]
    classmap: Option<PathBuf>,
}

/// Arguments for the labels subcommand.
#[derive(clap::Args)]
struct LabelArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Also write an Ultralytics data.yaml at the dataset root.
    #[arg(long)]
    data_yaml: bool,
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Class-name hint file, one name per line (default:
    /// <ROOT>/classes_unique.txt; a missing file is fine).
    #[arg(long)]
    class_hints: Option<PathBuf>,

    /// Where to write the merged class manifest (default:
    /// <ROOT>/classmap.txt).
    #[arg(long)]
    classmap: Option<PathBuf>,

    /// Also write an Ultralytics data.yaml at the dataset root.
    #[arg(long)]
    data_yaml: bool,
}

/// Run the labelprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Remap(args)) => run_remap(&args),
        Some(Commands::Labels(args)) => run_labels(&args),
        Some(Commands::Prepare(args)) => run_prepare(&args),
        None => {
            println!("labelprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Training-ready annotation normalization.");
            println!();
            println!("Run 'labelprep --help' for usage information.");
            Ok(())
        }
    }
}

fn hint_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(DEFAULT_HINT_FILE))
}

fn classmap_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.join(DEFAULT_CLASSMAP_FILE))
}

/// Execute the remap subcommand.
fn run_remap(args: &RemapArgs) -> Result<(), PrepError> {
    let root = &args.dataset.root;
    let hints = manifest::read_class_hints(&hint_path(root, args.class_hints.as_deref()))?;
    let mut builder = ManifestBuilder::new(hints);
    let mut pipeline = PipelineReport::default();

    for split in &args.dataset.splits {
        let split_dir = root.join(split);
        if !split_dir.is_dir() {
            return Err(PrepError::SplitDirMissing { path: split_dir });
        }

        match remap::remap_split(&split_dir, builder.hints()) {
            Ok(done) => {
                builder.add_split(&done.outcome.class_names);
                let report = SplitReport {
                    split: split.clone(),
                    source: Some(done.source.path),
                    candidates: done.source.candidates,
                    classes: done.outcome.class_names.len(),
                    dropped_annotations: done.outcome.dropped_annotations,
                    ..Default::default()
                };
                println!("{report}");
                pipeline.add(report);
            }
            Err(PrepError::MissingSource { .. }) => {
                let report = SplitReport::skipped(split.clone());
                println!("{report}");
                pipeline.add(report);
            }
            Err(err) => return Err(err),
        }
    }

    let classmap = classmap_path(root, args.classmap.as_deref());
    let names = builder.finish();
    manifest::write_manifest(&classmap, &names)?;
    println!("[classmap] wrote {} ({} classes)", classmap.display(), names.len());
    println!("{pipeline}");

    Ok(())
}

/// Execute the labels subcommand.
fn run_labels(args: &LabelArgs) -> Result<(), PrepError> {
    let root = &args.dataset.root;
    let lister = labels::FsDirectoryLister;
    let mut builder = ManifestBuilder::new(Vec::new());
    let mut pipeline = PipelineReport::default();

    for split in &args.dataset.splits {
        let split_dir = root.join(split);
        let image_dir = root.join("images").join(split);
        let label_dir = root.join("labels").join(split);

        match labels::convert_split(&split_dir, &image_dir, &label_dir, &lister) {
            Ok(done) => {
                builder.add_split(&done.class_names);
                let report = SplitReport {
                    split: split.clone(),
                    source: Some(done.source.path),
                    candidates: done.source.candidates,
                    classes: done.class_names.len(),
                    dropped_annotations: done.outcome.dropped_annotations,
                    unmatched_images: done.outcome.unmatched_images,
                    label_files: done.outcome.label_files,
                    skipped: false,
                };
                println!("{report}");
                pipeline.add(report);
            }
            Err(PrepError::MissingSource { .. }) => {
                let report = SplitReport::skipped(split.clone());
                println!("{report}");
                pipeline.add(report);
            }
            Err(err) => return Err(err),
        }
    }

    if args.data_yaml {
        let path = root.join("data.yaml");
        let names = builder.finish();
        labels::write_data_yaml(&path, &names)?;
        println!("[data.yaml] wrote {} ({} classes)", path.display(), names.len());
    }
    println!("{pipeline}");

    Ok(())
}

/// Execute the prepare subcommand.
///
/// Per split, the category index map is computed once from the source
/// document and handed to both the remap writer and the label emitter,
/// so the stabilized document and the label files can never disagree on
/// a dense index.
fn run_prepare(args: &PrepareArgs) -> Result<(), PrepError> {
    let root = &args.dataset.root;
    let hints = manifest::read_class_hints(&hint_path(root, args.class_hints.as_deref()))?;
    let mut builder = ManifestBuilder::new(hints);
    let lister = labels::FsDirectoryLister;
    let mut pipeline = PipelineReport::default();

    for split in &args.dataset.splits {
        let split_dir = root.join(split);
        if !split_dir.is_dir() {
            return Err(PrepError::SplitDirMissing { path: split_dir });
        }

        let source = match coco::io::find_source_document(&split_dir) {
            Ok(source) => source,
            Err(PrepError::MissingSource { .. }) => {
                let report = SplitReport::skipped(split.clone());
                println!("{report}");
                pipeline.add(report);
                continue;
            }
            Err(err) => return Err(err),
        };

        let document = coco::io::read_coco_json(&source.path)?;
        let index_map = CategoryIndexMap::from_categories(&document.categories, &source.path)?;

        let mut stabilized = document.clone();
        let outcome = remap::remap_document(&mut stabilized, &index_map, builder.hints());
        coco::io::write_coco_json(&split_dir.join(coco::io::STABILIZED_FILE_NAME), &stabilized)?;
        builder.add_split(&outcome.class_names);

        let image_dir = root.join("images").join(split);
        if !image_dir.is_dir() {
            return Err(PrepError::SplitDirMissing { path: image_dir });
        }
        let label_dir = root.join("labels").join(split);
        let label_outcome =
            labels::convert_document(&document, &index_map, &image_dir, &label_dir, &lister)?;

        let report = SplitReport {
            split: split.clone(),
            source: Some(source.path),
            candidates: source.candidates,
            classes: outcome.class_names.len(),
            // The label stage drops the same dangling references the
            // remap already counted document-wide.
            dropped_annotations: outcome.dropped_annotations,
            unmatched_images: label_outcome.unmatched_images,
            label_files: label_outcome.label_files,
            skipped: false,
        };
        println!("{report}");
        pipeline.add(report);
    }

    let classmap = classmap_path(root, args.classmap.as_deref());
    let names = builder.finish();
    manifest::write_manifest(&classmap, &names)?;
    println!("[classmap] wrote {} ({} classes)", classmap.display(), names.len());

    if args.data_yaml {
        let path = root.join("data.yaml");
        labels::write_data_yaml(&path, &names)?;
        println!("[data.yaml] wrote {} ({} classes)", path.display(), names.len());
    }
    println!("{pipeline}");

    Ok(())
}
