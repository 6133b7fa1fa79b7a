use std::path::PathBuf;
use thiserror::Error;

/// The main error type for labelprep operations.
///
/// Structural failures (unreadable JSON, empty category tables, missing
/// split directories) surface through this type with the offending path
/// attached. Per-record anomalies -- dangling category references, crowd
/// annotations, images with no document entry -- never become errors;
/// they are absorbed into the counts on [`crate::report::SplitReport`].
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No source COCO JSON found in {split_dir}")]
    MissingSource { split_dir: PathBuf },

    #[error("No categories found in {path}")]
    EmptyCategoryTable { path: PathBuf },

    #[error("Split directory missing: {path}")]
    SplitDirMissing { path: PathBuf },

    #[error("Failed to read class hint file {path}: {source}")]
    HintFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
