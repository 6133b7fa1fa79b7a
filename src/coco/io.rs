//! COCO JSON reading, writing, and source-document location.
//!
//! Exports land in split directories under generated names
//! (`coco_annotations_<id>.json`); the remap stage stabilizes them to a
//! fixed name. The locator must therefore never treat the stabilized
//! file as a fresh source, or a re-run would consume its own output.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use super::model::CocoDocument;
use crate::error::PrepError;

/// File name the remap stage writes; excluded from source candidates.
pub const STABILIZED_FILE_NAME: &str = "coco_annotations.json";

/// Prefix that marks a candidate source document in a split directory.
pub const SOURCE_PREFIX: &str = "coco_";

/// A located source document plus how many candidates were eligible.
///
/// `candidates > 1` means the pick was the lexicographically first file
/// name -- deterministic, but worth surfacing to the caller.
#[derive(Clone, Debug)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub candidates: usize,
}

/// Reads an annotation document from a COCO JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_coco_json(path: &Path) -> Result<CocoDocument, PrepError> {
    let file = File::open(path).map_err(PrepError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| PrepError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes an annotation document as pretty-printed COCO JSON,
/// fully overwriting any prior content at `path`.
///
/// Serialization is deterministic, so rewriting an unchanged document
/// produces byte-identical output.
pub fn write_coco_json(path: &Path, document: &CocoDocument) -> Result<(), PrepError> {
    let file = File::create(path).map_err(PrepError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, document).map_err(|source| PrepError::CocoJsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a document from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<CocoDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Writes a document to a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn to_coco_string(document: &CocoDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(document)
}

/// Selects the authoritative source document in a split directory.
///
/// Candidates are plain files named `coco_*.json`, excluding the
/// stabilized output name. With several candidates the lexicographically
/// first file name wins; with none the split has no usable source and a
/// [`PrepError::MissingSource`] is returned (also when the directory
/// itself does not exist, so callers can treat both as a skippable
/// split).
pub fn find_source_document(split_dir: &Path) -> Result<SourceDocument, PrepError> {
    let entries = match fs::read_dir(split_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PrepError::MissingSource {
                split_dir: split_dir.to_path_buf(),
            });
        }
        Err(err) => return Err(PrepError::Io(err)),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(PrepError::Io)?;
        if !entry.file_type().map_err(PrepError::Io)?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(SOURCE_PREFIX)
            && name.ends_with(".json")
            && name != STABILIZED_FILE_NAME
        {
            candidates.push(name.to_string());
        }
    }

    candidates.sort();
    match candidates.first() {
        Some(name) => Ok(SourceDocument {
            path: split_dir.join(name),
            candidates: candidates.len(),
        }),
        None => Err(PrepError::MissingSource {
            split_dir: split_dir.to_path_buf(),
        }),
    }
}
