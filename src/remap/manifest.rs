//! Cross-split class manifest reconciliation.
//!
//! Each split's remap derives its own name list; splits produced by
//! independent export runs do not always agree. The manifest is the
//! single ordered name list handed to training consumers, reconciled
//! from per-split lists and an optional external hint file.

use std::fs;
use std::path::Path;

use crate::error::PrepError;

/// Manifest contents when no class names are discoverable anywhere.
const FALLBACK_CLASS: &str = "custom";

/// Accumulates per-split class-name lists and reconciles them with an
/// optional external hint list into one authoritative manifest.
///
/// Append-only; splits are recorded in processing order and the builder
/// keeps only the running maximum count and the longest list seen.
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder {
    hints: Vec<String>,
    longest: Vec<String>,
    max_classes: usize,
}

impl ManifestBuilder {
    /// Creates a builder seeded with external hint names (possibly empty).
    pub fn new(hints: Vec<String>) -> Self {
        Self {
            hints,
            ..Default::default()
        }
    }

    /// The external hint names, as passed to each split's remap.
    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    /// Records one split's final class names.
    pub fn add_split(&mut self, names: &[String]) {
        self.max_classes = self.max_classes.max(names.len());
        if names.len() > self.longest.len() {
            self.longest = names.to_vec();
        }
    }

    /// Applies the selection policy, in priority order: the hint list
    /// when it covers the widest split (truncated to that width), else
    /// the longest per-split list, else a single fallback class.
    pub fn finish(self) -> Vec<String> {
        if self.max_classes > 0 && !self.hints.is_empty() && self.hints.len() >= self.max_classes {
            return self.hints.into_iter().take(self.max_classes).collect();
        }
        if !self.longest.is_empty() {
            return self.longest;
        }
        vec![FALLBACK_CLASS.to_string()]
    }
}

/// Reads a one-name-per-line hint file.
///
/// Names are trimmed and blank lines skipped; a missing file yields no
/// hints rather than an error.
pub fn read_class_hints(path: &Path) -> Result<Vec<String>, PrepError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PrepError::HintFileRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    Ok(data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Writes the manifest, one class name per line, newline-terminated.
pub fn write_manifest(path: &Path, names: &[String]) -> Result<(), PrepError> {
    let mut contents = names.join("\n");
    contents.push('\n');
    fs::write(path, contents).map_err(PrepError::Io)
}
