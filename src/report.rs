//! Structured run reporting.
//!
//! Per-record anomalies never abort a run; they surface here instead, as
//! counts on the split that absorbed them. The CLI prints these via
//! `Display`, and library callers get the same data programmatically.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Diagnostics for one processed split.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    /// Split name (e.g. "train").
    pub split: String,

    /// Document the stage consumed, when one was found.
    pub source: Option<PathBuf>,

    /// How many source candidates were eligible; more than one means the
    /// lexicographically first was picked.
    pub candidates: usize,

    /// Category count of the split's document.
    pub classes: usize,

    /// Annotations dropped for dangling category references.
    pub dropped_annotations: usize,

    /// On-disk image files absent from the document's `images` list.
    pub unmatched_images: usize,

    /// Label files written for this split.
    pub label_files: usize,

    /// True when the split had no source document and was skipped.
    pub skipped: bool,
}

impl SplitReport {
    /// A report for a split that had no source document.
    pub fn skipped(split: impl Into<String>) -> Self {
        Self {
            split: split.into(),
            skipped: true,
            ..Default::default()
        }
    }

    fn source_name(&self) -> Option<&str> {
        self.source
            .as_deref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            return write!(f, "[{}] no source document, skipping", self.split);
        }

        write!(f, "[{}]", self.split)?;
        if let Some(name) = self.source_name() {
            write!(f, " {}", name)?;
        }
        write!(f, ": {} class(es)", self.classes)?;
        if self.label_files > 0 {
            write!(f, ", {} label file(s)", self.label_files)?;
        }
        if self.candidates > 1 {
            write!(f, " ({} source candidates, picked first)", self.candidates)?;
        }
        if self.dropped_annotations > 0 {
            write!(f, ", {} annotation(s) dropped", self.dropped_annotations)?;
        }
        if self.unmatched_images > 0 {
            write!(f, ", {} image(s) unmatched", self.unmatched_images)?;
        }
        Ok(())
    }
}

/// Aggregated diagnostics for a whole run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PipelineReport {
    pub splits: Vec<SplitReport>,
}

impl PipelineReport {
    /// Appends one split's report.
    pub fn add(&mut self, report: SplitReport) {
        self.splits.push(report);
    }

    /// Splits that were actually processed.
    pub fn processed_count(&self) -> usize {
        self.splits.iter().filter(|s| !s.skipped).count()
    }

    /// Splits skipped for lack of a source document.
    pub fn skipped_count(&self) -> usize {
        self.splits.iter().filter(|s| s.skipped).count()
    }

    /// Total annotations dropped across splits.
    pub fn total_dropped(&self) -> usize {
        self.splits.iter().map(|s| s.dropped_annotations).sum()
    }

    /// Total unmatched image files across splits.
    pub fn total_unmatched(&self) -> usize {
        self.splits.iter().map(|s| s.unmatched_images).sum()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} split(s) processed, {} skipped",
            self.processed_count(),
            self.skipped_count()
        )?;
        if self.total_dropped() > 0 {
            write!(f, ", {} annotation(s) dropped", self.total_dropped())?;
        }
        if self.total_unmatched() > 0 {
            write!(f, ", {} image(s) unmatched", self.total_unmatched())?;
        }
        Ok(())
    }
}
