//! The remap stage: contiguous category-id remapping.
//!
//! Exported documents can carry sparse, non-zero-based category ids
//! (a split containing only id 201/"other" is a real case). Training
//! consumers expect contiguous ids with `max_id < num_classes`, so each
//! split's document is rewritten through a [`CategoryIndexMap`] and
//! stabilized under a fixed file name.

pub mod manifest;

use std::path::Path;

use crate::coco::{io, CategoryId, CocoCategory, CocoDocument};
use crate::error::PrepError;
use crate::mapping::CategoryIndexMap;

/// Result of remapping one document.
#[derive(Clone, Debug)]
pub struct RemapOutcome {
    /// Final class names, in dense-id order. Feeds the cross-split
    /// manifest reconciliation.
    pub class_names: Vec<String>,

    /// Annotations dropped because their category id had no entry in the
    /// category table.
    pub dropped_annotations: usize,
}

/// A remapped split: the located source, the shared index map, and the
/// remap outcome. The caller hands the same map to the label stage.
#[derive(Debug)]
pub struct RemappedSplit {
    pub source: io::SourceDocument,
    pub index_map: CategoryIndexMap,
    pub outcome: RemapOutcome,
}

/// Rewrites `document` in place to use dense category ids `0..N-1`.
///
/// The category table is rebuilt from the mapping with names derived via
/// [`CategoryIndexMap::derive_names`]; every annotation's category
/// reference is rewritten through the map, and annotations whose
/// original id has no entry are dropped and counted.
pub fn remap_document(
    document: &mut CocoDocument,
    index_map: &CategoryIndexMap,
    hints: &[String],
) -> RemapOutcome {
    let class_names = index_map.derive_names(&document.categories, hints);

    document.categories = class_names
        .iter()
        .enumerate()
        .map(|(dense, name)| CocoCategory::new(dense as i64, name.clone()))
        .collect();

    let mut dropped_annotations = 0usize;
    document.annotations.retain_mut(|ann| {
        let dense = ann
            .category_id
            .and_then(|id| index_map.dense_index_of(id));
        match dense {
            Some(dense) => {
                ann.category_id = Some(CategoryId::new(dense as i64));
                true
            }
            None => {
                dropped_annotations += 1;
                false
            }
        }
    });

    RemapOutcome {
        class_names,
        dropped_annotations,
    }
}

/// Locates, remaps, and stabilizes one split's annotation document.
///
/// The stabilized document fully overwrites any previous one, which
/// makes re-runs idempotent: the locator never picks the stabilized
/// file, so the same source remaps to byte-identical output.
pub fn remap_split(split_dir: &Path, hints: &[String]) -> Result<RemappedSplit, PrepError> {
    let source = io::find_source_document(split_dir)?;
    let mut document = io::read_coco_json(&source.path)?;
    let index_map = CategoryIndexMap::from_categories(&document.categories, &source.path)?;

    let outcome = remap_document(&mut document, &index_map, hints);
    io::write_coco_json(&split_dir.join(io::STABILIZED_FILE_NAME), &document)?;

    Ok(RemappedSplit {
        source,
        index_map,
        outcome,
    })
}
