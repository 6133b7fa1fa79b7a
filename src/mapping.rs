//! Dense category index mapping shared by the remap and label stages.

use std::collections::BTreeMap;
use std::path::Path;

use crate::coco::{CategoryId, CocoCategory};
use crate::error::PrepError;

/// A bijection from original (possibly sparse) category ids to dense
/// `0..N-1` indices.
///
/// The total order is explicit and documented: dense indices follow
/// ascending original id, independent of declaration order in the source
/// document. Both pipeline stages derive their class indices from this
/// one type, so they can never disagree on which dense index an original
/// id maps to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryIndexMap {
    dense_by_original: BTreeMap<CategoryId, usize>,
}

impl CategoryIndexMap {
    /// Builds the map from a document's category table.
    ///
    /// Duplicate ids collapse to a single entry. An empty table cannot
    /// produce a meaningful contiguous mapping and is rejected with
    /// [`PrepError::EmptyCategoryTable`] naming `path`.
    pub fn from_categories(categories: &[CocoCategory], path: &Path) -> Result<Self, PrepError> {
        if categories.is_empty() {
            return Err(PrepError::EmptyCategoryTable {
                path: path.to_path_buf(),
            });
        }

        // BTreeMap keys iterate in ascending id order, so re-keying by
        // enumeration position assigns dense indices in the documented
        // total order.
        let mut dense_by_original: BTreeMap<CategoryId, usize> =
            categories.iter().map(|cat| (cat.id, 0)).collect();
        for (dense, index) in dense_by_original.values_mut().enumerate() {
            *index = dense;
        }

        Ok(Self { dense_by_original })
    }

    /// The dense index assigned to `original`, if it appears in the table.
    pub fn dense_index_of(&self, original: CategoryId) -> Option<usize> {
        self.dense_by_original.get(&original).copied()
    }

    /// Number of distinct categories in the mapping.
    pub fn len(&self) -> usize {
        self.dense_by_original.len()
    }

    /// True when the mapping holds no categories. Only reachable through
    /// `Default`; `from_categories` rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.dense_by_original.is_empty()
    }

    /// Original ids in ascending order, i.e. dense index order.
    pub fn original_ids(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.dense_by_original.keys().copied()
    }

    /// Derives the class name for each dense index.
    ///
    /// A hint list whose length matches the category count overrides
    /// names positionally (this subsumes the single-class convenience
    /// case of one hint for one category). Otherwise each category's own
    /// name is used, synthesizing `class_<original_id>` for categories
    /// without one. Duplicated ids resolve to the last declaration.
    pub fn derive_names(&self, categories: &[CocoCategory], hints: &[String]) -> Vec<String> {
        if !hints.is_empty() && hints.len() == self.len() {
            return hints.to_vec();
        }

        let by_id: BTreeMap<CategoryId, &CocoCategory> =
            categories.iter().map(|cat| (cat.id, cat)).collect();

        self.original_ids()
            .map(|id| match by_id.get(&id).and_then(|cat| cat.name.clone()) {
                Some(name) => name,
                None => format!("class_{}", id),
            })
            .collect()
    }
}
