//! COCO annotation document model.
//!
//! Only the parts of the schema the pipeline actually rewrites are
//! modeled as typed fields; everything else -- `info`, `licenses`,
//! per-record `segmentation`/`area`/`id`, and any vendor extensions --
//! is captured in flattened `extra` maps so a rewrite round-trips the
//! document with just `categories` and `annotations` replaced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ids::{CategoryId, ImageId};

/// Top-level annotation document for one dataset split.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CocoDocument {
    #[serde(default)]
    pub images: Vec<CocoImage>,

    #[serde(default)]
    pub categories: Vec<CocoCategory>,

    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,

    /// Unrecognized top-level fields, preserved verbatim on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An image entry. Images are never modified by either stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: ImageId,
    pub width: u32,
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coco_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CocoImage {
    /// Creates a new image entry with the given file name.
    pub fn new(id: impl Into<ImageId>, file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            file_name: Some(file_name.into()),
            coco_url: None,
            extra: Map::new(),
        }
    }

    /// The file base name used to match this entry against an on-disk
    /// image, falling back to the last path segment of `coco_url` when
    /// `file_name` is absent.
    pub fn basename(&self) -> Option<&str> {
        let source = self.file_name.as_deref().or(self.coco_url.as_deref())?;
        source.rsplit(['/', '\\']).next()
    }
}

/// A category entry. Original ids may be sparse and non-zero-based.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: CategoryId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CocoCategory {
    /// Creates a new category entry.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            extra: Map::new(),
        }
    }
}

/// An annotation entry: one axis-aligned box on one image.
///
/// `bbox` is `[x, y, width, height]` in absolute pixels with a top-left
/// origin. The remap stage only ever touches `category_id`; all other
/// fields round-trip untouched through `extra`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub image_id: ImageId,

    /// Absent or dangling references are dropped (and counted), never
    /// treated as errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    pub bbox: [f64; 4],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iscrowd: Option<u8>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CocoAnnotation {
    /// Creates a new annotation entry.
    pub fn new(image_id: impl Into<ImageId>, category_id: impl Into<CategoryId>, bbox: [f64; 4]) -> Self {
        Self {
            image_id: image_id.into(),
            category_id: Some(category_id.into()),
            bbox,
            iscrowd: None,
            extra: Map::new(),
        }
    }

    /// True when this annotation marks a crowd region. Crowd annotations
    /// are excluded from label output unconditionally.
    pub fn is_crowd(&self) -> bool {
        matches!(self.iscrowd, Some(flag) if flag != 0)
    }
}

impl From<i64> for ImageId {
    fn from(id: i64) -> Self {
        ImageId::new(id)
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        CategoryId::new(id)
    }
}
