//! The label stage: normalized YOLO label emission.
//!
//! The image directory on disk, not the annotation document, decides
//! which label files exist: every rendered image gets exactly one label
//! file, empty when the document has nothing for it. Boxes are written
//! in center format, normalized to the image dimensions, with each value
//! clamped to `[0, 1]` independently -- a box extending past the image
//! edge is truncated to it, not rejected.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::coco::{io, CocoAnnotation, CocoDocument, CocoImage, ImageId};
use crate::error::PrepError;
use crate::mapping::CategoryIndexMap;

/// Enumerates the image files a split's labels are generated for.
///
/// Injected so tests can swap the file system for a deterministic list;
/// the enumeration is authoritative for which label files get written.
pub trait DirectoryLister {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, PrepError>;
}

/// Production lister: plain files directly inside `dir`, sorted by path.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsDirectoryLister;

impl DirectoryLister for FsDirectoryLister {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.map_err(|err| PrepError::Io(err.into()))?;
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Per-split counts from one label conversion.
#[derive(Clone, Debug, Default)]
pub struct LabelOutcome {
    /// Label files written (one per enumerated image file).
    pub label_files: usize,

    /// Image files with no entry in the document's `images` list; each
    /// still produced an empty label file.
    pub unmatched_images: usize,

    /// Annotations skipped because their category id had no entry in the
    /// index map.
    pub dropped_annotations: usize,
}

/// A converted split: the document it consumed, its class names in dense
/// order, and the conversion counts.
#[derive(Debug)]
pub struct ConvertedSplit {
    pub source: io::SourceDocument,
    pub class_names: Vec<String>,
    pub outcome: LabelOutcome,
}

/// Formats one detection as a normalized center-format label line.
pub fn format_label_line(class_index: usize, bbox: &[f64; 4], width: u32, height: u32) -> String {
    let image_w = f64::from(width);
    let image_h = f64::from(height);
    let [x, y, w, h] = *bbox;

    let cx = clamp_unit((x + w / 2.0) / image_w);
    let cy = clamp_unit((y + h / 2.0) / image_h);
    let nw = clamp_unit(w / image_w);
    let nh = clamp_unit(h / image_h);

    format!("{class_index} {cx:.6} {cy:.6} {nw:.6} {nh:.6}")
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Writes one label file per enumerated image file.
///
/// Images are matched by exact file basename against the document's
/// `images` list. Unmatched images and images without annotations both
/// get an existing, empty label file. Crowd annotations are excluded
/// unconditionally; dangling category references are dropped and
/// counted.
pub fn convert_document(
    document: &CocoDocument,
    index_map: &CategoryIndexMap,
    image_dir: &Path,
    label_dir: &Path,
    lister: &dyn DirectoryLister,
) -> Result<LabelOutcome, PrepError> {
    fs::create_dir_all(label_dir).map_err(PrepError::Io)?;

    let by_basename: BTreeMap<&str, &CocoImage> = document
        .images
        .iter()
        .filter_map(|image| image.basename().map(|name| (name, image)))
        .collect();

    let mut annotations_by_image: BTreeMap<ImageId, Vec<&CocoAnnotation>> = BTreeMap::new();
    for ann in &document.annotations {
        annotations_by_image
            .entry(ann.image_id)
            .or_default()
            .push(ann);
    }

    let mut outcome = LabelOutcome::default();

    for image_path in lister.list_files(image_dir)? {
        let Some(stem) = image_path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let file_name = image_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        let mut lines = Vec::new();
        match by_basename.get(file_name) {
            None => outcome.unmatched_images += 1,
            Some(image) => {
                let anns = annotations_by_image
                    .get(&image.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                for ann in anns {
                    if ann.is_crowd() {
                        continue;
                    }
                    let Some(dense) = ann
                        .category_id
                        .and_then(|id| index_map.dense_index_of(id))
                    else {
                        outcome.dropped_annotations += 1;
                        continue;
                    };
                    lines.push(format_label_line(dense, &ann.bbox, image.width, image.height));
                }
            }
        }

        fs::write(label_dir.join(format!("{stem}.txt")), lines.join("\n"))
            .map_err(PrepError::Io)?;
        outcome.label_files += 1;
    }

    Ok(outcome)
}

/// Converts one split independently of the remap stage.
///
/// Prefers the stabilized document when the remap stage already ran,
/// falling back to the source locator otherwise. The index map is
/// recomputed from whichever document is consumed; against a stabilized
/// document that recomputation is the identity, so indices agree with
/// the remap stage's output.
pub fn convert_split(
    split_dir: &Path,
    image_dir: &Path,
    label_dir: &Path,
    lister: &dyn DirectoryLister,
) -> Result<ConvertedSplit, PrepError> {
    let source = locate_document(split_dir)?;
    let document = io::read_coco_json(&source.path)?;
    let index_map = CategoryIndexMap::from_categories(&document.categories, &source.path)?;
    let class_names = index_map.derive_names(&document.categories, &[]);

    if !image_dir.is_dir() {
        return Err(PrepError::SplitDirMissing {
            path: image_dir.to_path_buf(),
        });
    }

    let outcome = convert_document(&document, &index_map, image_dir, label_dir, lister)?;

    Ok(ConvertedSplit {
        source,
        class_names,
        outcome,
    })
}

fn locate_document(split_dir: &Path) -> Result<io::SourceDocument, PrepError> {
    let stabilized = split_dir.join(io::STABILIZED_FILE_NAME);
    if stabilized.is_file() {
        return Ok(io::SourceDocument {
            path: stabilized,
            candidates: 1,
        });
    }
    io::find_source_document(split_dir)
}

/// Writes an Ultralytics `data.yaml` listing class names by dense index.
pub fn write_data_yaml(path: &Path, names: &[String]) -> Result<(), PrepError> {
    let mut yaml = String::from("names:\n");
    for (index, name) in names.iter().enumerate() {
        yaml.push_str(&format!("  {}: {}\n", index, yaml_single_quoted(name)));
    }
    fs::write(path, yaml).map_err(PrepError::Io)
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coco::io::from_coco_str;

    /// Deterministic lister used instead of the file system.
    struct FixedLister(Vec<PathBuf>);

    impl DirectoryLister for FixedLister {
        fn list_files(&self, _dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
            Ok(self.0.clone())
        }
    }

    fn sample_document() -> CocoDocument {
        from_coco_str(
            r#"{
                "images": [
                    {"id": 1, "width": 100, "height": 50, "file_name": "rgb_0001.png"},
                    {"id": 2, "width": 100, "height": 50, "file_name": "rgb_0002.png"},
                    {"id": 3, "width": 100, "height": 50, "file_name": "rgb_0003.png"}
                ],
                "categories": [
                    {"id": 5, "name": "crate"},
                    {"id": 2, "name": "pallet"}
                ],
                "annotations": [
                    {"image_id": 1, "category_id": 5, "bbox": [10, 10, 20, 10]},
                    {"image_id": 2, "category_id": 2, "bbox": [90, 0, 30, 10]},
                    {"image_id": 3, "category_id": 5, "bbox": [0, 0, 10, 10], "iscrowd": 1}
                ]
            }"#,
        )
        .expect("parse fixture")
    }

    fn convert_to(temp: &Path, document: &CocoDocument, files: &[&str]) -> LabelOutcome {
        let map =
            CategoryIndexMap::from_categories(&document.categories, Path::new("t.json")).unwrap();
        let lister = FixedLister(files.iter().map(PathBuf::from).collect());
        convert_document(document, &map, Path::new("unused"), temp, &lister).expect("convert")
    }

    #[test]
    fn normalization_round_trip() {
        let temp = tempfile::tempdir().expect("create temp dir");
        convert_to(temp.path(), &sample_document(), &["rgb_0001.png"]);

        let label = fs::read_to_string(temp.path().join("rgb_0001.txt")).unwrap();
        // (10,10,20,10) on 100x50: cx=0.2, cy=0.3, nw=0.2, nh=0.2; class 5 -> dense 1
        assert_eq!(label, "1 0.200000 0.300000 0.200000 0.200000");
    }

    #[test]
    fn out_of_bounds_box_is_clamped_not_rejected() {
        let temp = tempfile::tempdir().expect("create temp dir");
        convert_to(temp.path(), &sample_document(), &["rgb_0002.png"]);

        let label = fs::read_to_string(temp.path().join("rgb_0002.txt")).unwrap();
        // (90,0,30,10) on 100x50: cx=(90+15)/100 clamps to 1.0
        assert_eq!(label, "0 1.000000 0.100000 0.300000 0.200000");
    }

    #[test]
    fn crowd_only_image_gets_empty_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        convert_to(temp.path(), &sample_document(), &["rgb_0003.png"]);

        let path = temp.path().join("rgb_0003.txt");
        assert!(path.is_file());
        assert!(fs::read_to_string(path).unwrap().is_empty());
    }

    #[test]
    fn unmatched_image_gets_empty_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let outcome = convert_to(temp.path(), &sample_document(), &["rgb_9999.png"]);

        let path = temp.path().join("rgb_9999.txt");
        assert!(path.is_file());
        assert!(fs::read_to_string(path).unwrap().is_empty());
        assert_eq!(outcome.unmatched_images, 1);
    }

    #[test]
    fn dangling_category_reference_is_dropped_and_counted() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut document = sample_document();
        document.annotations[0].category_id = Some(crate::coco::CategoryId(77));

        let outcome = convert_to(temp.path(), &document, &["rgb_0001.png"]);

        assert_eq!(outcome.dropped_annotations, 1);
        assert!(fs::read_to_string(temp.path().join("rgb_0001.txt"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn multiple_detections_one_line_each() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let mut document = sample_document();
        document
            .annotations
            .push(crate::coco::CocoAnnotation::new(1i64, 2i64, [0.0, 0.0, 50.0, 25.0]));

        convert_to(temp.path(), &document, &["rgb_0001.png"]);

        let label = fs::read_to_string(temp.path().join("rgb_0001.txt")).unwrap();
        let lines: Vec<&str> = label.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "0 0.250000 0.250000 0.500000 0.500000");
    }

    #[test]
    fn format_is_six_decimal_digits() {
        let line = format_label_line(3, &[1.0, 1.0, 1.0, 1.0], 3, 3);
        assert_eq!(line, "3 0.500000 0.500000 0.333333 0.333333");
    }

    #[test]
    fn data_yaml_quotes_names() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("data.yaml");
        let names = vec!["pallet".to_string(), "worker's hat".to_string()];
        write_data_yaml(&path, &names).expect("write data.yaml");

        let yaml = fs::read_to_string(path).unwrap();
        assert_eq!(yaml, "names:\n  0: 'pallet'\n  1: 'worker''s hat'\n");
    }

    #[test]
    fn fs_lister_skips_subdirectories_and_sorts() {
        let temp = tempfile::tempdir().expect("create temp dir");
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("b.png"), b"x").unwrap();
        fs::write(temp.path().join("a.png"), b"x").unwrap();
        fs::write(temp.path().join("nested/c.png"), b"x").unwrap();

        let files = FsDirectoryLister.list_files(temp.path()).expect("list");
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }
}
