use std::fs;
use std::path::Path;

use serde_json::json;

/// Writes `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write file");
}

/// A minimal split document: one 100x50 image named `rgb_0001.png`, the
/// given `(id, name)` category pairs, and one annotation per category on
/// that image with bbox `[10, 10, 20, 10]`.
pub fn split_document(categories: &[(i64, &str)]) -> String {
    let cats: Vec<_> = categories
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect();
    let anns: Vec<_> = categories
        .iter()
        .map(|(id, _)| json!({"image_id": 1, "category_id": id, "bbox": [10.0, 10.0, 20.0, 10.0]}))
        .collect();

    json!({
        "images": [{"id": 1, "width": 100, "height": 50, "file_name": "rgb_0001.png"}],
        "categories": cats,
        "annotations": anns,
        "info": {"generator": "sdg"}
    })
    .to_string()
}
