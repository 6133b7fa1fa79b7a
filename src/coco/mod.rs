//! COCO annotation document types and I/O.
//!
//! The document model is deliberately partial: the pipeline rewrites
//! only `categories` and `annotations`, so everything else is carried
//! through opaquely and preserved verbatim on rewrite.

mod ids;
pub mod io;
mod model;

// Re-export core types for convenient access
pub use ids::{CategoryId, ImageId};
pub use model::{CocoAnnotation, CocoCategory, CocoDocument, CocoImage};
