//! PLY element reading

mod loader;
mod reader;

pub use loader::{ElementSummary, PlyElementReader, inspect_elements};
pub use reader::{ElementKind, ElementReader, FACE_ELEMENT, Scalar, Semantic, VERTEX_ELEMENT};
