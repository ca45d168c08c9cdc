//! Plymesh Data Crate
//!
//! Triangle mesh extraction from PLY files: element reading, polygon
//! triangulation and assembly of positions, optional normals, texture
//! coordinates and colors, and triangle indices into a single [`Mesh`].
//!
//! ## Example
//!
//! ```ignore
//! use plymesh_data::{ExtractOptions, extract_mesh};
//!
//! let mesh = extract_mesh("bunny.ply", ExtractOptions::default())?;
//! println!("{} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
//! ```

pub mod error;
pub mod extract;
pub mod mesh;
pub mod ply;
pub mod triangulation;
pub mod types;

pub use error::{MeshError, ReaderError};
pub use extract::{extract, extract_mesh, extract_mesh_from_reader};
pub use mesh::{ExtractOptions, Mesh, MeshAttribute, MeshSummary};
pub use ply::{ElementKind, ElementReader, ElementSummary, PlyElementReader, inspect_elements};
pub use triangulation::triangulate_polygon;
pub use types::Triangle;
