//! Element reader abstraction consumed by the mesh extractor.

use crate::error::ReaderError;
use serde::Serialize;

/// Name of the element that carries per-vertex data.
pub const VERTEX_ELEMENT: &str = "vertex";
/// Name of the element that carries polygon index lists.
pub const FACE_ELEMENT: &str = "face";

/// Role an element plays, judged by its name only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Vertex,
    Face,
    Other,
}

impl ElementKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            VERTEX_ELEMENT => ElementKind::Vertex,
            FACE_ELEMENT => ElementKind::Face,
            _ => ElementKind::Other,
        }
    }
}

/// Semantic property groups looked up on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord,
    Color,
    Indices,
}

impl Semantic {
    /// Alternative property name sets, in lookup order.
    pub fn aliases(self) -> &'static [&'static [&'static str]] {
        match self {
            Semantic::Position => &[&["x", "y", "z"]],
            Semantic::Normal => &[&["nx", "ny", "nz"]],
            Semantic::TexCoord => &[
                &["u", "v"],
                &["s", "t"],
                &["texture_u", "texture_v"],
                &["texture_s", "texture_t"],
            ],
            Semantic::Color => &[&["red", "green", "blue"], &["r", "g", "b"]],
            Semantic::Indices => &[&["vertex_indices"], &["vertex_index"]],
        }
    }
}

/// Numeric types a property can be decoded into.
pub trait Scalar: Copy + Default {
    /// Convert a decoded number, saturating at the bounds of `Self`.
    fn from_f64(value: f64) -> Self;
}

impl Scalar for f32 {
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Scalar for u8 {
    fn from_f64(value: f64) -> Self {
        value as u8
    }
}

impl Scalar for i32 {
    fn from_f64(value: f64) -> Self {
        value as i32
    }
}

/// Forward-only cursor over the elements of a PLY source.
///
/// Implementors expose the current element's kind, declared properties and
/// typed decoding. Destination buffers are allocated by the caller; decoding
/// only appends rows to them.
pub trait ElementReader {
    /// Whether the cursor points at an element.
    fn has_element(&self) -> bool;

    /// Kind of the current element.
    fn element_kind(&self) -> ElementKind;

    /// Name of the current element, or `None` past the end.
    fn element_name(&self) -> Option<&str>;

    /// Prepare the current element for property lookup and decoding.
    fn load_element(&mut self) -> Result<(), ReaderError>;

    /// Number of rows in the current element.
    fn row_count(&self) -> usize;

    /// Indices of the named properties, or `None` unless all of them are declared.
    fn find_properties(&self, names: &[&str]) -> Option<Vec<usize>>;

    /// Decode `N` scalar properties per row into `dst`.
    fn extract_properties<T: Scalar, const N: usize>(
        &self,
        props: [usize; N],
        dst: &mut Vec<[T; N]>,
    ) -> Result<(), ReaderError>;

    /// Whether any row of the list property holds something other than a triangle.
    fn requires_triangulation(&self, prop: usize) -> bool;

    /// Number of triangles the list property yields once triangulated.
    fn triangle_count(&self, prop: usize) -> usize;

    /// Decode the list property as triangles, splitting polygons with the given positions.
    fn extract_triangles(
        &self,
        prop: usize,
        positions: &[[f32; 3]],
        dst: &mut Vec<[i32; 3]>,
    ) -> Result<(), ReaderError>;

    /// Decode a list property whose rows are all triangles.
    fn extract_list_property(&self, prop: usize, dst: &mut Vec<[i32; 3]>) -> Result<(), ReaderError>;

    /// Advance to the next element.
    fn next_element(&mut self);

    /// Look up the first fully declared alias set of `semantic`.
    fn find_semantic(&self, semantic: Semantic) -> Option<Vec<usize>> {
        semantic
            .aliases()
            .iter()
            .find_map(|names| self.find_properties(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kind_from_name() {
        assert_eq!(ElementKind::from_name("vertex"), ElementKind::Vertex);
        assert_eq!(ElementKind::from_name("face"), ElementKind::Face);
        assert_eq!(ElementKind::from_name("edge"), ElementKind::Other);
        assert_eq!(ElementKind::from_name("Vertex"), ElementKind::Other);
    }

    #[test]
    fn test_scalar_saturates() {
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(i32::from_f64(7.9), 7);
        assert_eq!(f32::from_f64(0.5), 0.5);
    }

    #[test]
    fn test_texcoord_aliases_in_order() {
        let aliases = Semantic::TexCoord.aliases();
        assert_eq!(aliases[0], &["u", "v"]);
        assert_eq!(aliases.len(), 4);
    }
}
