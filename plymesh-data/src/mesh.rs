//! Extracted mesh data and extraction options.

use crate::types::{DEFAULT_COLOR, Triangle};
use glam::Vec3;
use serde::Serialize;

/// Per-vertex attributes a mesh can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshAttribute {
    Position,
    Normal,
    TexCoord,
    Color,
}

/// Which optional vertex attributes to extract.
///
/// Requesting an attribute the source does not declare is not an error;
/// the mesh simply reports it as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub normals: bool,
    pub uv: bool,
    pub color: bool,
}

impl ExtractOptions {
    /// Request positions and indices only.
    pub fn positions_only() -> Self {
        Self {
            normals: false,
            uv: false,
            color: false,
        }
    }

    pub fn with_normals(mut self, enabled: bool) -> Self {
        self.normals = enabled;
        self
    }

    pub fn with_uv(mut self, enabled: bool) -> Self {
        self.uv = enabled;
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Whether `attribute` is requested. Positions always are.
    pub fn requests(&self, attribute: MeshAttribute) -> bool {
        match attribute {
            MeshAttribute::Position => true,
            MeshAttribute::Normal => self.normals,
            MeshAttribute::TexCoord => self.uv,
            MeshAttribute::Color => self.color,
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            normals: true,
            uv: true,
            color: true,
        }
    }
}

/// Vertex buffers of one mesh. Every present buffer has one row per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct VertexBlock {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uv: Option<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

/// A triangle mesh extracted from a PLY source.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: VertexBlock,
    indices: Vec<[i32; 3]>,
}

/// Serializable overview of a mesh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshSummary {
    pub vertices: usize,
    pub triangles: usize,
    pub attributes: Vec<MeshAttribute>,
    pub bounds: Option<[[f32; 3]; 2]>,
    pub surface_area: f32,
}

impl Mesh {
    pub(crate) fn new(vertices: VertexBlock, indices: Vec<[i32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// Vertex positions, one row per vertex.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.vertices.positions
    }

    /// Vertex normals, empty when absent.
    pub fn normals(&self) -> &[[f32; 3]] {
        self.vertices.normals.as_deref().unwrap_or_default()
    }

    /// Texture coordinates, empty when absent.
    pub fn uv(&self) -> &[[f32; 2]] {
        self.vertices.uv.as_deref().unwrap_or_default()
    }

    /// 8-bit RGB vertex colors, empty when absent.
    pub fn colors(&self) -> &[[u8; 3]] {
        self.vertices.colors.as_deref().unwrap_or_default()
    }

    /// Triangle vertex indices.
    pub fn indices(&self) -> &[[i32; 3]] {
        &self.indices
    }

    /// Whether the attribute was found in the source.
    pub fn has_attribute(&self, attribute: MeshAttribute) -> bool {
        match attribute {
            MeshAttribute::Position => true,
            MeshAttribute::Normal => self.vertices.normals.is_some(),
            MeshAttribute::TexCoord => self.vertices.uv.is_some(),
            MeshAttribute::Color => self.vertices.colors.is_some(),
        }
    }

    /// Attributes present on this mesh, positions first.
    pub fn attributes(&self) -> Vec<MeshAttribute> {
        [
            MeshAttribute::Position,
            MeshAttribute::Normal,
            MeshAttribute::TexCoord,
            MeshAttribute::Color,
        ]
        .into_iter()
        .filter(|&a| self.has_attribute(a))
        .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Indices as one flat list, three entries per triangle.
    pub fn flat_indices(&self) -> &[i32] {
        self.indices.as_flattened()
    }

    /// Axis-aligned bounds of the positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.vertices.positions.is_empty() {
            return None;
        }

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for pos in &self.vertices.positions {
            let p = Vec3::from_array(*pos);
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }

    /// Build triangle primitives, colored by the average of their vertex colors.
    ///
    /// Triangles referencing vertices outside the position buffer are skipped.
    pub fn triangles(&self) -> Vec<Triangle> {
        let colors = self.vertices.colors.as_deref();
        let vertex = |i: i32| usize::try_from(i).ok().filter(|&i| i < self.vertex_count());

        self.indices
            .iter()
            .filter_map(|tri| {
                let [a, b, c] = [vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?];
                let color = match colors {
                    Some(colors) => {
                        [a, b, c]
                            .iter()
                            .map(|&i| Vec3::from_array(colors[i].map(f32::from)) / 255.0)
                            .sum::<Vec3>()
                            / 3.0
                    }
                    None => DEFAULT_COLOR,
                };
                let p = &self.vertices.positions;
                Some(Triangle::new(
                    Vec3::from_array(p[a]),
                    Vec3::from_array(p[b]),
                    Vec3::from_array(p[c]),
                    color,
                ))
            })
            .collect()
    }

    /// Total area of the triangles that reference valid vertices.
    pub fn surface_area(&self) -> f32 {
        self.triangles().iter().map(Triangle::area).sum()
    }

    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            vertices: self.vertex_count(),
            triangles: self.triangle_count(),
            attributes: self.attributes(),
            bounds: self.bounds().map(|(min, max)| [min.to_array(), max.to_array()]),
            surface_area: self.surface_area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colored_triangle() -> Mesh {
        Mesh::new(
            VertexBlock {
                positions: vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 1.0]],
                normals: None,
                uv: Some(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]),
                colors: Some(vec![[255, 0, 0], [255, 0, 0], [255, 255, 0]]),
            },
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_absent_attributes_are_empty() {
        let mesh = colored_triangle();
        assert!(mesh.normals().is_empty());
        assert!(!mesh.has_attribute(MeshAttribute::Normal));
        assert_eq!(mesh.uv().len(), 3);
        assert_eq!(
            mesh.attributes(),
            vec![MeshAttribute::Position, MeshAttribute::TexCoord, MeshAttribute::Color]
        );
    }

    #[test]
    fn test_bounds() {
        let mesh = colored_triangle();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Vec3::ZERO);
        assert_eq!(max, Vec3::new(2.0, 2.0, 1.0));
    }

    #[test]
    fn test_triangles_average_vertex_colors() {
        let mesh = colored_triangle();
        let triangles = mesh.triangles();
        assert_eq!(triangles.len(), 1);
        let expected = Vec3::new(1.0, 1.0 / 3.0, 0.0);
        assert!((triangles[0].color - expected).length() < 1e-5);
        assert_eq!(triangles[0].v1, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_triangles_skip_out_of_range_indices() {
        let mut mesh = colored_triangle();
        mesh.indices.push([0, 1, 7]);
        mesh.indices.push([-1, 1, 2]);
        assert_eq!(mesh.triangles().len(), 1);
    }

    #[test]
    fn test_surface_area_sums_valid_triangles() {
        let mut mesh = colored_triangle();
        // |(2,0,0) x (0,2,1)| / 2 = |(0,-2,4)| / 2
        let single = 20.0f32.sqrt() / 2.0;
        assert!((mesh.surface_area() - single).abs() < 1e-5);

        mesh.indices.push([2, 1, 0]);
        mesh.indices.push([0, 1, 9]);
        assert!((mesh.surface_area() - 2.0 * single).abs() < 1e-5);
    }

    #[test]
    fn test_options_requests() {
        let options = ExtractOptions::positions_only().with_uv(true);
        assert!(options.requests(MeshAttribute::Position));
        assert!(options.requests(MeshAttribute::TexCoord));
        assert!(!options.requests(MeshAttribute::Normal));
        assert!(!options.requests(MeshAttribute::Color));
        assert_eq!(ExtractOptions::default(), ExtractOptions::positions_only().with_normals(true).with_uv(true).with_color(true));
    }

    #[test]
    fn test_summary_serializes() {
        let summary = colored_triangle().summary();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["vertices"], 3);
        assert_eq!(json["triangles"], 1);
        assert_eq!(json["attributes"][1], "texcoord");
        assert!(json["surface_area"].as_f64().unwrap() > 2.2);
    }
}
