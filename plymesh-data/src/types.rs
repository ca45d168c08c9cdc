//! Geometric primitives built from extracted meshes.

use glam::Vec3;

/// Color of triangles built from a mesh without vertex colors.
pub const DEFAULT_COLOR: Vec3 = Vec3::splat(0.8);

/// One resolved mesh triangle: corner positions plus a linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    /// Linear RGB, 0-1 range.
    pub color: Vec3,
}

impl Triangle {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, color: Vec3) -> Self {
        Self { v0, v1, v2, color }
    }

    /// Face normal following the winding order, scaled by twice the area.
    pub fn normal(&self) -> Vec3 {
        (self.v1 - self.v0).cross(self.v2 - self.v0)
    }

    pub fn area(&self) -> f32 {
        self.normal().length() * 0.5
    }
}
