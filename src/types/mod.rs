//! Shared types used throughout the library.

mod transform;

pub use transform::{
    scale_down, scale_up, to_file_space, to_host_space, ARMATURE_SCALE,
};

pub use glam::{Vec2, Vec3};
use serde::Serialize;

/// A triangle as three vertex indices.
pub type Triangle = [u32; 3];

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn from_points(points: impl Iterator<Item = Vec3>) -> Option<Self> {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut has_points = false;

        for p in points {
            has_points = true;
            min = min.min(p);
            max = max.max(p);
        }

        if has_points {
            Some(Self {
                min: min.to_array(),
                max: max.to_array(),
            })
        } else {
            None
        }
    }

}

/// Reverse the winding of a triangle.
pub fn reversed(tri: Triangle) -> Triangle {
    [tri[2], tri[1], tri[0]]
}
