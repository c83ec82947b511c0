//! Conversions between file space and host space.
//!
//! Files store Y and Z swapped relative to the authoring host, and bone-space
//! offsets are stored in units 1.125 times smaller than the host skeleton.
//! Vertex positions only get the axis swap; bone offsets and weight-slot
//! offsets get both the swap and the scale.

use glam::Vec3;

/// Scale between host armature units and file bone-offset units.
pub const ARMATURE_SCALE: f32 = 1.125;

/// Host space (X, Y depth, Z up) to file space (X, Z up, Y depth).
#[inline]
pub fn to_file_space(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// File space to host space. The swap is its own inverse.
#[inline]
pub fn to_host_space(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.z, v.y)
}

/// Host armature units to file offset units.
#[inline]
pub fn scale_down(v: Vec3) -> Vec3 {
    v / ARMATURE_SCALE
}

/// File offset units to host armature units.
#[inline]
pub fn scale_up(v: Vec3) -> Vec3 {
    v * ARMATURE_SCALE
}
