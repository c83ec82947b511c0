//! The two fixed skeletons and bone offset encoding.
//!
//! Both generations are static `(name, parent)` tables. Parents always come
//! before their children (the root is its own parent at index 0), so a
//! single forward pass over the table rebuilds every armature-space head
//! position from the per-bone offsets stored in a file.

use crate::error::{CmodError, Result};
use crate::types::{scale_down, scale_up, to_file_space, to_host_space};
use glam::Vec3;
use serde::Serialize;

/// Host-space head position of the root bone.
pub const ARMATURE_ROOT: Vec3 = Vec3::new(0.0, 0.0625, -0.1875);

/// Length of the root bone when rebuilding an armature.
pub const ROOT_BONE_LENGTH: f32 = 0.2;

const CURRENT_BONE_NAMES: [&str; 16] = [
    "PELVIS",
    "STOMACH",
    "TORSO",
    "HEAD",
    "LEFTSHOULDER",
    "LEFTFOREARM",
    "LEFTHAND",
    "RIGHTSHOULDER",
    "RIGHTFOREARM",
    "RIGHTHAND",
    "LEFTTHIGH",
    "LEFTSHIN",
    "LEFTFOOT",
    "RIGHTTHIGH",
    "RIGHTSHIN",
    "RIGHTFOOT",
];
const CURRENT_BONE_PARENTS: [usize; 16] = [0, 0, 1, 2, 2, 4, 5, 2, 7, 8, 0, 10, 11, 0, 13, 14];

const LEGACY_BONE_NAMES: [&str; 15] = [
    "PELVIS",
    "TORSO",
    "HEAD",
    "LEFTSHOULDER",
    "LEFTFOREARM",
    "LEFTHAND",
    "RIGHTSHOULDER",
    "RIGHTFOREARM",
    "RIGHTHAND",
    "LEFTTHIGH",
    "LEFTSHIN",
    "LEFTFOOT",
    "RIGHTTHIGH",
    "RIGHTSHIN",
    "RIGHTFOOT",
];
const LEGACY_BONE_PARENTS: [usize; 15] = [0, 0, 1, 1, 3, 4, 1, 6, 7, 0, 9, 10, 0, 12, 13];

/// Which fixed skeleton a character file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkeletonKind {
    /// 16 bones, with a STOMACH bone between PELVIS and TORSO.
    Current,
    /// 15 bones, TORSO parented directly to PELVIS.
    Legacy,
}

impl SkeletonKind {
    /// Ordered bone names.
    pub fn bone_names(self) -> &'static [&'static str] {
        match self {
            SkeletonKind::Current => &CURRENT_BONE_NAMES,
            SkeletonKind::Legacy => &LEGACY_BONE_NAMES,
        }
    }

    /// Parent index of every bone, parallel to [`bone_names`](Self::bone_names).
    pub fn parents(self) -> &'static [usize] {
        match self {
            SkeletonKind::Current => &CURRENT_BONE_PARENTS,
            SkeletonKind::Legacy => &LEGACY_BONE_PARENTS,
        }
    }

    pub fn bone_count(self) -> usize {
        self.bone_names().len()
    }

    pub fn bone_name(self, index: usize) -> &'static str {
        self.bone_names()[index]
    }

    pub fn parent(self, index: usize) -> usize {
        self.parents()[index]
    }

    /// Look up a bone ordinal by name.
    pub fn index_of(self, name: &str) -> Result<usize> {
        self.bone_names()
            .iter()
            .position(|bone| *bone == name)
            .ok_or_else(|| CmodError::UnknownBone(name.to_string()))
    }

    /// The skeleton whose table has exactly `count` bones.
    pub fn from_bone_count(count: usize) -> Option<Self> {
        [SkeletonKind::Current, SkeletonKind::Legacy]
            .into_iter()
            .find(|kind| kind.bone_count() == count)
    }
}

/// Offset of bone `index` from its parent, in file space and file units.
///
/// The root always encodes as zero. Returns `None` when the bone or its
/// parent is missing from `positions`.
pub fn encode_bone(kind: SkeletonKind, index: usize, positions: &[Option<Vec3>]) -> Option<Vec3> {
    if index == 0 {
        return Some(Vec3::ZERO);
    }
    let head = positions.get(index).copied().flatten()?;
    let parent_head = positions.get(kind.parent(index)).copied().flatten()?;
    Some(to_file_space(scale_down(head - parent_head)))
}

/// Encode the full offset table for a skeleton.
///
/// `positions` holds the armature-space head of every bone, `None` where the
/// host armature lacks it. Missing bones are written as a zero offset so the
/// table keeps one entry per bone ordinal.
pub fn encode_bones(kind: SkeletonKind, positions: &[Option<Vec3>]) -> Vec<Vec3> {
    (0..kind.bone_count())
        .map(|index| {
            encode_bone(kind, index, positions).unwrap_or_else(|| {
                log::warn!(
                    "bone {} or its parent {} is missing from the armature, writing a zero offset",
                    kind.bone_name(index),
                    kind.bone_name(kind.parent(index))
                );
                Vec3::ZERO
            })
        })
        .collect()
}

/// Rebuild armature-space head positions from stored offsets.
///
/// The root sits at [`ARMATURE_ROOT`]; every other bone is its parent's head
/// plus the host-space, host-unit offset. Missing trailing offsets count as
/// zero.
pub fn decode_skeleton(kind: SkeletonKind, offsets: &[Vec3]) -> Vec<Vec3> {
    let mut positions = Vec::with_capacity(kind.bone_count());
    positions.push(ARMATURE_ROOT);
    for index in 1..kind.bone_count() {
        let offset = offsets.get(index).copied().unwrap_or_default();
        let parent_head = positions[kind.parent(index)];
        positions.push(parent_head + scale_up(to_host_space(offset)));
    }
    positions
}

/// One bone of a rebuilt armature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoneNode {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub head: Vec3,
    /// Children point back at their parent's head; the root points up.
    pub tail: Vec3,
}

/// A full bone hierarchy ready to hand to a host for armature creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoneTree {
    pub kind: SkeletonKind,
    pub bones: Vec<BoneNode>,
}

impl BoneTree {
    /// Build the hierarchy from armature-space head positions.
    pub fn from_positions(kind: SkeletonKind, positions: &[Vec3]) -> Self {
        let bones = positions
            .iter()
            .enumerate()
            .map(|(index, &head)| {
                if index == 0 {
                    BoneNode {
                        name: kind.bone_name(0),
                        parent: None,
                        head,
                        tail: head + Vec3::new(0.0, 0.0, ROOT_BONE_LENGTH),
                    }
                } else {
                    let parent = kind.parent(index);
                    BoneNode {
                        name: kind.bone_name(index),
                        parent: Some(kind.bone_name(parent)),
                        head,
                        tail: positions[parent],
                    }
                }
            })
            .collect();
        Self { kind, bones }
    }

    /// Head position of the named bone.
    pub fn head(&self, name: &str) -> Option<Vec3> {
        self.bones.iter().find(|b| b.name == name).map(|b| b.head)
    }
}
