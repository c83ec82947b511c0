//! Per-vertex weight slots and bind-pose reconstruction.
//!
//! A character vertex stores one slot per bone of its skeleton. Slot `i`
//! belongs to bone `i` and holds the vertex's offset from that bone (file
//! space, file units) together with the bone's influence. At most
//! [`MAX_INFLUENCES`] slots carry a nonzero weight.
//!
//! Outside this module weights travel as sparse [`Influence`] lists; the
//! dense slot array only exists on the wire side.

use crate::skeleton::SkeletonKind;
use crate::types::{scale_down, scale_up, to_file_space, to_host_space};
use glam::Vec3;
use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum number of bones that may influence one vertex.
pub const MAX_INFLUENCES: usize = 4;

/// One bone's entry in a vertex's slot array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WeightSlot {
    /// Vertex position relative to the bone head, file space and units.
    pub offset: Vec3,
    pub weight: f32,
}

impl WeightSlot {
    pub fn is_active(&self) -> bool {
        self.weight > 0.0
    }
}

/// A bone influence on a vertex, by bone ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Influence {
    pub bone: usize,
    pub weight: f32,
}

/// Encode one vertex's influences into a dense slot array.
///
/// `groups` is the host's ordered `(bone name, weight)` list. Entries with a
/// non-positive weight or a name outside the skeleton are skipped; after
/// [`MAX_INFLUENCES`] accepted entries the rest are dropped. When a bone is
/// listed twice the first entry wins. A vertex with no accepted entry is
/// bound fully to the root bone.
///
/// `position` and `bone_heads` are in host space; a bone missing from
/// `bone_heads` keeps its weight but gets a zero offset.
pub fn encode_vertex(
    kind: SkeletonKind,
    position: Vec3,
    groups: &[(String, f32)],
    bone_heads: &[Option<Vec3>],
) -> Vec<WeightSlot> {
    let influences = collect_influences(kind, groups);
    let mut slots = vec![WeightSlot::default(); kind.bone_count()];

    if influences.is_empty() {
        // Unweighted vertices ride on the root.
        slots[0] = WeightSlot {
            offset: bone_offset(position, bone_heads.first().copied().flatten()),
            weight: 1.0,
        };
        return slots;
    }

    for influence in influences {
        let slot = &mut slots[influence.bone];
        if slot.is_active() {
            continue;
        }
        let head = bone_heads.get(influence.bone).copied().flatten();
        *slot = WeightSlot {
            offset: bone_offset(position, head),
            weight: influence.weight,
        };
    }
    slots
}

fn bone_offset(position: Vec3, head: Option<Vec3>) -> Vec3 {
    match head {
        Some(head) => scale_down(to_file_space(position - head)),
        None => Vec3::ZERO,
    }
}

/// Resolve and truncate a host vertex-group list.
pub fn collect_influences(kind: SkeletonKind, groups: &[(String, f32)]) -> Vec<Influence> {
    let mut influences = Vec::with_capacity(MAX_INFLUENCES);
    for (name, weight) in groups {
        if influences.len() >= MAX_INFLUENCES {
            log::debug!("dropping influence {} beyond the first {}", name, MAX_INFLUENCES);
            break;
        }
        if *weight <= 0.0 {
            continue;
        }
        match kind.index_of(name) {
            Ok(bone) => influences.push(Influence {
                bone,
                weight: *weight,
            }),
            Err(err) => log::warn!("skipping vertex group: {}", err),
        }
    }
    influences
}

/// A vertex rebuilt from its slot array.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedVertex {
    /// Bind-pose position in host space.
    pub position: Vec3,
    pub influences: Vec<Influence>,
}

/// Reconstruct a vertex's bind position from its slots.
///
/// The first [`MAX_INFLUENCES`] active slots in bone order contribute
/// `(bone head + offset) * weight`. Weights are not normalized. A vertex
/// without any active slot keeps its stored position.
pub fn decode_vertex(raw_position: Vec3, slots: &[WeightSlot], bone_heads: &[Vec3]) -> DecodedVertex {
    let mut influences = Vec::with_capacity(MAX_INFLUENCES);
    let mut position = Vec3::ZERO;

    for (bone, slot) in slots.iter().enumerate() {
        if influences.len() >= MAX_INFLUENCES {
            break;
        }
        if !slot.is_active() {
            continue;
        }
        let head = bone_heads.get(bone).copied().unwrap_or_default();
        position += (head + scale_up(to_host_space(slot.offset))) * slot.weight;
        influences.push(Influence {
            bone,
            weight: slot.weight,
        });
    }

    if influences.is_empty() {
        position = to_host_space(raw_position);
    }
    DecodedVertex {
        position,
        influences,
    }
}

/// Weight assignments keyed by `(vertex, bone)`.
///
/// Assigning the same pair twice replaces the earlier weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexWeights {
    weights: BTreeMap<(usize, usize), f32>,
}

impl VertexWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, vertex: usize, bone: usize, weight: f32) {
        self.weights.insert((vertex, bone), weight);
    }

    pub fn get(&self, vertex: usize, bone: usize) -> Option<f32> {
        self.weights.get(&(vertex, bone)).copied()
    }

    /// Influences of one vertex in bone order.
    pub fn influences(&self, vertex: usize) -> Vec<Influence> {
        self.weights
            .range((vertex, 0)..(vertex + 1, 0))
            .map(|(&(_, bone), &weight)| Influence { bone, weight })
            .collect()
    }

    /// All `(vertex, bone, weight)` triples in vertex then bone order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.weights
            .iter()
            .map(|(&(vertex, bone), &weight)| (vertex, bone, weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{decode_skeleton, ARMATURE_ROOT};

    fn groups(entries: &[(&str, f32)]) -> Vec<(String, f32)> {
        entries.iter().map(|(n, w)| (n.to_string(), *w)).collect()
    }

    fn heads(kind: SkeletonKind) -> Vec<Vec3> {
        let offsets: Vec<Vec3> = (0..kind.bone_count())
            .map(|i| Vec3::new(0.25, i as f32 * 0.125, 0.5))
            .collect();
        decode_skeleton(kind, &offsets)
    }

    fn some(heads: &[Vec3]) -> Vec<Option<Vec3>> {
        heads.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_slot_index_is_bone_ordinal() {
        let kind = SkeletonKind::Current;
        let bone_heads = heads(kind);
        let position = bone_heads[3] + Vec3::new(0.5625, 0.0, 0.0);
        let slots = encode_vertex(kind, position, &groups(&[("HEAD", 1.0)]), &some(&bone_heads));

        assert_eq!(slots.len(), 16);
        assert_eq!(slots[3].weight, 1.0);
        assert_eq!(slots[3].offset, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(slots.iter().filter(|s| s.is_active()).count(), 1);
        assert!(slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 3)
            .all(|(_, s)| *s == WeightSlot::default()));
    }

    #[test]
    fn test_truncates_to_four_influences() {
        let kind = SkeletonKind::Current;
        let bone_heads = some(&heads(kind));
        let list = groups(&[
            ("PELVIS", 0.2),
            ("STOMACH", 0.2),
            ("TORSO", 0.2),
            ("HEAD", 0.2),
            ("LEFTHAND", 0.2),
        ]);
        let slots = encode_vertex(kind, Vec3::ZERO, &list, &bone_heads);
        assert_eq!(slots.iter().filter(|s| s.is_active()).count(), 4);
        assert_eq!(slots[6].weight, 0.0);
    }

    #[test]
    fn test_unknown_and_zero_groups_do_not_count() {
        let kind = SkeletonKind::Legacy;
        let bone_heads = some(&heads(kind));
        let list = groups(&[
            ("STOMACH", 0.5),
            ("TORSO", 0.0),
            ("HEAD", 0.25),
            ("TAIL", 0.25),
            ("LEFTHAND", 0.25),
            ("RIGHTHAND", 0.25),
            ("LEFTFOOT", 0.25),
            ("RIGHTFOOT", 0.25),
        ]);
        let influences = collect_influences(kind, &list);
        let bones: Vec<usize> = influences.iter().map(|i| i.bone).collect();
        assert_eq!(bones, vec![2, 5, 8, 11]);

        let slots = encode_vertex(kind, Vec3::ZERO, &list, &bone_heads);
        assert_eq!(slots[1].weight, 0.0);
        assert_eq!(slots[14].weight, 0.0);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let kind = SkeletonKind::Current;
        let bone_heads = some(&heads(kind));
        let slots = encode_vertex(
            kind,
            Vec3::ZERO,
            &groups(&[("TORSO", 0.75), ("TORSO", 0.25)]),
            &bone_heads,
        );
        assert_eq!(slots[2].weight, 0.75);
    }

    #[test]
    fn test_unweighted_vertex_binds_to_root() {
        let position = ARMATURE_ROOT + Vec3::new(1.125, 0.0, 2.25);
        let current = encode_vertex(
            SkeletonKind::Current,
            position,
            &[],
            &some(&heads(SkeletonKind::Current)),
        );
        assert_eq!(current[0].weight, 1.0);
        assert_eq!(current[0].offset, Vec3::new(1.0, 2.0, 0.0));

        let legacy = encode_vertex(
            SkeletonKind::Legacy,
            position,
            &[],
            &some(&heads(SkeletonKind::Legacy)),
        );
        assert_eq!(legacy[0].weight, 1.0);
        assert_eq!(legacy[0].offset, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_missing_bone_keeps_weight_with_zero_offset() {
        let kind = SkeletonKind::Current;
        let mut bone_heads = some(&heads(kind));
        bone_heads[5] = None;
        let slots = encode_vertex(
            kind,
            Vec3::new(3.0, 3.0, 3.0),
            &groups(&[("LEFTFOREARM", 0.5)]),
            &bone_heads,
        );
        assert_eq!(slots[5], WeightSlot { offset: Vec3::ZERO, weight: 0.5 });
    }

    #[test]
    fn test_single_influence_decodes_relative_to_bone() {
        let kind = SkeletonKind::Current;
        let bone_heads = heads(kind);
        let mut slots = vec![WeightSlot::default(); 16];
        let offset = Vec3::new(0.5, -0.25, 1.0);
        slots[3] = WeightSlot { offset, weight: 1.0 };

        let decoded = decode_vertex(Vec3::new(99.0, 99.0, 99.0), &slots, &bone_heads);
        assert_eq!(decoded.position, bone_heads[3] + scale_up(to_host_space(offset)));
        assert_eq!(decoded.influences, vec![Influence { bone: 3, weight: 1.0 }]);
    }

    #[test]
    fn test_decode_does_not_normalize() {
        let bone_heads = vec![Vec3::ZERO; 15];
        let mut slots = vec![WeightSlot::default(); 15];
        slots[0] = WeightSlot { offset: Vec3::new(0.0, 0.0, 1.0), weight: 0.5 };
        slots[4] = WeightSlot { offset: Vec3::new(0.0, 0.0, 1.0), weight: 0.25 };

        let decoded = decode_vertex(Vec3::ZERO, &slots, &bone_heads);
        let total: f32 = decoded.influences.iter().map(|i| i.weight).sum();
        assert_eq!(total, 0.75);
        assert_eq!(decoded.position, Vec3::new(0.0, 1.125 * 0.75, 0.0));
    }

    #[test]
    fn test_decode_without_weights_keeps_raw_position() {
        let slots = vec![WeightSlot::default(); 16];
        let decoded = decode_vertex(Vec3::new(1.0, 2.0, 3.0), &slots, &heads(SkeletonKind::Current));
        assert_eq!(decoded.position, Vec3::new(1.0, 3.0, 2.0));
        assert!(decoded.influences.is_empty());
    }

    #[test]
    fn test_decode_uses_first_four_active_slots() {
        let bone_heads = vec![Vec3::ZERO; 16];
        let slots: Vec<WeightSlot> = (0..16)
            .map(|_| WeightSlot { offset: Vec3::ZERO, weight: 0.125 })
            .collect();
        let decoded = decode_vertex(Vec3::ZERO, &slots, &bone_heads);
        let bones: Vec<usize> = decoded.influences.iter().map(|i| i.bone).collect();
        assert_eq!(bones, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_encode_decode_blend() {
        let kind = SkeletonKind::Current;
        let bone_heads = heads(kind);
        let position = bone_heads[2] + Vec3::new(1.125, 0.5625, -2.25);
        let slots = encode_vertex(
            kind,
            position,
            &groups(&[("TORSO", 0.5), ("PELVIS", 0.5)]),
            &some(&bone_heads),
        );
        let decoded = decode_vertex(Vec3::ZERO, &slots, &bone_heads);
        assert_eq!(decoded.position, position);
        assert_eq!(
            decoded.influences,
            vec![
                Influence { bone: 0, weight: 0.5 },
                Influence { bone: 2, weight: 0.5 }
            ]
        );
    }

    #[test]
    fn test_vertex_weights_replace() {
        let mut weights = VertexWeights::new();
        weights.assign(2, 5, 0.25);
        weights.assign(2, 1, 0.5);
        weights.assign(2, 5, 0.75);
        weights.assign(3, 0, 1.0);

        assert_eq!(weights.len(), 3);
        assert_eq!(weights.get(2, 5), Some(0.75));
        assert_eq!(
            weights.influences(2),
            vec![Influence { bone: 1, weight: 0.5 }, Influence { bone: 5, weight: 0.75 }]
        );
        assert_eq!(weights.influences(4), Vec::new());
    }
}
