//! Multi-UV vertex splitting for the legacy character writer.
//!
//! Legacy character files store exactly one UV per vertex. Before writing,
//! every vertex that is used with different UVs by different faces has to
//! be separated. The pass records the first UV seen for each vertex in each
//! layer; a face with a corner that disagrees gets all of its vertices
//! marked, and every edge whose two endpoints are marked is cut.

use crate::mesh::MeshSurgery;
use glam::Vec2;

/// What a split pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitReport {
    pub marked_vertices: usize,
    pub split_edges: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
}

/// Vertices referenced with inconsistent UVs, per the first-seen rule.
pub fn mark_multi_uv_vertices<M: MeshSurgery + ?Sized>(mesh: &M) -> Vec<bool> {
    let mut marked = vec![false; mesh.vertex_count()];

    for layer in 0..mesh.uv_layer_count() {
        let mut seen: Vec<Option<Vec2>> = vec![None; mesh.vertex_count()];
        for face in 0..mesh.face_count() {
            let verts = mesh.face(face);
            for (corner, &vertex) in verts.iter().enumerate() {
                let uv = mesh.corner_uv(layer, face, corner);
                match seen[vertex] {
                    None => seen[vertex] = Some(uv),
                    Some(first) if first != uv => {
                        for &v in verts {
                            marked[v] = true;
                        }
                    }
                    Some(_) => {}
                }
            }
        }
    }

    marked
}

/// Split the mesh so every vertex carries a single UV per layer.
pub fn split_multi_uv_vertices<M: MeshSurgery + ?Sized>(mesh: &mut M) -> SplitReport {
    let vertices_before = mesh.vertex_count();
    let marked = mark_multi_uv_vertices(mesh);

    let edges: Vec<[usize; 2]> = mesh
        .edges()
        .into_iter()
        .filter(|&[a, b]| marked[a] && marked[b])
        .collect();

    if !edges.is_empty() {
        mesh.split_edges(&edges);
    }

    let report = SplitReport {
        marked_vertices: marked.iter().filter(|&&m| m).count(),
        split_edges: edges.len(),
        vertices_before,
        vertices_after: mesh.vertex_count(),
    };
    log::debug!(
        "uv split: {} marked vertices, {} edges cut, {} -> {} vertices",
        report.marked_vertices,
        report.split_edges,
        report.vertices_before,
        report.vertices_after
    );
    report
}
