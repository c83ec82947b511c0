//! Editable polygon mesh and the mesh surgery capability the exporters need.
//!
//! Exporters never touch a host's own mesh structures. They work on any type
//! implementing [`MeshSurgery`], which exposes per-corner UV reads,
//! triangulation and edge splitting. [`EditMesh`] is the in-crate
//! implementation used by the CLI and the tests.

use crate::types::Triangle;
use glam::{Vec2, Vec3};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Mesh operations supplied by the host.
pub trait MeshSurgery {
    fn vertex_count(&self) -> usize;

    /// Host-space vertex position.
    fn position(&self, vertex: usize) -> Vec3;

    fn face_count(&self) -> usize;

    /// Vertex indices of a face in corner order.
    fn face(&self, face: usize) -> &[usize];

    fn uv_layer_count(&self) -> usize;

    /// UV of one face corner in the given layer.
    fn corner_uv(&self, layer: usize, face: usize, corner: usize) -> Vec2;

    /// Ordered `(vertex group name, weight)` list of a vertex.
    fn influences(&self, vertex: usize) -> &[(String, f32)];

    /// Turn every face into triangles.
    fn triangulate(&mut self);

    /// Cut the mesh along the given edges, duplicating vertices so faces on
    /// either side of a cut no longer share them.
    fn split_edges(&mut self, edges: &[[usize; 2]]);

    /// Unique undirected edges, lower index first.
    fn edges(&self) -> Vec<[usize; 2]> {
        let mut edges = BTreeSet::new();
        for face in 0..self.face_count() {
            let verts = self.face(face);
            for (i, &a) in verts.iter().enumerate() {
                let b = verts[(i + 1) % verts.len()];
                edges.insert([a.min(b), a.max(b)]);
            }
        }
        edges.into_iter().collect()
    }
}

/// Triangles of an already triangulated mesh. Larger faces are fanned.
pub fn triangles<M: MeshSurgery + ?Sized>(mesh: &M) -> Vec<Triangle> {
    let mut tris = Vec::with_capacity(mesh.face_count());
    for face in 0..mesh.face_count() {
        let verts = mesh.face(face);
        for i in 1..verts.len().saturating_sub(1) {
            tris.push([verts[0] as u32, verts[i] as u32, verts[i + 1] as u32]);
        }
    }
    tris
}

/// One UV per vertex, taken from the first corner that uses it.
///
/// Loose vertices, or meshes without the requested layer, get `(0, 0)`.
pub fn first_corner_uvs<M: MeshSurgery + ?Sized>(mesh: &M, layer: usize) -> Vec<Vec2> {
    let mut uvs: Vec<Option<Vec2>> = vec![None; mesh.vertex_count()];
    if layer < mesh.uv_layer_count() {
        for face in 0..mesh.face_count() {
            for (corner, &v) in mesh.face(face).iter().enumerate() {
                if uvs[v].is_none() {
                    uvs[v] = Some(mesh.corner_uv(layer, face, corner));
                }
            }
        }
    }
    uvs.into_iter().map(Option::unwrap_or_default).collect()
}

/// A polygon with per-layer corner UVs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    pub vertices: Vec<usize>,
    /// `uvs[layer][corner]`.
    pub uvs: Vec<Vec<Vec2>>,
}

/// Simple indexed polygon mesh.
#[derive(Debug, Clone, Default)]
pub struct EditMesh {
    /// Host-space vertex positions.
    pub positions: Vec<Vec3>,
    pub faces: Vec<Face>,
    pub uv_layers: Vec<String>,
    /// Vertex group memberships, parallel to `positions`.
    pub groups: Vec<Vec<(String, f32)>>,
}

impl EditMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from indexed triangles with one UV per vertex.
    ///
    /// Every corner of a vertex gets the same UV.
    pub fn from_triangles(positions: &[Vec3], triangles: &[Triangle], uvs: Option<&[Vec2]>) -> Self {
        let mut mesh = Self::new();
        for &p in positions {
            mesh.add_vertex(p);
        }
        if uvs.is_some() {
            mesh.add_uv_layer("UVMap");
        }
        for &tri in triangles {
            let verts = tri.map(|v| v as usize);
            let face = mesh.add_face(&verts);
            if let Some(uvs) = uvs {
                let corner_uvs = verts.map(|v| uvs.get(v).copied().unwrap_or_default());
                mesh.set_face_uvs(face, 0, &corner_uvs);
            }
        }
        mesh
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, position: Vec3) -> usize {
        self.positions.push(position);
        self.groups.push(Vec::new());
        self.positions.len() - 1
    }

    /// Add a UV layer; existing corners start at `(0, 0)`.
    pub fn add_uv_layer(&mut self, name: impl Into<String>) -> usize {
        self.uv_layers.push(name.into());
        for face in &mut self.faces {
            face.uvs.push(vec![Vec2::ZERO; face.vertices.len()]);
        }
        self.uv_layers.len() - 1
    }

    /// Add a face and return its index. Corner UVs start at `(0, 0)`.
    pub fn add_face(&mut self, vertices: &[usize]) -> usize {
        self.faces.push(Face {
            vertices: vertices.to_vec(),
            uvs: vec![vec![Vec2::ZERO; vertices.len()]; self.uv_layers.len()],
        });
        self.faces.len() - 1
    }

    pub fn set_face_uvs(&mut self, face: usize, layer: usize, uvs: &[Vec2]) {
        let corners = &mut self.faces[face].uvs[layer];
        for (dst, src) in corners.iter_mut().zip(uvs) {
            *dst = *src;
        }
    }

    /// Add or replace a vertex group weight.
    pub fn set_group(&mut self, vertex: usize, name: &str, weight: f32) {
        let groups = &mut self.groups[vertex];
        match groups.iter().position(|(n, _)| n == name) {
            Some(index) => groups[index].1 = weight,
            None => groups.push((name.to_string(), weight)),
        }
    }

    /// Corner UVs of every face corner using `vertex`, per layer.
    pub fn vertex_uvs(&self, layer: usize, vertex: usize) -> Vec<Vec2> {
        self.faces
            .iter()
            .flat_map(|face| {
                face.vertices
                    .iter()
                    .zip(&face.uvs[layer])
                    .filter(move |(v, _)| **v == vertex)
                    .map(|(_, &uv)| uv)
            })
            .collect()
    }

    fn duplicate_vertex(&mut self, vertex: usize) -> usize {
        let position = self.positions[vertex];
        let groups = self.groups[vertex].clone();
        self.positions.push(position);
        self.groups.push(groups);
        self.positions.len() - 1
    }
}

impl MeshSurgery for EditMesh {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn position(&self, vertex: usize) -> Vec3 {
        self.positions[vertex]
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, face: usize) -> &[usize] {
        &self.faces[face].vertices
    }

    fn uv_layer_count(&self) -> usize {
        self.uv_layers.len()
    }

    fn corner_uv(&self, layer: usize, face: usize, corner: usize) -> Vec2 {
        self.faces[face].uvs[layer][corner]
    }

    fn influences(&self, vertex: usize) -> &[(String, f32)] {
        &self.groups[vertex]
    }

    fn triangulate(&mut self) {
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in self.faces.drain(..) {
            if face.vertices.len() <= 3 {
                faces.push(face);
                continue;
            }
            for i in 1..face.vertices.len() - 1 {
                let corners = [0, i, i + 1];
                faces.push(Face {
                    vertices: corners.iter().map(|&c| face.vertices[c]).collect(),
                    uvs: face
                        .uvs
                        .iter()
                        .map(|layer| corners.iter().map(|&c| layer[c]).collect())
                        .collect(),
                });
            }
        }
        self.faces = faces;
    }

    fn split_edges(&mut self, edges: &[[usize; 2]]) {
        let cut: HashSet<[usize; 2]> = edges.iter().map(|&[a, b]| [a.min(b), a.max(b)]).collect();
        let touched: BTreeSet<usize> = edges.iter().flat_map(|e| e.iter().copied()).collect();
        let original: Vec<Vec<usize>> = self.faces.iter().map(|f| f.vertices.clone()).collect();

        // Corners around each touched vertex, in face order.
        let mut corners: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
        for (f, verts) in original.iter().enumerate() {
            for (c, v) in verts.iter().enumerate() {
                if touched.contains(v) {
                    corners.entry(*v).or_default().push((f, c));
                }
            }
        }

        let mut remap: Vec<(usize, usize, usize)> = Vec::new();
        for &vertex in &touched {
            let Some(fan) = corners.get(&vertex) else {
                continue;
            };

            // Corners joined by an uncut edge end up in the same fan.
            let mut parent: Vec<usize> = (0..fan.len()).collect();
            let mut by_neighbor: HashMap<usize, usize> = HashMap::new();
            for (i, &(f, c)) in fan.iter().enumerate() {
                let verts = &original[f];
                let prev = verts[(c + verts.len() - 1) % verts.len()];
                let next = verts[(c + 1) % verts.len()];
                for neighbor in [prev, next] {
                    if cut.contains(&[vertex.min(neighbor), vertex.max(neighbor)]) {
                        continue;
                    }
                    match by_neighbor.get(&neighbor) {
                        Some(&j) => union(&mut parent, i, j),
                        None => {
                            by_neighbor.insert(neighbor, i);
                        }
                    }
                }
            }

            let mut fan_vertex: HashMap<usize, usize> = HashMap::new();
            for (i, &(f, c)) in fan.iter().enumerate() {
                let root = find(&mut parent, i);
                let target = match fan_vertex.get(&root) {
                    Some(&v) => v,
                    None => {
                        let v = if fan_vertex.is_empty() {
                            vertex
                        } else {
                            self.duplicate_vertex(vertex)
                        };
                        fan_vertex.insert(root, v);
                        v
                    }
                };
                if target != vertex {
                    remap.push((f, c, target));
                }
            }
        }

        for (f, c, v) in remap {
            self.faces[f].vertices[c] = v;
        }
    }
}

fn find(parent: &mut [usize], i: usize) -> usize {
    let mut root = i;
    while parent[root] != root {
        root = parent[root];
    }
    let mut node = i;
    while parent[node] != root {
        let next = parent[node];
        parent[node] = root;
        node = next;
    }
    root
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> EditMesh {
        let mut mesh = EditMesh::new();
        for p in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            mesh.add_vertex(Vec3::new(p[0], p[1], 0.0));
        }
        mesh.add_uv_layer("UVMap");
        let face = mesh.add_face(&[0, 1, 2, 3]);
        mesh.set_face_uvs(
            face,
            0,
            &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)],
        );
        mesh
    }

    #[test]
    fn test_triangulate_fans_polygons() {
        let mut mesh = quad();
        mesh.triangulate();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.face(0), &[0, 1, 2]);
        assert_eq!(mesh.face(1), &[0, 2, 3]);
        assert_eq!(mesh.corner_uv(0, 1, 2), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_edges_are_unique() {
        let mut mesh = quad();
        mesh.triangulate();
        assert_eq!(mesh.edges(), vec![[0, 1], [0, 2], [0, 3], [1, 2], [2, 3]]);
    }

    #[test]
    fn test_first_corner_uvs() {
        let mut mesh = quad();
        mesh.add_vertex(Vec3::ONE);
        let uvs = first_corner_uvs(&mesh, 0);
        assert_eq!(uvs[2], Vec2::new(1.0, 1.0));
        assert_eq!(uvs[4], Vec2::ZERO);
        assert_eq!(first_corner_uvs(&mesh, 3), vec![Vec2::ZERO; 5]);
    }

    #[test]
    fn test_split_shared_edge_separates_triangles() {
        let mut mesh = quad();
        mesh.triangulate();
        mesh.set_group(0, "PELVIS", 1.0);
        mesh.split_edges(&[[0, 2]]);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.face(0), &[0, 1, 2]);
        assert_eq!(mesh.face(1), &[4, 5, 3]);
        assert_eq!(mesh.position(4), mesh.position(0));
        assert_eq!(mesh.influences(4), mesh.influences(0));
    }

    #[test]
    fn test_split_keeps_fans_joined_by_uncut_edges() {
        // Three triangles around vertex 0; cutting one edge of the fan
        // leaves it open but connected.
        let mut mesh = EditMesh::new();
        for p in [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]] {
            mesh.add_vertex(Vec3::new(p[0], p[1], 0.0));
        }
        mesh.add_face(&[0, 1, 2]);
        mesh.add_face(&[0, 2, 3]);
        mesh.add_face(&[0, 3, 4]);
        mesh.split_edges(&[[0, 2]]);

        assert_eq!(mesh.vertex_count(), 7);
        assert_eq!(mesh.face(0), &[0, 1, 2]);
        assert_eq!(mesh.face(1), &[5, 6, 3]);
        assert_eq!(mesh.face(2), &[5, 3, 4]);
        assert_eq!(mesh.position(6), mesh.position(2));
    }

    #[test]
    fn test_from_triangles_assigns_vertex_uvs() {
        let mesh = EditMesh::from_triangles(
            &[Vec3::ZERO, Vec3::X, Vec3::Y],
            &[[0, 1, 2]],
            Some(&[Vec2::ZERO, Vec2::X, Vec2::Y]),
        );
        assert_eq!(mesh.uv_layer_count(), 1);
        assert_eq!(mesh.vertex_uvs(0, 2), vec![Vec2::Y]);
        assert_eq!(triangles(&mesh), vec![[0, 1, 2]]);
    }
}
