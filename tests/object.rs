use cmod::{
    export_obj, import_cmo, load_cmo, save_cmo, CmodError, EditMesh, ExportConfig, ImportConfig,
    MemoryObject,
};
use glam::{Vec2, Vec3};
use std::fs;

fn f32_at(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn triangle(name: &str, lift: f32) -> MemoryObject {
    let positions = [
        Vec3::new(1.0, 2.0, 3.0 + lift),
        Vec3::new(4.0, 5.0, 6.0 + lift),
        Vec3::new(7.0, 8.0, 9.0 + lift),
    ];
    let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)];
    MemoryObject::new(name, EditMesh::from_triangles(&positions, &[[0, 1, 2]], Some(&uvs)))
}

#[test]
fn test_single_triangle_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rock.cmo");
    save_cmo(&path, [&triangle("rock", 0.0)], &ExportConfig::default()).unwrap();

    let bytes = fs::read(&path).unwrap();
    // header, count, 3 × (pos + padded uv), count, 1 × face record
    assert_eq!(bytes.len(), 8 + 4 + 3 * 24 + 4 + 20);
    assert_eq!(&bytes[0..4], b"CMod");
    assert_eq!(i32_at(&bytes, 4), 3);
    assert_eq!(i32_at(&bytes, 8), 3);

    // position is stored with Y and Z swapped
    assert_eq!(f32_at(&bytes, 12), 1.0);
    assert_eq!(f32_at(&bytes, 16), 3.0);
    assert_eq!(f32_at(&bytes, 20), 2.0);
    // uv padding
    assert_eq!(f32_at(&bytes, 32), 0.0);

    let faces = 12 + 3 * 24;
    assert_eq!(i32_at(&bytes, faces), 1);
    let record: Vec<i32> = (0..5).map(|i| i32_at(&bytes, faces + 4 + i * 4)).collect();
    assert_eq!(record, vec![3, 0, 1, 2, 0]);
    assert_eq!(i32_at(&bytes, faces + 24), 0);
}

#[test]
fn test_load_restores_host_space() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rock.cmo");
    let object = triangle("rock", 0.0);
    save_cmo(&path, [&object], &ExportConfig::default()).unwrap();

    let mesh = load_cmo(&path, &ImportConfig::default()).unwrap();
    assert_eq!(mesh.name, "rock");
    assert_eq!(mesh.positions, object.mesh.as_ref().unwrap().positions);
    assert_eq!(mesh.uvs[2], Vec2::new(0.5, 1.0));
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);

    let bounds = mesh.bounds().unwrap();
    assert_eq!(bounds.min, [1.0, 2.0, 3.0]);
    assert_eq!(bounds.max, [7.0, 8.0, 9.0]);
}

#[test]
fn test_merge_offsets_faces_and_skips_non_meshes() {
    let empty = MemoryObject {
        name: "camera".to_string(),
        ..MemoryObject::default()
    };
    let objects = [triangle("a", 0.0), empty, triangle("b", 10.0)];
    let bytes = cmod::export_cmo(objects.iter(), &ExportConfig::default(), Vec::new()).unwrap();

    let mesh = import_cmo(&bytes[..], "merged", &ImportConfig::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 4, 5]]);
    assert_eq!(mesh.positions[3], Vec3::new(1.0, 2.0, 13.0));
}

#[test]
fn test_quads_are_triangulated() {
    let mut mesh = EditMesh::new();
    for p in [Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y] {
        mesh.add_vertex(p);
    }
    mesh.add_face(&[0, 1, 2, 3]);
    let object = MemoryObject::new("tile", mesh);

    let bytes = cmod::export_cmo([&object], &ExportConfig::default(), Vec::new()).unwrap();
    let imported = import_cmo(&bytes[..], "tile", &ImportConfig::default()).unwrap();
    assert_eq!(imported.triangle_count(), 2);
    // no UV layer at all
    assert!(imported.uvs.iter().all(|&uv| uv == Vec2::ZERO));
}

#[test]
fn test_empty_scene_writes_empty_object() {
    let bytes =
        cmod::export_cmo(std::iter::empty::<&MemoryObject>(), &ExportConfig::default(), Vec::new())
            .unwrap();
    assert_eq!(bytes.len(), 16);

    let mesh = import_cmo(&bytes[..], "void", &ImportConfig::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 0);
    assert!(mesh.bounds().is_none());
}

#[test]
fn test_wrong_version_is_rejected() {
    let mut bytes = b"CMod".to_vec();
    bytes.extend_from_slice(&99i32.to_le_bytes());
    let err = import_cmo(&bytes[..], "x", &ImportConfig::default()).unwrap_err();
    assert!(matches!(err, CmodError::Format(_)));

    let mut character = b"CMod".to_vec();
    character.extend_from_slice(&2i32.to_le_bytes());
    let err = import_cmo(&character[..], "x", &ImportConfig::default()).unwrap_err();
    assert!(matches!(err, CmodError::Format(_)));
}

#[test]
fn test_obj_dump_of_loaded_object() {
    let bytes =
        cmod::export_cmo([&triangle("rock", 0.0)], &ExportConfig::default(), Vec::new()).unwrap();
    let mesh = import_cmo(&bytes[..], "rock", &ImportConfig::default()).unwrap();

    let obj = String::from_utf8(export_obj(&mesh, Vec::new()).unwrap()).unwrap();
    assert!(obj.contains("o rock"));
    assert!(obj.contains("v 1 2 3"));
    assert!(obj.contains("f 1/1 2/2 3/3"));
}
