use super::*;
use approx::assert_relative_eq;
use glam::DVec3;
use mesh_builder::MeshBuilder;

/// Unit cube corners: bit 0 is +x, bit 1 is +y, bit 2 is +z.
fn cube_positions() -> Vec<DVec3> {
    (0..8)
        .map(|k| {
            DVec3::new(
                (k & 1) as f64,
                ((k >> 1) & 1) as f64,
                ((k >> 2) & 1) as f64,
            )
        })
        .collect()
}

/// Outward-wound quads of the unit cube.
const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 2, 3, 1],
    [4, 5, 7, 6],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 4, 6, 2],
    [1, 3, 7, 5],
];

fn cube() -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new(cube_positions());
    for face in CUBE_FACES {
        mesh.add_face(&face).unwrap();
    }
    mesh
}

/// Two triangles sharing the diagonal 0-2 of a unit square.
fn square() -> HalfEdgeMesh {
    let mut mesh = HalfEdgeMesh::new(vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y]);
    mesh.add_face(&[0, 1, 2]).unwrap();
    mesh.add_face(&[0, 2, 3]).unwrap();
    mesh
}

#[test]
fn test_cube_is_closed() {
    let mesh = cube();
    assert!(mesh.is_closed());
    assert!(mesh.boundary_half_edges().is_empty());
    assert_eq!(mesh.face_count(), 6);
    assert_eq!(mesh.half_edge_count(), 24);
    assert_eq!(mesh.edge_count(), 12);
    assert_eq!(mesh.euler_characteristic(), 2);
}

#[test]
fn test_cube_twins_are_symmetric_and_opposite() {
    let mesh = cube();
    for i in 0..mesh.half_edge_count() as u32 {
        let h = HalfEdgeId(i);
        let t = mesh.twin(h).unwrap().unwrap();
        assert_eq!(mesh.twin(t).unwrap(), Some(h));
        assert_eq!(mesh.origin(t).unwrap(), mesh.destination(h).unwrap());
        assert_eq!(mesh.destination(t).unwrap(), mesh.origin(h).unwrap());
        assert_ne!(mesh.face_of(t).unwrap(), mesh.face_of(h).unwrap());
    }
}

#[test]
fn test_cube_adjacency() {
    let mesh = cube();
    for f in 0..6 {
        let adjacent = mesh.adjacent_faces(FaceId(f)).unwrap();
        assert_eq!(adjacent.len(), 4);
        assert!(!adjacent.contains(&FaceId(f)));
    }
    for v in 0..8 {
        assert_eq!(mesh.outgoing_half_edges(VertexId(v)).unwrap().len(), 3);
        assert_eq!(mesh.vertex_neighbors(VertexId(v)).unwrap().len(), 3);
    }
    assert_eq!(
        mesh.vertex_neighbors(VertexId(0)).unwrap(),
        vec![VertexId(1), VertexId(2), VertexId(4)]
    );
}

#[test]
fn test_same_face_twice_is_non_manifold() {
    let mut mesh = cube();
    let err = mesh.add_face(&CUBE_FACES[0]).unwrap_err();
    assert!(matches!(err, TopologyError::NonManifoldEdge { .. }));
    assert_eq!(mesh.face_count(), 6);
    assert_eq!(mesh.half_edge_count(), 24);
    assert!(mesh.is_closed());
}

#[test]
fn test_repeated_face_on_open_mesh_is_non_manifold() {
    let mut mesh = square();
    let err = mesh.add_face(&[0, 1, 2]).unwrap_err();
    assert_eq!(err, TopologyError::NonManifoldEdge { from: 0, to: 1 });

    // Same cycle, different starting vertex.
    let err = mesh.add_face(&[3, 0, 2]).unwrap_err();
    assert_eq!(err, TopologyError::NonManifoldEdge { from: 3, to: 0 });
    assert_eq!(mesh.face_count(), 2);
    assert_eq!(mesh.half_edge_count(), 6);
}

#[test]
fn test_third_face_on_edge_is_non_manifold() {
    let positions = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::NEG_Y, DVec3::Z];
    let mut mesh = HalfEdgeMesh::new(positions);
    mesh.add_face(&[0, 1, 2]).unwrap();
    mesh.add_face(&[1, 0, 3]).unwrap();
    let err = mesh.add_face(&[0, 1, 4]).unwrap_err();
    assert_eq!(err, TopologyError::NonManifoldEdge { from: 0, to: 1 });
    assert_eq!(mesh.face_count(), 2);
}

#[test]
fn test_same_direction_edge_is_inconsistent_winding() {
    let mut mesh = square();
    let before = mesh.half_edge_count();
    let err = mesh.add_face(&[1, 2, 3]).unwrap_err();
    assert_eq!(err, TopologyError::InconsistentWinding { from: 1, to: 2 });
    assert_eq!(mesh.half_edge_count(), before);
}

#[test]
fn test_rejects_malformed_faces() {
    let mut mesh = HalfEdgeMesh::new(cube_positions());
    assert_eq!(mesh.add_face(&[0, 1]).unwrap_err(), TopologyError::FaceTooSmall(2));
    assert_eq!(
        mesh.add_face(&[0, 1, 8]).unwrap_err(),
        TopologyError::InvalidVertex { index: 8, count: 8 }
    );
    assert_eq!(mesh.add_face(&[0, 1, 0]).unwrap_err(), TopologyError::DegenerateFace(0));
    assert_eq!(mesh.half_edge_count(), 0);
    assert_eq!(mesh.face_count(), 0);
}

#[test]
fn test_square_boundary_and_queries() {
    let mesh = square();
    assert!(!mesh.is_closed());
    assert_eq!(mesh.edge_count(), 5);
    assert_eq!(mesh.euler_characteristic(), 1);

    let boundary = mesh.boundary_half_edges();
    assert_eq!(boundary.len(), 4);
    assert!(boundary.iter().all(|&h| mesh.is_boundary(h).unwrap()));

    // Half-edge 2 is 2->0 in the first face, twinned with 0->2 in the second.
    let diagonal = HalfEdgeId(2);
    assert_eq!(mesh.origin(diagonal).unwrap(), VertexId(2));
    assert_eq!(mesh.destination(diagonal).unwrap(), VertexId(0));
    assert_eq!(mesh.twin(diagonal).unwrap(), Some(HalfEdgeId(3)));
    assert_eq!(mesh.next(diagonal).unwrap(), HalfEdgeId(0));
    assert_eq!(mesh.prev(diagonal).unwrap(), HalfEdgeId(1));

    assert_eq!(
        mesh.face_half_edges(FaceId(1)).unwrap(),
        vec![HalfEdgeId(3), HalfEdgeId(4), HalfEdgeId(5)]
    );
    assert_eq!(
        mesh.face_vertices(FaceId(1)).unwrap(),
        vec![VertexId(0), VertexId(2), VertexId(3)]
    );
    assert_eq!(mesh.adjacent_faces(FaceId(0)).unwrap(), vec![FaceId(1)]);

    assert_eq!(
        mesh.vertex_neighbors(VertexId(0)).unwrap(),
        vec![VertexId(1), VertexId(2), VertexId(3)]
    );
    assert_eq!(
        mesh.vertex_neighbors(VertexId(1)).unwrap(),
        vec![VertexId(0), VertexId(2)]
    );
}

#[test]
fn test_invalid_references() {
    let mesh = square();
    assert_eq!(
        mesh.twin(HalfEdgeId(6)).unwrap_err(),
        TopologyError::InvalidHalfEdge(HalfEdgeId(6))
    );
    assert_eq!(
        mesh.face_half_edges(FaceId(2)).unwrap_err(),
        TopologyError::InvalidFace(FaceId(2))
    );
    assert!(mesh.outgoing_half_edges(VertexId(4)).is_err());
    assert!(mesh.position(VertexId(4)).is_err());
}

#[test]
fn test_error_display() {
    let err = TopologyError::InvalidHalfEdge(HalfEdgeId(42));
    assert_eq!(err.to_string(), "Invalid half-edge reference: HalfEdgeId(42)");
}

#[test]
fn test_from_shared_corner_box() {
    let mut builder = MeshBuilder::new(false, false);
    builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
    let mesh = HalfEdgeMesh::from_mesh(&builder.to_mesh(false).unwrap()).unwrap();

    assert!(mesh.is_closed());
    assert_eq!(mesh.face_count(), 12);
    assert_eq!(mesh.edge_count(), 18);
    assert_eq!(mesh.euler_characteristic(), 2);
    let corner = mesh.position(VertexId(7)).unwrap();
    assert_relative_eq!(corner.x, 0.5);
    assert_relative_eq!(corner.y, 0.5);
    assert_relative_eq!(corner.z, 0.5);
}

#[test]
fn test_from_per_face_box_is_open() {
    let mut builder = MeshBuilder::new(true, false);
    builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
    let mesh = HalfEdgeMesh::from_mesh(&builder.to_mesh(false).unwrap()).unwrap();

    assert!(!mesh.is_closed());
    // Each face is an isolated quad split along one diagonal.
    assert_eq!(mesh.boundary_half_edges().len(), 24);
    assert_eq!(mesh.edge_count(), 30);
}

#[test]
fn test_from_welded_box_is_closed() {
    let mut builder = MeshBuilder::new(true, false);
    builder.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
    builder.weld();
    let mesh = HalfEdgeMesh::from_mesh(&builder.to_mesh(false).unwrap()).unwrap();
    assert!(mesh.is_closed());
    assert_eq!(mesh.vertex_count(), 8);
}

#[test]
fn test_from_welded_sphere_is_closed() {
    let mut builder = MeshBuilder::new(true, true);
    builder.add_sphere(DVec3::ZERO, 1.0, 8, 5).unwrap();
    builder.weld();
    let mesh = HalfEdgeMesh::from_mesh(&builder.to_mesh(false).unwrap()).unwrap();
    assert!(mesh.is_closed());
    assert_eq!(mesh.vertex_count(), 26);
    assert_eq!(mesh.face_count(), 48);
    assert_eq!(mesh.euler_characteristic(), 2);
}
