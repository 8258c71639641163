//! # Box Primitive
//!
//! Axis-aligned boxes, either with 8 shared corners or with 4 vertices per
//! face.

use super::MeshBuilder;
use crate::error::{ensure_positive, MeshResult};
use glam::{DVec2, DVec3};
use std::ops::BitOr;

/// Set of box faces to generate.
///
/// Faces are named by their outward direction: `FRONT` is `+X`, `LEFT` is
/// `-Y`, `TOP` is `+Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxFaces(u8);

impl BoxFaces {
    /// No faces
    pub const NONE: Self = Self(0);
    /// Face at `+X`
    pub const FRONT: Self = Self(1);
    /// Face at `-X`
    pub const BACK: Self = Self(1 << 1);
    /// Face at `-Y`
    pub const LEFT: Self = Self(1 << 2);
    /// Face at `+Y`
    pub const RIGHT: Self = Self(1 << 3);
    /// Face at `+Z`
    pub const TOP: Self = Self(1 << 4);
    /// Face at `-Z`
    pub const BOTTOM: Self = Self(1 << 5);
    /// All six faces
    pub const ALL: Self = Self(0b11_1111);

    /// Returns true if every face of `other` is in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of faces in the set.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for BoxFaces {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One face of the box: selector, outward normal, up direction.
struct FaceLayout {
    face: BoxFaces,
    normal: DVec3,
    up: DVec3,
}

const FACES: [FaceLayout; 6] = [
    FaceLayout { face: BoxFaces::FRONT, normal: DVec3::X, up: DVec3::Z },
    FaceLayout { face: BoxFaces::BACK, normal: DVec3::NEG_X, up: DVec3::Z },
    FaceLayout { face: BoxFaces::LEFT, normal: DVec3::NEG_Y, up: DVec3::Z },
    FaceLayout { face: BoxFaces::RIGHT, normal: DVec3::Y, up: DVec3::Z },
    FaceLayout { face: BoxFaces::TOP, normal: DVec3::Z, up: DVec3::Y },
    FaceLayout { face: BoxFaces::BOTTOM, normal: DVec3::NEG_Z, up: DVec3::Y },
];

/// Corner offsets `(-u - r, -u + r, u + r, u - r)` of a face quad.
fn face_corners(center: DVec3, normal: DVec3, up: DVec3, dist: f64, width: f64, height: f64) -> [DVec3; 4] {
    let right = normal.cross(up) * (width / 2.0);
    let up = up * (height / 2.0);
    let n = center + normal * (dist / 2.0);
    [n - up - right, n - up + right, n + up + right, n + up - right]
}

/// Extent of the box along a unit axis.
fn extent(size: DVec3, axis: DVec3) -> f64 {
    size.dot(axis.abs())
}

impl MeshBuilder {
    /// Appends an axis-aligned box.
    ///
    /// `width` is along X, `height` along Y and `depth` along Z.
    ///
    /// When the builder keeps normals or texture coordinates each face gets
    /// its own 4 vertices (24 total) so normals stay flat; otherwise the 8
    /// corners are shared. Either way 12 outward-facing triangles are added.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::MeshBuilder;
    /// use glam::DVec3;
    ///
    /// let mut shared = MeshBuilder::new(false, false);
    /// shared.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
    /// assert_eq!(shared.vertex_count(), 8);
    ///
    /// let mut per_face = MeshBuilder::new(true, false);
    /// per_face.add_box(DVec3::ZERO, 1.0, 1.0, 1.0).unwrap();
    /// assert_eq!(per_face.vertex_count(), 24);
    /// assert_eq!(per_face.triangle_indices().len(), 36);
    /// ```
    pub fn add_box(&mut self, center: DVec3, width: f64, height: f64, depth: f64) -> MeshResult<()> {
        self.add_box_faces(center, width, height, depth, BoxFaces::ALL)
    }

    /// Appends the selected faces of an axis-aligned box.
    pub fn add_box_faces(
        &mut self,
        center: DVec3,
        width: f64,
        height: f64,
        depth: f64,
        faces: BoxFaces,
    ) -> MeshResult<()> {
        ensure_positive("width", width)?;
        ensure_positive("height", height)?;
        ensure_positive("depth", depth)?;
        let size = DVec3::new(width, height, depth);

        if self.has_normals() || self.has_texture_coordinates() {
            for spec in FACES.iter().filter(|s| faces.contains(s.face)) {
                let right = spec.normal.cross(spec.up);
                self.add_cube_face(
                    center,
                    spec.normal,
                    spec.up,
                    extent(size, spec.normal),
                    extent(size, right),
                    extent(size, spec.up),
                )?;
            }
            return Ok(());
        }

        // Corner k has +x if bit 0 is set, +y for bit 1, +z for bit 2.
        let index0 = self.vertex_count() as u32;
        let half = size / 2.0;
        for k in 0..8u32 {
            let sign = DVec3::new(
                if k & 1 != 0 { 1.0 } else { -1.0 },
                if k & 2 != 0 { 1.0 } else { -1.0 },
                if k & 4 != 0 { 1.0 } else { -1.0 },
            );
            self.add_node(center + sign * half, DVec3::ZERO, DVec2::ZERO);
        }

        let corner_index = |p: DVec3| {
            let d = p - center;
            index0 + (d.x > 0.0) as u32 + 2 * (d.y > 0.0) as u32 + 4 * (d.z > 0.0) as u32
        };
        for spec in FACES.iter().filter(|s| faces.contains(s.face)) {
            let right = spec.normal.cross(spec.up);
            let [p1, p2, p3, p4] = face_corners(
                center,
                spec.normal,
                spec.up,
                extent(size, spec.normal),
                extent(size, right),
                extent(size, spec.up),
            )
            .map(|p| corner_index(p));
            self.triangle_indices.extend([p3, p2, p1, p1, p4, p3]);
        }
        Ok(())
    }

    /// Appends one rectangular face with its own 4 vertices.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the box the face belongs to
    /// * `normal` - Outward face normal (unit length)
    /// * `up` - Face up direction (unit length, perpendicular to `normal`)
    /// * `dist` - Distance between this face and the opposite one
    /// * `width` - Face extent along `normal × up`
    /// * `height` - Face extent along `up`
    pub fn add_cube_face(
        &mut self,
        center: DVec3,
        normal: DVec3,
        up: DVec3,
        dist: f64,
        width: f64,
        height: f64,
    ) -> MeshResult<()> {
        ensure_positive("width", width)?;
        ensure_positive("height", height)?;
        let [p1, p2, p3, p4] = face_corners(center, normal, up, dist, width, height);

        let i0 = self.add_node(p1, normal, DVec2::ONE);
        self.add_node(p2, normal, DVec2::Y);
        self.add_node(p3, normal, DVec2::ZERO);
        self.add_node(p4, normal, DVec2::X);
        self.triangle_indices
            .extend([i0 + 2, i0 + 1, i0, i0, i0 + 3, i0 + 2]);
        Ok(())
    }
}
