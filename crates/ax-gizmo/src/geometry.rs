//! Handle draw geometry
//!
//! Tessellates a [`HandleSet`] into flat vertex lists a host renderer can
//! upload directly. Vertices stay in target-local space; draw them with the
//! set's model matrix.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::Color;
use crate::constants;
use crate::handle::{Handle, HandleGeometry, HandleSet};

/// Handle vertex data
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct HandleVertex {
    /// Local-space position
    pub position: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// [`crate::HandleId::index`] of the owning handle, for id-buffer picking
    pub handle_id: u32,
}

impl HandleVertex {
    fn new(position: Vec3, color: Color, handle_id: u32) -> Self {
        Self {
            position: position.into(),
            color,
            handle_id,
        }
    }
}

/// Tessellated handles of one set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandleDrawList {
    /// Line list; every two vertices form a segment
    pub lines: Vec<HandleVertex>,
    /// Triangle vertices for plane quads and arrow caps
    pub triangle_vertices: Vec<HandleVertex>,
    /// Triangle list indices into `triangle_vertices`
    pub triangle_indices: Vec<u32>,
    /// Point sprites with their pixel sizes
    pub points: Vec<(HandleVertex, f32)>,
}

impl HandleDrawList {
    /// True if nothing is drawn
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.triangle_indices.is_empty() && self.points.is_empty()
    }

    fn push_polyline(&mut self, points: &[Vec3], color: Color, id: u32) {
        for pair in points.windows(2) {
            self.lines.push(HandleVertex::new(pair[0], color, id));
            self.lines.push(HandleVertex::new(pair[1], color, id));
        }
    }

    fn push_quad(&mut self, corners: &[Vec3; 4], color: Color, id: u32) {
        let base = self.triangle_vertices.len() as u32;
        self.triangle_vertices
            .extend(corners.iter().map(|c| HandleVertex::new(*c, color, id)));
        self.triangle_indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Cone with its tip at `tip`, pointing along `direction`
    fn push_cone(&mut self, tip: Vec3, direction: Vec3, length: f32, radius: f32, color: Color, id: u32) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        let (u, v) = direction.any_orthonormal_pair();
        let base_center = tip - direction * length;
        let segments = constants::ARROW_SEGMENTS;

        let tip_index = self.triangle_vertices.len() as u32;
        self.triangle_vertices.push(HandleVertex::new(tip, color, id));
        let center_index = tip_index + 1;
        self.triangle_vertices
            .push(HandleVertex::new(base_center, color, id));

        let ring_start = tip_index + 2;
        for i in 0..segments {
            let angle = (i as f32 / segments as f32) * std::f32::consts::TAU;
            let offset = (u * angle.cos() + v * angle.sin()) * radius;
            self.triangle_vertices
                .push(HandleVertex::new(base_center + offset, color, id));
        }

        for i in 0..segments {
            let i0 = ring_start + i;
            let i1 = ring_start + (i + 1) % segments;
            // Side, then base cap
            self.triangle_indices.extend_from_slice(&[tip_index, i0, i1]);
            self.triangle_indices.extend_from_slice(&[center_index, i1, i0]);
        }
    }

    fn push_handle(&mut self, handle: &Handle) {
        let id = handle.id.index();
        let color = handle.color;
        match &handle.geometry {
            HandleGeometry::Point { position, size } => {
                self.points.push((HandleVertex::new(*position, color, id), *size));
            }
            HandleGeometry::Polyline { points, arrow, .. } => {
                self.push_polyline(points, color, id);
                if *arrow && points.len() >= 2 {
                    let tip = points[points.len() - 1];
                    let length: f32 = points.windows(2).map(|p| p[0].distance(p[1])).sum();
                    self.push_cone(
                        tip,
                        tip - points[points.len() - 2],
                        length * constants::ARROW_HEAD_RATIO,
                        length * constants::ARROW_RADIUS_RATIO,
                        color,
                        id,
                    );
                }
            }
            HandleGeometry::Quad { corners, .. } => self.push_quad(corners, color, id),
            HandleGeometry::Ring {
                center,
                normal,
                radius,
                ..
            } => {
                let points = ring_points(*center, *normal, *radius);
                self.push_polyline(&points, color, id);
            }
        }
    }
}

/// Closed circle of `RING_SEGMENTS + 1` points; the last repeats the first.
///
/// Rings about the principal axes lie in their coordinate plane: Z in XY,
/// Y in XZ and X in YZ.
pub fn ring_points(center: Vec3, normal: Vec3, radius: f32) -> Vec<Vec3> {
    let (u, v) = if normal.abs_diff_eq(Vec3::Z, 1e-6) || normal.abs_diff_eq(-Vec3::Z, 1e-6) {
        (Vec3::X, Vec3::Y)
    } else if normal.abs_diff_eq(Vec3::Y, 1e-6) || normal.abs_diff_eq(-Vec3::Y, 1e-6) {
        (Vec3::X, Vec3::Z)
    } else if normal.abs_diff_eq(Vec3::X, 1e-6) || normal.abs_diff_eq(-Vec3::X, 1e-6) {
        (Vec3::Y, Vec3::Z)
    } else {
        normal.normalize_or(Vec3::Z).any_orthonormal_pair()
    };

    let segments = constants::RING_SEGMENTS;
    (0..=segments)
        .map(|i| {
            let angle = (i % segments) as f32 / segments as f32 * std::f32::consts::TAU;
            center + (u * angle.cos() + v * angle.sin()) * radius
        })
        .collect()
}

/// Tessellate every visible handle of a set
pub fn handle_vertices(set: &HandleSet) -> HandleDrawList {
    let mut list = HandleDrawList::default();
    for handle in set.iter().filter(|h| h.visible) {
        list.push_handle(handle);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GizmoConfig;
    use crate::handle::{HandleId, HandleKind};
    use crate::target::HandleToggles;
    use approx::assert_relative_eq;
    use glam::Mat4;

    fn set() -> HandleSet {
        HandleSet::build(
            Vec3::ZERO,
            10.0,
            Mat4::IDENTITY,
            &GizmoConfig::default(),
            HandleToggles::ALL,
        )
    }

    #[test]
    fn test_ring_points_closed_and_planar() {
        let points = ring_points(Vec3::ZERO, Vec3::Y, 2.0);
        assert_eq!(points.len(), 361);
        assert_eq!(points[0], points[360]);
        for p in &points {
            assert_relative_eq!(p.y, 0.0);
            assert_relative_eq!(p.length(), 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<HandleVertex>(), 32);
        let v = HandleVertex::new(Vec3::ONE, [1.0; 4], 7);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(&bytes[28..32], &7u32.to_ne_bytes());
    }

    #[test]
    fn test_draw_list_skips_cleared_aux_lines() {
        let list = handle_vertices(&set());
        let aux_ids: Vec<u32> = [
            HandleId::AuxTranslateX,
            HandleId::AuxRotateStart,
            HandleId::AuxRotateEnd,
        ]
        .iter()
        .map(|id| id.index())
        .collect();
        assert!(list.lines.iter().all(|v| !aux_ids.contains(&v.handle_id)));
        assert_eq!(list.points.len(), 1);
        // Three rings of 360 segments each contribute two vertices per segment.
        let ring_vertices = list
            .lines
            .iter()
            .filter(|v| v.handle_id == HandleId::RingZ.index())
            .count();
        assert_eq!(ring_vertices, 720);
    }

    #[test]
    fn test_hidden_group_not_drawn() {
        let mut set = set();
        set.set_visible(&[HandleKind::RotationRing], &[], false);
        let list = handle_vertices(&set);
        assert!(list
            .lines
            .iter()
            .all(|v| v.handle_id != HandleId::RingX.index()));
    }

    #[test]
    fn test_arrow_cap_tip_at_line_end() {
        let list = handle_vertices(&set());
        let tip = list
            .triangle_vertices
            .iter()
            .find(|v| v.handle_id == HandleId::AxisZ.index())
            .unwrap();
        assert_eq!(tip.position, [0.0, 0.0, 10.0]);
    }
}
