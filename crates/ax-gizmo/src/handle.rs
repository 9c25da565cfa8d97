//! Gizmo handles
//!
//! A handle is one pickable control: the origin point, an axis line, a
//! coordinate-plane quad, a rotation ring or the diagonal scale handle.
//! Auxiliary handles are transient drag feedback and are never pickable.
//! All geometry is stored in target-local space; the set's shared model
//! matrix places it in the world.

use ax_core::{
    Ray, ray_cylinder_intersection, ray_quad_intersection, ray_ring_intersection,
    ray_sphere_intersection, try_inverse,
};
use glam::{Mat4, Vec3};
use uuid::Uuid;

use crate::config::{Color, GizmoConfig};
use crate::constants;
use crate::target::HandleToggles;

/// A principal axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All axes in order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the axis
    pub fn direction(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// A subset of {X, Y, Z}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AxisMask(u8);

impl AxisMask {
    /// No axis
    pub const NONE: Self = Self(0);
    /// X only
    pub const X: Self = Self(0b001);
    /// Y only
    pub const Y: Self = Self(0b010);
    /// Z only
    pub const Z: Self = Self(0b100);
    /// X and Y
    pub const XY: Self = Self(0b011);
    /// X and Z
    pub const XZ: Self = Self(0b101);
    /// Y and Z
    pub const YZ: Self = Self(0b110);
    /// All three axes
    pub const XYZ: Self = Self(0b111);

    /// True if the axis is in the mask
    pub fn contains(self, axis: Axis) -> bool {
        self.0 & (1 << axis.index()) != 0
    }

    /// Axes in the mask, in X, Y, Z order
    pub fn axes(self) -> impl Iterator<Item = Axis> {
        Axis::ALL.into_iter().filter(move |axis| self.contains(*axis))
    }

    /// The axis if exactly one is set
    pub fn single(self) -> Option<Axis> {
        let mut axes = self.axes();
        match (axes.next(), axes.next()) {
            (Some(axis), None) => Some(axis),
            _ => None,
        }
    }

    /// Zero the components of `v` that are not in the mask
    pub fn apply(self, v: Vec3) -> Vec3 {
        Vec3::new(
            if self.contains(Axis::X) { v.x } else { 0.0 },
            if self.contains(Axis::Y) { v.y } else { 0.0 },
            if self.contains(Axis::Z) { v.z } else { 0.0 },
        )
    }
}

impl From<Axis> for AxisMask {
    fn from(axis: Axis) -> Self {
        Self(1 << axis.index())
    }
}

/// What a handle does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Moves the target to a picked ground position
    OriginPoint,
    /// Translates along one axis
    AxisLine,
    /// Translates within a coordinate plane
    AxisPlane,
    /// Rotates about one axis
    RotationRing,
    /// Scales uniformly
    ScaleHandle,
    /// Drag feedback, never pickable
    Auxiliary,
}

/// Names every handle of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum HandleId {
    Origin,
    AxisX,
    AxisY,
    AxisZ,
    PlaneXY,
    PlaneXZ,
    PlaneYZ,
    RingX,
    RingY,
    RingZ,
    Scale,
    AuxTranslateX,
    AuxTranslateY,
    AuxTranslateZ,
    AuxRotateStart,
    AuxRotateEnd,
}

impl HandleId {
    /// Stable numeric id, used in vertex data
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Axis line handle for an axis
    pub fn axis_line(axis: Axis) -> Self {
        match axis {
            Axis::X => HandleId::AxisX,
            Axis::Y => HandleId::AxisY,
            Axis::Z => HandleId::AxisZ,
        }
    }

    /// Translate feedback segment for an axis
    pub fn aux_translate(axis: Axis) -> Self {
        match axis {
            Axis::X => HandleId::AuxTranslateX,
            Axis::Y => HandleId::AuxTranslateY,
            Axis::Z => HandleId::AuxTranslateZ,
        }
    }
}

/// Handle geometry in target-local space
#[derive(Debug, Clone, PartialEq)]
pub enum HandleGeometry {
    /// A screen-sized point
    Point {
        /// Position
        position: Vec3,
        /// Size in pixels
        size: f32,
    },
    /// A polyline, optionally capped with an arrow at its last point
    Polyline {
        /// Points; empty for cleared feedback lines
        points: Vec<Vec3>,
        /// Width in pixels
        width: f32,
        /// Draw an arrow cap
        arrow: bool,
    },
    /// A planar quad
    Quad {
        /// Corners in winding order
        corners: [Vec3; 4],
        /// Plane normal
        normal: Vec3,
    },
    /// A circle
    Ring {
        /// Circle center
        center: Vec3,
        /// Rotation axis
        normal: Vec3,
        /// Circle radius
        radius: f32,
        /// Width in pixels
        width: f32,
    },
}

/// A pickable control
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    /// Name within the set
    pub id: HandleId,
    /// Kind of control
    pub kind: HandleKind,
    /// Axes this handle moves along
    pub axis_mask: AxisMask,
    /// Color when idle
    pub base_color: Color,
    /// Color while active
    pub highlight_color: Color,
    /// Current color
    pub color: Color,
    /// Local-space geometry
    pub geometry: HandleGeometry,
    /// Handles highlighted together with this one (a plane's two axis lines)
    pub related: Vec<HandleId>,
    /// Hidden handles are neither drawn nor picked
    pub visible: bool,
}

impl Handle {
    fn new(
        id: HandleId,
        kind: HandleKind,
        axis_mask: AxisMask,
        color: Color,
        highlight_color: Color,
        geometry: HandleGeometry,
    ) -> Self {
        Self {
            id,
            kind,
            axis_mask,
            base_color: color,
            highlight_color,
            color,
            geometry,
            related: Vec::new(),
            visible: true,
        }
    }

    /// True if the handle can be hit by a pick
    pub fn is_pickable(&self) -> bool {
        self.visible && self.kind != HandleKind::Auxiliary
    }

    /// Plane normal of rings and quads
    pub fn normal(&self) -> Option<Vec3> {
        match &self.geometry {
            HandleGeometry::Ring { normal, .. } | HandleGeometry::Quad { normal, .. } => {
                Some(*normal)
            }
            _ => None,
        }
    }

    /// First and last point of a line handle
    pub fn endpoints(&self) -> Option<(Vec3, Vec3)> {
        match &self.geometry {
            HandleGeometry::Polyline { points, .. } if points.len() >= 2 => {
                Some((points[0], points[points.len() - 1]))
            }
            _ => None,
        }
    }

    /// Ray parameter of the nearest hit, in local space
    fn hit_distance(&self, ray: &Ray, tolerance: f32) -> Option<f32> {
        match &self.geometry {
            HandleGeometry::Point { position, .. } => ray_sphere_intersection(
                ray,
                *position,
                tolerance * constants::ORIGIN_POINT_SIZE_RATIO,
            ),
            HandleGeometry::Polyline { points, .. } => points
                .windows(2)
                .filter_map(|pair| ray_cylinder_intersection(ray, pair[0], pair[1], tolerance))
                .min_by(f32::total_cmp),
            HandleGeometry::Quad { corners, .. } => ray_quad_intersection(ray, corners, 0.0),
            HandleGeometry::Ring {
                center,
                normal,
                radius,
                ..
            } => ray_ring_intersection(ray, *center, *normal, *radius, tolerance),
        }
    }
}

/// The handles of one bound target
#[derive(Debug, Clone)]
pub struct HandleSet {
    id: Uuid,
    handles: Vec<Handle>,
    model_matrix: Mat4,
    center: Vec3,
    radius: f32,
    capabilities: HandleToggles,
}

impl HandleSet {
    /// Build the handles for a target with the given local center and radius.
    ///
    /// Only the groups in `capabilities` are created; group visibility
    /// follows the `*_enabled` flags of `config`.
    pub fn build(
        center: Vec3,
        radius: f32,
        model_matrix: Mat4,
        config: &GizmoConfig,
        capabilities: HandleToggles,
    ) -> Self {
        let colors = &config.colors;
        let active = colors.active;
        let width = config.line_width;
        let mut handles = Vec::new();

        handles.push(Handle::new(
            HandleId::Origin,
            HandleKind::OriginPoint,
            AxisMask::XYZ,
            colors.origin,
            active,
            HandleGeometry::Point {
                position: center,
                size: width * constants::ORIGIN_POINT_SIZE_RATIO,
            },
        ));

        // Axis line directions. Y points down its negative axis.
        let lengths = config.axis_lengths(radius);
        let axis_ends = [
            Vec3::new(lengths.x, 0.0, 0.0),
            Vec3::new(0.0, -lengths.y, 0.0),
            Vec3::new(0.0, 0.0, lengths.z),
        ];
        let axis_colors = [colors.x_axis, colors.y_axis, colors.z_axis];

        if capabilities.translate {
            for axis in Axis::ALL {
                let mut line = Handle::new(
                    HandleId::axis_line(axis),
                    HandleKind::AxisLine,
                    axis.into(),
                    axis_colors[axis.index()],
                    active,
                    HandleGeometry::Polyline {
                        points: vec![center, center + axis_ends[axis.index()]],
                        width,
                        arrow: true,
                    },
                );
                line.visible = config.translate_enabled;
                handles.push(line);

                let mut aux = Handle::new(
                    HandleId::aux_translate(axis),
                    HandleKind::Auxiliary,
                    axis.into(),
                    active,
                    active,
                    HandleGeometry::Polyline {
                        points: Vec::new(),
                        width,
                        arrow: false,
                    },
                );
                aux.visible = config.translate_enabled;
                handles.push(aux);
            }

            let inner = (radius * constants::PLANE_INNER_RATIO).max(constants::PLANE_MIN_INNER);
            let outer = (radius * constants::PLANE_OUTER_RATIO).max(inner * 2.0);
            let planes = [
                (
                    HandleId::PlaneXY,
                    AxisMask::XY,
                    Vec3::Z,
                    colors.z_axis,
                    [
                        Vec3::new(inner, -inner, 0.0),
                        Vec3::new(outer, -inner, 0.0),
                        Vec3::new(outer, -outer, 0.0),
                        Vec3::new(inner, -outer, 0.0),
                    ],
                    [HandleId::AxisX, HandleId::AxisY],
                ),
                (
                    HandleId::PlaneXZ,
                    AxisMask::XZ,
                    Vec3::Y,
                    colors.y_axis,
                    [
                        Vec3::new(inner, 0.0, inner),
                        Vec3::new(outer, 0.0, inner),
                        Vec3::new(outer, 0.0, outer),
                        Vec3::new(inner, 0.0, outer),
                    ],
                    [HandleId::AxisX, HandleId::AxisZ],
                ),
                (
                    HandleId::PlaneYZ,
                    AxisMask::YZ,
                    Vec3::X,
                    colors.x_axis,
                    [
                        Vec3::new(0.0, -inner, inner),
                        Vec3::new(0.0, -outer, inner),
                        Vec3::new(0.0, -outer, outer),
                        Vec3::new(0.0, -inner, outer),
                    ],
                    [HandleId::AxisY, HandleId::AxisZ],
                ),
            ];
            for (id, mask, normal, color, offsets, related) in planes {
                let mut plane = Handle::new(
                    id,
                    HandleKind::AxisPlane,
                    mask,
                    color,
                    active,
                    HandleGeometry::Quad {
                        corners: offsets.map(|offset| center + offset),
                        normal,
                    },
                );
                plane.related = related.to_vec();
                plane.visible = config.translate_enabled;
                handles.push(plane);
            }
        }

        if capabilities.rotate {
            let ring_radius = config
                .rotate_ring_radius
                .unwrap_or_else(|| config.derived_length(radius));
            for (id, axis) in [
                (HandleId::RingZ, Axis::Z),
                (HandleId::RingY, Axis::Y),
                (HandleId::RingX, Axis::X),
            ] {
                let mut ring = Handle::new(
                    id,
                    HandleKind::RotationRing,
                    axis.into(),
                    axis_colors[axis.index()],
                    active,
                    HandleGeometry::Ring {
                        center,
                        normal: axis.direction(),
                        radius: ring_radius,
                        width,
                    },
                );
                ring.visible = config.rotate_enabled;
                handles.push(ring);
            }
            for id in [HandleId::AuxRotateStart, HandleId::AuxRotateEnd] {
                let mut aux = Handle::new(
                    id,
                    HandleKind::Auxiliary,
                    AxisMask::NONE,
                    active,
                    active,
                    HandleGeometry::Polyline {
                        points: Vec::new(),
                        width: width * constants::ROTATE_AUX_WIDTH_RATIO,
                        arrow: false,
                    },
                );
                aux.visible = config.rotate_enabled;
                handles.push(aux);
            }
        }

        if capabilities.scale {
            let diagonal = if capabilities.translate {
                axis_ends.iter().map(|end| end.normalize_or_zero()).sum::<Vec3>()
            } else {
                Vec3::ONE
            }
            .normalize_or(Vec3::ONE.normalize());
            let length = config
                .scale_axis_length
                .unwrap_or_else(|| config.derived_length(radius));
            let mut scale = Handle::new(
                HandleId::Scale,
                HandleKind::ScaleHandle,
                AxisMask::XYZ,
                colors.scale_axis,
                active,
                HandleGeometry::Polyline {
                    points: vec![center, center + diagonal * length],
                    width,
                    arrow: true,
                },
            );
            scale.visible = config.scale_enabled;
            handles.push(scale);
        }

        tracing::debug!(
            handles = handles.len(),
            radius,
            "Built gizmo handle set"
        );

        Self {
            id: Uuid::new_v4(),
            handles,
            model_matrix,
            center,
            radius,
            capabilities,
        }
    }

    /// Identity of this set; changes on every rebuild
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Local-space center
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Target radius the set was built for
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Handle groups this set was built with
    pub fn capabilities(&self) -> HandleToggles {
        self.capabilities
    }

    /// Shared model matrix
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    /// Replace the shared model matrix
    pub fn set_model_matrix(&mut self, matrix: Mat4) {
        self.model_matrix = matrix;
    }

    /// Look up a handle
    pub fn get(&self, id: HandleId) -> Option<&Handle> {
        self.handles.iter().find(|h| h.id == id)
    }

    /// Look up a handle mutably
    pub fn get_mut(&mut self, id: HandleId) -> Option<&mut Handle> {
        self.handles.iter_mut().find(|h| h.id == id)
    }

    /// True if the set has a handle with this id
    pub fn contains(&self, id: HandleId) -> bool {
        self.get(id).is_some()
    }

    /// All handles
    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.handles.iter()
    }

    /// Number of handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if the set has no handles
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Highlight a handle and its related handles
    pub fn highlight(&mut self, id: HandleId) {
        let related = self.get(id).map(|h| h.related.clone()).unwrap_or_default();
        for target in std::iter::once(id).chain(related) {
            if let Some(handle) = self.get_mut(target) {
                handle.color = handle.highlight_color;
            }
        }
    }

    /// Restore the base color of a handle and its related handles
    pub fn restore(&mut self, id: HandleId) {
        let related = self.get(id).map(|h| h.related.clone()).unwrap_or_default();
        for target in std::iter::once(id).chain(related) {
            if let Some(handle) = self.get_mut(target) {
                handle.color = handle.base_color;
            }
        }
    }

    /// Show or hide every handle of a kind group
    pub fn set_visible(&mut self, kinds: &[HandleKind], aux: &[HandleId], visible: bool) {
        for handle in &mut self.handles {
            if kinds.contains(&handle.kind) || aux.contains(&handle.id) {
                handle.visible = visible;
            }
        }
    }

    /// Replace the points of a line handle
    pub fn set_line_points(&mut self, id: HandleId, new_points: Vec<Vec3>) {
        if let Some(Handle {
            geometry: HandleGeometry::Polyline { points, .. },
            ..
        }) = self.get_mut(id)
        {
            *points = new_points;
        }
    }

    /// Clear every auxiliary line
    pub fn clear_auxiliary(&mut self) {
        for handle in &mut self.handles {
            if handle.kind == HandleKind::Auxiliary {
                if let HandleGeometry::Polyline { points, .. } = &mut handle.geometry {
                    points.clear();
                }
            }
        }
    }

    /// Find the closest pickable handle along a world-space ray.
    ///
    /// `tolerance` is the hit radius in world units.
    pub fn hit_test(&self, ray: &Ray, tolerance: f32) -> Option<HandleId> {
        let inverse = try_inverse(&self.model_matrix)?;
        let local_ray = ray.transformed(&inverse);
        let local_tolerance = tolerance / max_axis_scale(&self.model_matrix).max(f32::EPSILON);

        self.handles
            .iter()
            .filter(|h| h.is_pickable())
            .filter_map(|h| h.hit_distance(&local_ray, local_tolerance).map(|t| (h.id, t)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }
}

/// Largest axis scale of an affine matrix
pub(crate) fn max_axis_scale(matrix: &Mat4) -> f32 {
    matrix
        .x_axis
        .truncate()
        .length()
        .max(matrix.y_axis.truncate().length())
        .max(matrix.z_axis.truncate().length())
}
