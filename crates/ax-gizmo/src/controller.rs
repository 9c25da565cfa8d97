//! Gizmo controller
//!
//! A render-agnostic drag state machine. The host forwards pointer events
//! together with its [`Viewport`]; the controller hit-tests its handles,
//! turns pointer deltas into translate, rotate or scale edits and writes
//! the resulting model matrix to the bound target.
//!
//! Every move recomputes the model matrix from the matrix captured at
//! pointer-down plus the accumulated offset, angle or scale, so long drags
//! do not drift.

use ax_core::{
    apply_local, ray_plane_intersection, rotation_about, signed_angle_on_plane,
    translation_delta, try_inverse, uniform_scale,
};
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::config::{GizmoColors, GizmoConfig, HandleSizing};
use crate::constants;
use crate::error::BindError;
use crate::event::TransformEvent;
use crate::handle::{Axis, HandleId, HandleKind, HandleSet};
use crate::target::{BindTarget, HandleToggles, TargetKind};
use crate::viewport::Viewport;

/// Transform mode of the active drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoMode {
    /// No handle active
    #[default]
    None,
    /// Axis line, plane or origin point drag
    Translate,
    /// Rotation ring drag
    Rotate,
    /// Scale handle drag
    Scale,
}

impl GizmoMode {
    /// Mode selected by activating a handle of this kind
    pub fn from_kind(kind: HandleKind) -> Self {
        match kind {
            HandleKind::RotationRing => GizmoMode::Rotate,
            HandleKind::ScaleHandle => GizmoMode::Scale,
            HandleKind::Auxiliary => GizmoMode::None,
            HandleKind::OriginPoint | HandleKind::AxisLine | HandleKind::AxisPlane => {
                GizmoMode::Translate
            }
        }
    }
}

/// Drag state of a bound controller
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    /// Current model matrix of the target
    pub model_matrix: Mat4,
    /// Inverse of `model_matrix`
    pub inverse_model_matrix: Mat4,
    /// Gizmo center in target-local space
    pub center: Vec3,
    /// Target radius
    pub radius: f32,
    /// Handle being dragged
    pub active_handle: Option<HandleId>,
    /// Mode derived from the active handle
    pub mode: GizmoMode,
    /// Translation accumulated over the current drag
    pub accumulated_offset: Vec3,
    /// Rotation angle accumulated over the current drag
    pub accumulated_angle: f32,
    /// Scale factor accumulated over the current drag
    pub accumulated_scale: f32,
    /// Model matrix at pointer-down
    pub drag_start_matrix: Mat4,
    /// Local-space point on the rotation plane at pointer-down
    pub drag_start_point: Option<Vec3>,
    /// Local-space point on the rotation plane at the previous move
    pub previous_plane_point: Option<Vec3>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            model_matrix: Mat4::IDENTITY,
            inverse_model_matrix: Mat4::IDENTITY,
            center: Vec3::ZERO,
            radius: 0.0,
            active_handle: None,
            mode: GizmoMode::None,
            accumulated_offset: Vec3::ZERO,
            accumulated_angle: 0.0,
            accumulated_scale: 1.0,
            drag_start_matrix: Mat4::IDENTITY,
            drag_start_point: None,
            previous_plane_point: None,
        }
    }
}

impl TransformState {
    fn at(model_matrix: Mat4, inverse_model_matrix: Mat4, center: Vec3, radius: f32) -> Self {
        Self {
            model_matrix,
            inverse_model_matrix,
            center,
            radius,
            drag_start_matrix: model_matrix,
            ..Self::default()
        }
    }

    fn end_drag(&mut self) {
        self.active_handle = None;
        self.mode = GizmoMode::None;
        self.accumulated_offset = Vec3::ZERO;
        self.accumulated_angle = 0.0;
        self.accumulated_scale = 1.0;
        self.drag_start_matrix = self.model_matrix;
        self.drag_start_point = None;
        self.previous_plane_point = None;
    }
}

/// Gizmo controller for one bound target at a time
pub struct GizmoController<T: BindTarget> {
    config: GizmoConfig,
    target: Option<T>,
    handles: Option<HandleSet>,
    state: TransformState,
    pre_transform: TransformEvent,
    post_transform: TransformEvent,
}

impl<T: BindTarget> Default for GizmoController<T> {
    fn default() -> Self {
        Self::new(GizmoConfig::default())
    }
}

impl<T: BindTarget> GizmoController<T> {
    /// Create an unbound controller
    pub fn new(config: GizmoConfig) -> Self {
        Self {
            config,
            target: None,
            handles: None,
            state: TransformState::default(),
            pre_transform: TransformEvent::new(),
            post_transform: TransformEvent::new(),
        }
    }

    /// Current configuration
    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next rebuild
    pub fn set_config(&mut self, config: GizmoConfig) {
        self.config = config;
    }

    /// Bind to a target.
    ///
    /// Any previous target is released first. A target that is still
    /// loading stays pending until [`Self::refresh`] sees it ready.
    pub fn bind(&mut self, target: T) -> Result<(), BindError> {
        self.unbind();

        let kind = target.kind();
        let Some(capabilities) = kind.capabilities() else {
            return Err(BindError::UnsupportedTarget(kind));
        };

        if !target.is_ready() {
            let model = target.model_matrix();
            let inverse = try_inverse(&model).ok_or_else(|| {
                BindError::InvalidTarget("model matrix is not invertible".to_string())
            })?;
            tracing::debug!(?kind, "Target not ready, deferring handle build");
            self.state = TransformState::at(model, inverse, Vec3::ZERO, 0.0);
            self.target = Some(target);
            return Ok(());
        }

        let frame = self.target_frame(&target)?;
        self.target = Some(target);
        self.install(frame, capabilities);
        tracing::debug!(?kind, radius = frame.radius, "Bound gizmo target");
        Ok(())
    }

    /// Per-frame callback. Completes a pending bind once the target is ready.
    ///
    /// Returns `Ok(true)` when the handles were built by this call. A target
    /// that turns out to be invalid is released and the error returned.
    pub fn refresh(&mut self) -> Result<bool, BindError> {
        if self.handles.is_some() {
            return Ok(false);
        }
        let Some(target) = self.target.as_ref() else {
            return Ok(false);
        };
        if !target.is_ready() {
            return Ok(false);
        }

        let kind = target.kind();
        let capabilities = kind.capabilities();
        let frame = self.target_frame(target);
        match (frame, capabilities) {
            (Ok(frame), Some(capabilities)) => {
                self.install(frame, capabilities);
                tracing::debug!(?kind, radius = frame.radius, "Pending gizmo target ready");
                Ok(true)
            }
            (Err(e), _) => {
                tracing::warn!(?kind, "Pending gizmo target is invalid: {e}");
                self.unbind();
                Err(e)
            }
            (Ok(_), None) => {
                self.unbind();
                Err(BindError::UnsupportedTarget(kind))
            }
        }
    }

    /// Release the target and all handles, returning the target
    pub fn unbind(&mut self) -> Option<T> {
        self.handles = None;
        self.state = TransformState::default();
        let target = self.target.take();
        if target.is_some() {
            tracing::debug!("Unbound gizmo target");
        }
        target
    }

    /// Rebuild the handles from the current target and configuration.
    ///
    /// Ends an active drag. Does nothing while unbound or pending.
    pub fn rebuild(&mut self) -> Result<(), BindError> {
        if self.handles.is_none() {
            return Ok(());
        }
        self.on_pointer_up();
        let Some(target) = self.target.as_ref() else {
            return Ok(());
        };
        let kind = target.kind();
        let capabilities = kind
            .capabilities()
            .ok_or(BindError::UnsupportedTarget(kind))?;
        let frame = self.target_frame(target)?;
        self.install(frame, capabilities);
        Ok(())
    }

    /// Override the axis line lengths; `None` derives from the radius
    pub fn set_axis_lengths(&mut self, x: Option<f32>, y: Option<f32>, z: Option<f32>) {
        self.config.x_axis_length = x;
        self.config.y_axis_length = y;
        self.config.z_axis_length = z;
    }

    /// Override the scale handle length
    pub fn set_scale_axis_length(&mut self, length: Option<f32>) {
        self.config.scale_axis_length = length;
    }

    /// Override the rotation ring radius
    pub fn set_rotate_ring_radius(&mut self, radius: Option<f32>) {
        self.config.rotate_ring_radius = radius;
    }

    /// Replace the handle colors
    pub fn set_colors(&mut self, colors: GizmoColors) {
        self.config.colors = colors;
    }

    /// Measure hit tolerance in screen pixels instead of world units
    pub fn set_pixel_sizing(&mut self, enabled: bool) {
        self.config.sizing = if enabled {
            HandleSizing::Pixel
        } else {
            HandleSizing::World
        };
    }

    /// Move the gizmo origin relative to the target center
    pub fn set_origin_offset(&mut self, offset: Vec3) {
        self.config.origin_offset = offset;
    }

    /// Show or hide the translate handles
    pub fn set_translate_enabled(&mut self, enabled: bool) {
        self.config.translate_enabled = enabled;
        self.set_group_visible(
            &[HandleKind::AxisLine, HandleKind::AxisPlane],
            &[
                HandleId::AuxTranslateX,
                HandleId::AuxTranslateY,
                HandleId::AuxTranslateZ,
            ],
            enabled,
        );
    }

    /// Show or hide the rotation rings
    pub fn set_rotate_enabled(&mut self, enabled: bool) {
        self.config.rotate_enabled = enabled;
        self.set_group_visible(
            &[HandleKind::RotationRing],
            &[HandleId::AuxRotateStart, HandleId::AuxRotateEnd],
            enabled,
        );
    }

    /// Show or hide the scale handle
    pub fn set_scale_enabled(&mut self, enabled: bool) {
        self.config.scale_enabled = enabled;
        self.set_group_visible(&[HandleKind::ScaleHandle], &[], enabled);
    }

    fn set_group_visible(&mut self, kinds: &[HandleKind], aux: &[HandleId], visible: bool) {
        let Some(handles) = self.handles.as_mut() else {
            return;
        };
        handles.set_visible(kinds, aux, visible);

        let active_hidden = self
            .state
            .active_handle
            .and_then(|id| handles.get(id))
            .is_some_and(|h| !h.visible);
        if active_hidden {
            self.on_pointer_up();
        }
    }

    /// Start a drag if a handle is under `pixel`.
    ///
    /// Returns the activated handle. A press while a handle is already
    /// active is ignored.
    pub fn on_pointer_down(&mut self, viewport: &impl Viewport, pixel: Vec2) -> Option<HandleId> {
        if self.state.active_handle.is_some() {
            tracing::debug!("Pointer down during an active drag ignored");
            return None;
        }
        let handles = self.handles.as_ref()?;
        let tolerance = self.hit_tolerance(viewport);
        let pick = viewport.pick(pixel, handles, tolerance)?;
        if pick.set != handles.id() {
            return None;
        }
        let handle = handles.get(pick.handle).filter(|h| h.is_pickable())?;
        let (id, mode, normal) = (handle.id, GizmoMode::from_kind(handle.kind), handle.normal());

        let start_point = match (mode, normal) {
            (GizmoMode::Rotate, Some(normal)) => {
                self.plane_point(viewport, pixel, normal, &self.state.inverse_model_matrix)
            }
            _ => None,
        };

        self.state.end_drag();
        self.state.active_handle = Some(id);
        self.state.mode = mode;
        self.state.drag_start_point = start_point;
        self.state.previous_plane_point = start_point;

        let center = self.state.center;
        if let Some(handles) = self.handles.as_mut() {
            handles.highlight(id);
            if let Some(point) = start_point {
                handles.set_line_points(HandleId::AuxRotateStart, vec![center, point]);
            }
        }

        tracing::debug!(handle = ?id, ?mode, "Activated gizmo handle");
        Some(id)
    }

    /// Continue the active drag from `prev` to `curr`.
    ///
    /// Returns `true` if the model matrix changed. Without an active handle
    /// this is a no-op.
    pub fn on_pointer_move(&mut self, viewport: &impl Viewport, prev: Vec2, curr: Vec2) -> bool {
        let Some(active) = self.state.active_handle else {
            return false;
        };
        let Some(kind) = self.handles.as_ref().and_then(|h| h.get(active)).map(|h| h.kind) else {
            return false;
        };

        let next = match self.state.mode {
            GizmoMode::Translate if kind == HandleKind::OriginPoint => {
                self.origin_drag(viewport, curr)
            }
            GizmoMode::Translate => self.translate_drag(viewport, active, curr - prev),
            GizmoMode::Rotate => self.rotate_drag(viewport, active, curr),
            GizmoMode::Scale => self.scale_drag(viewport, curr - prev),
            GizmoMode::None => None,
        };
        let Some(matrix) = next else {
            return false;
        };
        if !self.apply(matrix) {
            return false;
        }
        self.update_auxiliary(active);
        true
    }

    /// End the active drag, restoring handle colors and clearing indicators
    pub fn on_pointer_up(&mut self) {
        let Some(active) = self.state.active_handle else {
            return;
        };
        if let Some(handles) = self.handles.as_mut() {
            handles.restore(active);
            handles.clear_auxiliary();
        }
        self.state.end_drag();
        tracing::debug!(handle = ?active, "Released gizmo handle");
    }

    /// Event raised before each drag step, carrying the matrix before the step
    pub fn pre_transform(&self) -> &TransformEvent {
        &self.pre_transform
    }

    /// Mutable access for adding listeners
    pub fn pre_transform_mut(&mut self) -> &mut TransformEvent {
        &mut self.pre_transform
    }

    /// Event raised after each drag step, carrying the new matrix
    pub fn post_transform(&self) -> &TransformEvent {
        &self.post_transform
    }

    /// Mutable access for adding listeners
    pub fn post_transform_mut(&mut self) -> &mut TransformEvent {
        &mut self.post_transform
    }

    /// Drag state
    pub fn state(&self) -> &TransformState {
        &self.state
    }

    /// Handle set; `None` while unbound or pending
    pub fn handles(&self) -> Option<&HandleSet> {
        self.handles.as_ref()
    }

    /// Bound target
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Bound target, mutably
    pub fn target_mut(&mut self) -> Option<&mut T> {
        self.target.as_mut()
    }

    /// True while a handle is being dragged
    pub fn is_dragging(&self) -> bool {
        self.state.active_handle.is_some()
    }

    /// True if a target is bound, ready or not
    pub fn is_bound(&self) -> bool {
        self.target.is_some()
    }

    /// True if a target is bound but its handles are not built yet
    pub fn is_pending(&self) -> bool {
        self.target.is_some() && self.handles.is_none()
    }

    /// Hit radius in world units
    fn hit_tolerance(&self, viewport: &impl Viewport) -> f32 {
        match self.config.sizing {
            HandleSizing::World => self.state.radius * constants::HIT_RADIUS_MULTIPLIER,
            HandleSizing::Pixel => {
                self.config.line_width * 0.5 * viewport.camera_height()
                    / self.config.drag_height_divisor
            }
        }
    }

    /// Local center, radius and model matrix of a ready target
    fn target_frame(&self, target: &T) -> Result<TargetFrame, BindError> {
        match target.kind() {
            TargetKind::Point => {
                let position = target
                    .position()
                    .filter(|p| p.is_finite())
                    .ok_or_else(|| BindError::InvalidTarget("target has no position".to_string()))?;
                let model = Mat4::from_translation(position);
                Ok(TargetFrame {
                    model,
                    inverse: model.inverse(),
                    center: self.config.origin_offset,
                    radius: constants::POINT_TARGET_RADIUS,
                })
            }
            _ => {
                let model = target.model_matrix();
                let inverse = try_inverse(&model).ok_or_else(|| {
                    BindError::InvalidTarget("model matrix is not invertible".to_string())
                })?;
                let bounds = target.world_bounds().filter(|b| b.is_valid()).ok_or_else(|| {
                    BindError::InvalidTarget("target has no bounding volume".to_string())
                })?;
                Ok(TargetFrame {
                    model,
                    inverse,
                    center: inverse.transform_point3(bounds.center) + self.config.origin_offset,
                    radius: bounds.radius,
                })
            }
        }
    }

    fn install(&mut self, frame: TargetFrame, capabilities: HandleToggles) {
        self.handles = Some(HandleSet::build(
            frame.center,
            frame.radius,
            frame.model,
            &self.config,
            capabilities,
        ));
        self.state = TransformState::at(frame.model, frame.inverse, frame.center, frame.radius);
    }

    /// Local-space intersection of the pointer ray with the plane through
    /// the center with `normal`
    fn plane_point(
        &self,
        viewport: &impl Viewport,
        pixel: Vec2,
        normal: Vec3,
        inverse_model: &Mat4,
    ) -> Option<Vec3> {
        let ray = viewport.pick_ray(pixel)?.transformed(inverse_model);
        ray_plane_intersection(&ray, self.state.center, normal)
    }

    /// Pixel delta projected onto the screen direction of a line handle,
    /// in world units
    fn projected_drag(&self, viewport: &impl Viewport, line: HandleId, delta: Vec2) -> Option<f32> {
        let (start, end) = self.handles.as_ref()?.get(line)?.endpoints()?;
        let model = &self.state.model_matrix;
        let screen_start = viewport.world_to_screen(model.transform_point3(start))?;
        let screen_end = viewport.world_to_screen(model.transform_point3(end))?;
        let direction = (screen_end - screen_start).normalize_or_zero();

        let factor = viewport.camera_height() / self.config.drag_height_divisor;
        let along = direction.dot(delta) * factor;
        along.is_finite().then_some(along)
    }

    fn translate_drag(&mut self, viewport: &impl Viewport, active: HandleId, delta: Vec2) -> Option<Mat4> {
        let handle = self.handles.as_ref()?.get(active)?;
        let mask = handle.axis_mask;
        let lines = if handle.related.is_empty() {
            vec![active]
        } else {
            handle.related.clone()
        };

        let mut raw = Vec3::ZERO;
        for line in lines {
            let Some(axis) = self
                .handles
                .as_ref()
                .and_then(|h| h.get(line))
                .and_then(|h| h.axis_mask.single())
            else {
                continue;
            };
            if let Some(along) = self.projected_drag(viewport, line, delta) {
                raw[axis.index()] = along;
            }
        }

        let step = mask.apply(raw) * self.config.axis_flip;
        self.state.accumulated_offset += step;
        Some(apply_local(
            self.state.drag_start_matrix,
            translation_delta(self.state.accumulated_offset),
        ))
    }

    fn rotate_drag(&mut self, viewport: &impl Viewport, active: HandleId, curr: Vec2) -> Option<Mat4> {
        let normal = self.handles.as_ref()?.get(active)?.normal()?;
        let start_inverse = try_inverse(&self.state.drag_start_matrix)?;
        let current = self.plane_point(viewport, curr, normal, &start_inverse)?;

        let Some(previous) = self.state.previous_plane_point else {
            // The press missed the plane; anchor the drag here.
            self.state.drag_start_point = Some(current);
            self.state.previous_plane_point = Some(current);
            return None;
        };

        let step = signed_angle_on_plane(previous, current, self.state.center, normal);
        self.state.previous_plane_point = Some(current);
        self.state.accumulated_angle += step;
        Some(apply_local(
            self.state.drag_start_matrix,
            rotation_about(self.state.center, normal, self.state.accumulated_angle),
        ))
    }

    fn scale_drag(&mut self, viewport: &impl Viewport, delta: Vec2) -> Option<Mat4> {
        let (start, end) = self.handles.as_ref()?.get(HandleId::Scale)?.endpoints()?;
        let length = start.distance(end);
        if length <= f32::EPSILON {
            return None;
        }
        let offset = self.projected_drag(viewport, HandleId::Scale, delta)?;
        let step = 1.0 - offset / length;
        if !step.is_finite() || step <= constants::MIN_SCALE_STEP {
            return None;
        }
        self.state.accumulated_scale *= step;
        Some(apply_local(
            self.state.drag_start_matrix,
            uniform_scale(self.state.accumulated_scale),
        ))
    }

    /// Place the target's translation where the pointer ray meets the ground
    fn origin_drag(&mut self, viewport: &impl Viewport, curr: Vec2) -> Option<Mat4> {
        let ray = viewport.pick_ray(curr)?;
        let point = ray_plane_intersection(&ray, self.config.ground_origin, self.config.ground_normal)?;
        let mut matrix = self.state.drag_start_matrix;
        matrix.w_axis = point.extend(1.0);
        Some(matrix)
    }

    /// Write a new model matrix to the target and handles, raising events
    fn apply(&mut self, matrix: Mat4) -> bool {
        let Some(inverse) = try_inverse(&matrix) else {
            return false;
        };
        let before = self.state.model_matrix;
        self.pre_transform.raise(&before);

        if let Some(target) = self.target.as_mut() {
            target.set_model_matrix(matrix);
        }
        if let Some(handles) = self.handles.as_mut() {
            handles.set_model_matrix(matrix);
        }
        self.state.model_matrix = matrix;
        self.state.inverse_model_matrix = inverse;

        self.post_transform.raise(&matrix);
        true
    }

    fn update_auxiliary(&mut self, active: HandleId) {
        let Some(handles) = self.handles.as_mut() else {
            return;
        };
        let kind = handles.get(active).map(|h| h.kind);
        match kind {
            Some(HandleKind::AxisLine | HandleKind::AxisPlane) => {
                let offset = self.state.accumulated_offset;
                for axis in Axis::ALL {
                    let component = offset[axis.index()];
                    let aux = HandleId::aux_translate(axis);
                    let line = handles
                        .get(HandleId::axis_line(axis))
                        .and_then(|h| h.endpoints());
                    let Some((start, end)) = line.filter(|_| component != 0.0) else {
                        handles.set_line_points(aux, Vec::new());
                        continue;
                    };
                    let from_start = match axis {
                        Axis::Y => component < 0.0,
                        Axis::X | Axis::Z => component > 0.0,
                    };
                    let anchor = if from_start { start } else { end };
                    let mut tip = anchor;
                    tip[axis.index()] -= component;
                    handles.set_line_points(aux, vec![anchor, tip]);
                }
            }
            Some(HandleKind::RotationRing) => {
                let (Some(start), Some(normal)) = (
                    self.state.drag_start_point,
                    handles.get(active).and_then(|h| h.normal()),
                ) else {
                    return;
                };
                let center = self.state.center;
                let back = Quat::from_axis_angle(normal, -self.state.accumulated_angle);
                handles.set_line_points(HandleId::AuxRotateStart, vec![center, start]);
                handles.set_line_points(
                    HandleId::AuxRotateEnd,
                    vec![center, center + back * (start - center)],
                );
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TargetFrame {
    model: Mat4,
    inverse: Mat4,
    center: Vec3,
    radius: f32,
}
