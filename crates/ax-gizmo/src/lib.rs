//! Axis editor gizmo
//!
//! Render-agnostic translate/rotate/scale gizmo. The controller owns the
//! handle geometry and drag math; the host supplies picking, projection
//! and the object being edited.
//!
//! # Architecture
//!
//! - [`GizmoController`] - Drag state machine over one bound target
//! - [`BindTarget`] - Adapter trait for host objects (models, tile sets, points)
//! - [`Viewport`] - Pick rays, world-to-screen projection and camera height
//! - [`HandleSet`] - Handles in target-local space with a shared model matrix
//! - [`TransformEvent`] - Pre/post-transform notifications
//!
//! # Module Structure
//!
//! ```text
//! ax-gizmo/
//! ├── config.rs      # GizmoConfig (RON), colors, sizing
//! ├── constants.rs   # Default colors and proportions
//! ├── controller.rs  # GizmoController, TransformState, GizmoMode
//! ├── error.rs       # BindError, ConfigError
//! ├── event.rs       # TransformEvent listener list
//! ├── geometry.rs    # Draw lists for host rendering
//! ├── handle.rs      # Handle, HandleSet, hit testing
//! ├── target.rs      # BindTarget, ModelTarget, PointTarget
//! └── viewport.rs    # Viewport, PrimitiveRef
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod event;
pub mod geometry;
pub mod handle;
pub mod target;
pub mod viewport;

pub use config::{Color, GizmoColors, GizmoConfig, HandleSizing};
pub use controller::{GizmoController, GizmoMode, TransformState};
pub use error::{BindError, ConfigError};
pub use event::{ListenerAction, ListenerId, TransformEvent};
pub use geometry::{HandleDrawList, HandleVertex, handle_vertices, ring_points};
pub use handle::{Axis, AxisMask, Handle, HandleGeometry, HandleId, HandleKind, HandleSet};
pub use target::{BindTarget, HandleToggles, ModelTarget, PointTarget, TargetKind};
pub use viewport::{PrimitiveRef, Viewport};
