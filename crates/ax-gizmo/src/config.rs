//! Gizmo configuration
//!
//! Handle proportions, colors and drag scaling. Configurations are plain
//! serde structs and can be stored as RON files next to a host's settings.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{self, colors};
use crate::error::ConfigError;

/// RGBA color
pub type Color = [f32; 4];

/// How hit tolerances are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandleSizing {
    /// Tolerance is a fraction of the target radius
    #[default]
    World,
    /// Tolerance is half the line width in screen pixels
    Pixel,
}

/// Handle colors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoColors {
    /// Origin point color
    pub origin: Color,
    /// X-axis line, X ring and YZ plane color
    pub x_axis: Color,
    /// Y-axis line, Y ring and XZ plane color
    pub y_axis: Color,
    /// Z-axis line, Z ring and XY plane color
    pub z_axis: Color,
    /// Highlight color of the active handle and its related handles
    pub active: Color,
    /// Scale handle color
    pub scale_axis: Color,
}

impl Default for GizmoColors {
    fn default() -> Self {
        Self {
            origin: colors::ORIGIN,
            x_axis: colors::X_AXIS,
            y_axis: colors::Y_AXIS,
            z_axis: colors::Z_AXIS,
            active: colors::ACTIVE,
            scale_axis: colors::SCALE_AXIS,
        }
    }
}

/// Gizmo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GizmoConfig {
    /// Line width in pixels
    pub line_width: f32,
    /// Handle colors
    pub colors: GizmoColors,
    /// X-axis length; derived from the target radius when unset
    pub x_axis_length: Option<f32>,
    /// Y-axis length; derived from the target radius when unset
    pub y_axis_length: Option<f32>,
    /// Z-axis length; derived from the target radius when unset
    pub z_axis_length: Option<f32>,
    /// Scale handle length; derived from the target radius when unset
    pub scale_axis_length: Option<f32>,
    /// Rotation ring radius; derived from the target radius when unset
    pub rotate_ring_radius: Option<f32>,
    /// Multiplier applied to the target radius for derived lengths
    pub radius_ratio: f32,
    /// Offset of the gizmo origin from the target center, in local space
    pub origin_offset: Vec3,
    /// Show translate handles (axis lines and planes)
    pub translate_enabled: bool,
    /// Show rotation rings
    pub rotate_enabled: bool,
    /// Show the scale handle
    pub scale_enabled: bool,
    /// Hit tolerance measurement
    pub sizing: HandleSizing,
    /// Camera height divisor for drag speed
    pub drag_height_divisor: f32,
    /// Per-axis sign applied to translate offsets
    pub axis_flip: Vec3,
    /// A point on the plane used to place the origin handle
    pub ground_origin: Vec3,
    /// Normal of the plane used to place the origin handle
    pub ground_normal: Vec3,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            line_width: constants::LINE_WIDTH,
            colors: GizmoColors::default(),
            x_axis_length: None,
            y_axis_length: None,
            z_axis_length: None,
            scale_axis_length: None,
            rotate_ring_radius: None,
            radius_ratio: 1.0,
            origin_offset: Vec3::ZERO,
            translate_enabled: true,
            rotate_enabled: true,
            scale_enabled: true,
            sizing: HandleSizing::World,
            drag_height_divisor: constants::DRAG_HEIGHT_DIVISOR,
            axis_flip: Vec3::new(-1.0, 1.0, -1.0),
            ground_origin: Vec3::ZERO,
            ground_normal: Vec3::Z,
        }
    }
}

impl GizmoConfig {
    /// Create a high contrast config with brighter axis colors
    pub fn high_contrast() -> Self {
        Self {
            colors: GizmoColors {
                x_axis: [1.0, 0.2, 0.2, 1.0],
                y_axis: [0.2, 1.0, 0.2, 1.0],
                z_axis: [0.2, 0.4, 1.0, 1.0],
                ..GizmoColors::default()
            },
            ..Self::default()
        }
    }

    /// Length of the derived handles for a target of the given radius
    pub fn derived_length(&self, radius: f32) -> f32 {
        radius * self.radius_ratio
    }

    /// Axis lengths in X, Y, Z order
    pub fn axis_lengths(&self, radius: f32) -> Vec3 {
        let derived = self.derived_length(radius);
        Vec3::new(
            self.x_axis_length.unwrap_or(derived),
            self.y_axis_length.unwrap_or(derived),
            self.z_axis_length.unwrap_or(derived),
        )
    }

    /// Parse a config from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::Deserialize(e.to_string()))
    }

    /// Encode the config as pretty RON text
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load a config from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Save the config to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_axis_lengths() {
        let config = GizmoConfig {
            y_axis_length: Some(3.0),
            radius_ratio: 2.0,
            ..GizmoConfig::default()
        };
        assert_eq!(config.axis_lengths(5.0), Vec3::new(10.0, 3.0, 10.0));
    }

    #[test]
    fn test_ron_round_trip_preserves_overrides() {
        let config = GizmoConfig {
            line_width: 8.0,
            sizing: HandleSizing::Pixel,
            scale_axis_length: Some(4.0),
            ..GizmoConfig::high_contrast()
        };
        let text = config.to_ron_string().unwrap();
        assert_eq!(GizmoConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = GizmoConfig::from_ron_str("(line_width: 4.0)").unwrap();
        assert_eq!(config.line_width, 4.0);
        assert_eq!(config.colors, GizmoColors::default());
        assert!(config.translate_enabled);
    }

    #[test]
    fn test_malformed_ron_is_rejected() {
        assert!(matches!(
            GizmoConfig::from_ron_str("(line_width: \"wide\")"),
            Err(ConfigError::Deserialize(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gizmo.ron");
        let config = GizmoConfig {
            rotate_enabled: false,
            ..GizmoConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(GizmoConfig::load(&path).unwrap(), config);
    }
}
