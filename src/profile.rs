//! Serializable render profile.
//!
//! A [`RenderProfile`] captures a [`RenderConfig`] in a JSON-friendly form so
//! settings can be saved to disk or handed between processes.
//!
//! # Example
//!
//! ```
//! use adaptive_icon::{MaskShape, RenderConfig, RenderProfile};
//!
//! let config = RenderConfig::new(MaskShape::RoundedSquare).with_offset(0.5, 0.0);
//! let json = RenderProfile::from(&config).to_json().unwrap();
//!
//! let restored = RenderProfile::from_json(&json).unwrap().into_config().unwrap();
//! assert_eq!(restored.mask, MaskShape::RoundedSquare);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_BACKGROUND_ZOOM, DEFAULT_FOREGROUND_ZOOM, DEFAULT_OUTPUT_SIZE, RenderConfig,
};
use crate::error::IconResult;
use crate::shape::MaskShape;

// ============================================================================
// Serializable Mask
// ============================================================================

/// Serializable name of a built-in [`MaskShape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SerializableShape {
    #[default]
    Circle,
    Squircle,
    RoundedSquare,
    Square,
    Teardrop,
}

/// Serializable representation of a [`MaskShape`].
///
/// Serializes to a flat structure with either a `shape` or a `pathData` field:
///
/// ```json
/// { "shape": "rounded-square" }
/// // or
/// { "pathData": "M 0,0 L 100,0 L 50,100 Z" }
/// ```
///
/// `pathData` wins when both are present; neither means the default circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SerializableMask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<SerializableShape>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_data: Option<String>,
}

impl From<&MaskShape> for SerializableMask {
    fn from(mask: &MaskShape) -> Self {
        let shape = match mask {
            MaskShape::Circle => SerializableShape::Circle,
            MaskShape::Squircle => SerializableShape::Squircle,
            MaskShape::RoundedSquare => SerializableShape::RoundedSquare,
            MaskShape::Square => SerializableShape::Square,
            MaskShape::Teardrop => SerializableShape::Teardrop,
            MaskShape::CustomPath(data) => {
                return Self {
                    shape: None,
                    path_data: Some(data.clone()),
                };
            }
        };
        Self {
            shape: Some(shape),
            path_data: None,
        }
    }
}

impl From<SerializableMask> for MaskShape {
    fn from(mask: SerializableMask) -> Self {
        if let Some(data) = mask.path_data {
            return MaskShape::CustomPath(data);
        }
        match mask.shape.unwrap_or_default() {
            SerializableShape::Circle => MaskShape::Circle,
            SerializableShape::Squircle => MaskShape::Squircle,
            SerializableShape::RoundedSquare => MaskShape::RoundedSquare,
            SerializableShape::Square => MaskShape::Square,
            SerializableShape::Teardrop => MaskShape::Teardrop,
        }
    }
}

fn default_output_size() -> u32 {
    DEFAULT_OUTPUT_SIZE
}

fn default_background_zoom() -> f32 {
    DEFAULT_BACKGROUND_ZOOM
}

fn default_foreground_zoom() -> f32 {
    DEFAULT_FOREGROUND_ZOOM
}

// ============================================================================
// RenderProfile
// ============================================================================

/// A serializable profile holding every render setting.
///
/// Missing fields take their [`RenderConfig`] defaults, so `{}` is a valid
/// profile.
///
/// # JSON Format
///
/// ```json
/// {
///   "outputSize": 256,
///   "backgroundZoom": 0.6,
///   "foregroundZoom": 1.0,
///   "offsetX": 0.0,
///   "offsetY": 0.0,
///   "mask": { "shape": "squircle" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderProfile {
    #[serde(default = "default_output_size")]
    pub output_size: u32,

    #[serde(default = "default_background_zoom")]
    pub background_zoom: f32,

    #[serde(default = "default_foreground_zoom")]
    pub foreground_zoom: f32,

    #[serde(default)]
    pub offset_x: f32,

    #[serde(default)]
    pub offset_y: f32,

    #[serde(default)]
    pub mask: SerializableMask,
}

impl Default for RenderProfile {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for RenderProfile {
    fn from(config: &RenderConfig) -> Self {
        Self {
            output_size: config.output_size,
            background_zoom: config.background_zoom,
            foreground_zoom: config.foreground_zoom,
            offset_x: config.offset_x,
            offset_y: config.offset_y,
            mask: SerializableMask::from(&config.mask),
        }
    }
}

impl RenderProfile {
    /// Creates a profile with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts to a config without validating it.
    pub fn to_config(&self) -> RenderConfig {
        RenderConfig {
            output_size: self.output_size,
            background_zoom: self.background_zoom,
            foreground_zoom: self.foreground_zoom,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            mask: self.mask.clone().into(),
        }
    }

    /// Converts to a config, rejecting out-of-range values.
    pub fn into_config(self) -> IconResult<RenderConfig> {
        let config = self.to_config();
        config.validate()?;
        Ok(config)
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================
