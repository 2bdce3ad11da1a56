//! Error types shared across the crate.

use crate::icon::LayerRole;

/// Result alias used by fallible rendering operations.
pub type IconResult<T> = Result<T, IconError>;

/// A malformed path-data string.
///
/// Offsets are byte offsets into the original input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("path data is empty")]
    Empty,

    #[error("expected a command letter at offset {offset}")]
    MissingCommand { offset: usize },

    #[error("unknown command '{command}' at offset {offset}")]
    UnknownCommand { command: char, offset: usize },

    #[error(
        "command '{command}' at offset {offset} expects operands in groups of {expected}, found {found}"
    )]
    MissingOperands {
        command: char,
        expected: usize,
        found: usize,
        offset: usize,
    },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
}

/// Errors produced while preparing or rendering an adaptive icon.
#[derive(thiserror::Error, Debug)]
pub enum IconError {
    #[error("path data error: {0}")]
    Parse(#[from] ParseError),

    /// The compositor has no resolved mask to clip against.
    #[error("render attempted before the mask was resolved")]
    NotReady,

    #[error("{role} layer is {width}x{height} and cannot be scaled")]
    InvalidLayer {
        role: LayerRole,
        width: u32,
        height: u32,
    },

    #[error("invalid render config: {0}")]
    InvalidConfig(String),

    #[error("mask path has no drawable area")]
    DegenerateMask,

    #[error("failed to decode layer image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to render svg layer: {0}")]
    Svg(String),
}

impl IconError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn svg(msg: impl Into<String>) -> Self {
        Self::Svg(msg.into())
    }
}
