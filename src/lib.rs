//! adaptive-icon: renders two-layer adaptive icons clipped to mask shapes.
//!
//! An adaptive icon is a background and a foreground raster. This crate
//! scales both to a square output, shifts them by independent parallax
//! offsets, zooms the foreground about the center, and clips the result to
//! one of several mask outlines (circle, squircle, rounded square, square,
//! teardrop, or arbitrary path data).
//!
//! # Example
//!
//! ```
//! use adaptive_icon::{AdaptiveIcon, MaskShape, RenderConfig, render};
//! use image::{Rgba, RgbaImage};
//!
//! let icon = AdaptiveIcon::new()
//!     .with_background(RgbaImage::from_pixel(108, 108, Rgba([250, 200, 40, 255])))
//!     .with_foreground(RgbaImage::from_pixel(72, 72, Rgba([20, 20, 20, 255])));
//!
//! let config = RenderConfig::new(MaskShape::Squircle)
//!     .with_output_size(128)
//!     .with_offset(0.2, -0.1);
//!
//! let rendered = render(&config, &icon).unwrap();
//! assert_eq!(rendered.data.dimensions(), (128, 128));
//! // Corners fall outside the squircle.
//! assert_eq!(rendered.data.get_pixel(0, 0).0[3], 0);
//! ```
//!
//! # Custom Masks
//!
//! Any path data in a 100×100 box works as a mask:
//!
//! ```
//! use adaptive_icon::{AdaptiveIcon, MaskShape, RenderConfig, render};
//!
//! let triangle = MaskShape::custom("M 50,0 L 100,100 L 0,100 Z");
//! let rendered = render(&RenderConfig::new(triangle), &AdaptiveIcon::new()).unwrap();
//! assert_eq!(rendered.data.width(), 256);
//! ```
//!
//! # Serializable Profiles
//!
//! Settings travel as JSON through [`RenderProfile`], applied with the
//! [`Configurable`] trait:
//!
//! ```
//! use adaptive_icon::{AdaptiveIcon, Compositor, Configurable, RenderConfig, RenderProfile};
//!
//! let profile = RenderProfile::from_json(r#"{"outputSize": 96, "mask": {"shape": "teardrop"}}"#).unwrap();
//!
//! let mut compositor = Compositor::new(RenderConfig::default(), AdaptiveIcon::new());
//! compositor.apply_profile(&profile);
//! assert_eq!(compositor.render().unwrap().data.width(), 96);
//!
//! let json = compositor.export_profile().to_json().unwrap();
//! assert!(json.contains("teardrop"));
//! ```

mod compositor;
mod config;
mod error;
mod icon;
mod layer;
pub mod path;
mod profile;
mod raster;
mod shape;

pub use compositor::{
    BACKGROUND_PARALLAX, Compositor, Configurable, FOREGROUND_PARALLAX, PreparedIcon,
    RenderedIcon, SkippedLayer, background_translation, composite, foreground_translation,
    prepare, render,
};
pub use config::{
    DEFAULT_BACKGROUND_ZOOM, DEFAULT_FOREGROUND_ZOOM, DEFAULT_OUTPUT_SIZE, MAX_OUTPUT_SIZE,
    RenderConfig,
};
pub use error::{IconError, IconResult, ParseError};
pub use icon::{AdaptiveIcon, IconLayer, LayerRole, SizePx};
pub use layer::{LayerSource, RESIZE_FILTER, extract_thumbnail, fit_layer, render_svg, scale_layer};
pub use path::{CoordinateBox, Path, PathSegment};
pub use profile::{RenderProfile, SerializableMask, SerializableShape};
pub use raster::{composite_over, pixmap_to_rgba_image, rgba_image_to_pixmap};
pub use shape::{MaskShape, PARAMETRIC_BOX, PATH_DATA_BOX, ResolvedMask};
