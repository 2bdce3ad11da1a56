//! Built-in and custom mask shapes.
//!
//! Each [`MaskShape`] resolves to a [`ResolvedMask`]: a path together with the
//! coordinate box its points are expressed in. The parametric circle and
//! square live in a 50×50 box, everything defined by path data in a 100×100
//! box.

use std::fmt;
use std::str::FromStr;

use kurbo::{Point, Vec2};

use crate::error::ParseError;
use crate::path::{self, CoordinateBox, Path, PathSegment};

/// Native box of the parametric shapes.
pub const PARAMETRIC_BOX: CoordinateBox = CoordinateBox::square(50.0);

/// Native box of every shape given as path data, custom paths included.
pub const PATH_DATA_BOX: CoordinateBox = CoordinateBox::square(100.0);

/// Sweep of the circle's arc. The remaining degree is bridged by the close.
const CIRCLE_SWEEP_DEGREES: f64 = 359.0;

const SQUIRCLE_PATH: &str = "M 50,0 C 10,0 0,10 0,50 C 0,90 10,100 50,100 C 90,100 100,90 100,50 C 100,10 90,0 50,0 Z";

const ROUNDED_SQUARE_PATH: &str = "M 50,0 L 70,0 A 30,30,0,0 1 100,30 L 100,70 A 30,30,0,0 1 70,100 L 30,100 A 30,30,0,0 1 0,70 L 0,30 A 30,30,0,0 1 30,0 Z";

const TEARDROP_PATH: &str =
    "M 50,0 A 50,50,0,0 1 100,50 L 100,85 A 15,15,0,0 1 85,100 L 50,100 A 50,50,0,0 1 50,0 Z";

// ============================================================================
// MaskShape
// ============================================================================

/// The outline an icon is clipped to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MaskShape {
    #[default]
    Circle,
    Squircle,
    RoundedSquare,
    Square,
    Teardrop,
    /// Caller-supplied path data in a 100×100 box.
    CustomPath(String),
}

impl MaskShape {
    /// The built-in shapes in catalog order.
    pub const BUILT_IN: [MaskShape; 5] = [
        MaskShape::Circle,
        MaskShape::Squircle,
        MaskShape::RoundedSquare,
        MaskShape::Square,
        MaskShape::Teardrop,
    ];

    /// Creates a custom mask from path data.
    pub fn custom(path_data: impl Into<String>) -> Self {
        Self::CustomPath(path_data.into())
    }

    /// Kebab-case name, `"custom"` for path-data masks.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Squircle => "squircle",
            Self::RoundedSquare => "rounded-square",
            Self::Square => "square",
            Self::Teardrop => "teardrop",
            Self::CustomPath(_) => "custom",
        }
    }

    /// The path data behind vector-defined shapes. `None` for the
    /// parametric circle and square.
    pub fn path_data(&self) -> Option<&str> {
        match self {
            Self::Squircle => Some(SQUIRCLE_PATH),
            Self::RoundedSquare => Some(ROUNDED_SQUARE_PATH),
            Self::Teardrop => Some(TEARDROP_PATH),
            Self::CustomPath(data) => Some(data),
            Self::Circle | Self::Square => None,
        }
    }

    /// Resolves the shape into its path and native coordinate box.
    ///
    /// Deterministic: the same shape always yields the same result. Only
    /// custom path data can fail.
    pub fn resolve(&self) -> Result<ResolvedMask, ParseError> {
        match self {
            Self::Circle => Ok(ResolvedMask::new(circle_path(), PARAMETRIC_BOX)),
            Self::Square => Ok(ResolvedMask::new(square_path(), PARAMETRIC_BOX)),
            Self::Squircle | Self::RoundedSquare | Self::Teardrop | Self::CustomPath(_) => {
                let data = self.path_data().unwrap_or_default();
                Ok(ResolvedMask::new(path::parse(data)?, PATH_DATA_BOX))
            }
        }
    }
}

impl fmt::Display for MaskShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaskShape {
    type Err = String;

    /// Parses a built-in shape name. Custom masks are built with
    /// [`MaskShape::custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BUILT_IN
            .iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(s))
            .cloned()
            .ok_or_else(|| {
                format!(
                    "unknown mask '{s}', expected one of: circle, squircle, rounded-square, square, teardrop"
                )
            })
    }
}

// ============================================================================
// ResolvedMask
// ============================================================================

/// A mask path paired with the box its coordinates live in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMask {
    pub path: Path,
    pub bounds: CoordinateBox,
}

impl ResolvedMask {
    pub fn new(path: Path, bounds: CoordinateBox) -> Self {
        Self { path, bounds }
    }

    /// Rescales the mask into a `size × size` box at the origin.
    pub fn scaled_to(&self, size: u32) -> ResolvedMask {
        let dest = CoordinateBox::square(f64::from(size));
        ResolvedMask::new(path::transform(&self.path, &self.bounds, &dest), dest)
    }
}

/// An ellipse inscribed in the parametric box, traced clockwise from angle
/// zero and closed.
fn circle_path() -> Path {
    let radius = PARAMETRIC_BOX.width() / 2.0;
    let center = Point::new(radius, radius);
    let end_angle = CIRCLE_SWEEP_DEGREES.to_radians();

    Path::from_segments(vec![
        PathSegment::MoveTo(center + Vec2::new(radius, 0.0)),
        PathSegment::ArcTo {
            radii: Vec2::new(radius, radius),
            x_rotation: 0.0,
            large_arc: true,
            sweep: true,
            to: center + Vec2::from_angle(end_angle) * radius,
        },
        PathSegment::ClosePath,
    ])
}

fn square_path() -> Path {
    let side = PARAMETRIC_BOX.width();
    Path::from_segments(vec![
        PathSegment::MoveTo(Point::ZERO),
        PathSegment::LineTo(Point::new(0.0, side)),
        PathSegment::LineTo(Point::new(side, side)),
        PathSegment::LineTo(Point::new(side, 0.0)),
        PathSegment::LineTo(Point::ZERO),
        PathSegment::ClosePath,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.5;

    #[test]
    fn built_ins_fill_the_output_box() {
        for shape in MaskShape::BUILT_IN {
            let resolved = shape.resolve().unwrap().scaled_to(256);
            let bounds = resolved.path.bounds();

            assert!(bounds.x0.abs() < TOLERANCE, "{shape}: x0 = {}", bounds.x0);
            assert!(bounds.y0.abs() < TOLERANCE, "{shape}: y0 = {}", bounds.y0);
            assert!((bounds.x1 - 256.0).abs() < TOLERANCE, "{shape}: x1 = {}", bounds.x1);
            assert!((bounds.y1 - 256.0).abs() < TOLERANCE, "{shape}: y1 = {}", bounds.y1);
            assert_eq!(resolved.bounds, CoordinateBox::square(256.0));
        }
    }

    #[test]
    fn native_boxes() {
        assert_eq!(MaskShape::Circle.resolve().unwrap().bounds, PARAMETRIC_BOX);
        assert_eq!(MaskShape::Square.resolve().unwrap().bounds, PARAMETRIC_BOX);
        assert_eq!(MaskShape::Squircle.resolve().unwrap().bounds, PATH_DATA_BOX);
        assert_eq!(MaskShape::RoundedSquare.resolve().unwrap().bounds, PATH_DATA_BOX);
        assert_eq!(MaskShape::Teardrop.resolve().unwrap().bounds, PATH_DATA_BOX);
        assert_eq!(
            MaskShape::custom("M0 0 L10 10 Z").resolve().unwrap().bounds,
            PATH_DATA_BOX
        );
    }

    #[test]
    fn every_built_in_ends_closed() {
        for shape in MaskShape::BUILT_IN {
            assert!(shape.resolve().unwrap().path.is_closed(), "{shape}");
        }
    }

    #[test]
    fn circle_is_a_single_arc() {
        let path = MaskShape::Circle.resolve().unwrap().path;
        assert_eq!(path.len(), 3);
        assert_eq!(path.segments()[0], PathSegment::MoveTo(Point::new(50.0, 25.0)));
        let PathSegment::ArcTo { to, large_arc, .. } = path.segments()[1] else {
            panic!("expected arc");
        };
        assert!(large_arc);
        assert!((to.x - 50.0).abs() < 0.01);
        assert!(to.y < 25.0);
    }

    #[test]
    fn resolution_is_deterministic() {
        for shape in MaskShape::BUILT_IN {
            assert_eq!(shape.resolve().unwrap(), shape.resolve().unwrap());
        }
    }

    #[test]
    fn bad_custom_path_fails() {
        let err = MaskShape::custom("M 0 0 K 1 1").resolve().unwrap_err();
        assert!(matches!(err, ParseError::UnknownCommand { command: 'K', .. }));
    }

    #[test]
    fn names_round_trip() {
        for shape in MaskShape::BUILT_IN {
            assert_eq!(shape.name().parse::<MaskShape>().unwrap(), shape);
        }
        assert!("blob".parse::<MaskShape>().is_err());
        assert_eq!(MaskShape::custom("M0 0").name(), "custom");
    }
}
