//! Vector paths for mask outlines.
//!
//! A [`Path`] is an ordered list of [`PathSegment`]s with absolute
//! coordinates. Coordinates only mean something relative to a
//! [`CoordinateBox`], so the two always travel together once a mask is
//! resolved (see [`crate::ResolvedMask`]).
//!
//! Paths are produced by [`parse`], rescaled by [`transform`], and finally
//! lowered to a `tiny_skia` path for rasterization. Arcs are kept in their
//! endpoint form until that last step so that scaling touches only the
//! operands, never a curve approximation.

mod parser;
mod transform;

pub use parser::parse;
pub use transform::transform;

use kurbo::{Arc, BezPath, PathEl, Point, Rect, Shape, SvgArc, Vec2};
use resvg::tiny_skia;

/// Maximum distance between an elliptical arc and its cubic approximation.
const ARC_TOLERANCE: f64 = 0.05;

// ============================================================================
// CoordinateBox
// ============================================================================

/// The rectangle a path's raw coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl CoordinateBox {
    /// A square box of side `size` anchored at the origin.
    ///
    /// `size` must be positive; prefer [`CoordinateBox::new`] for untrusted
    /// input.
    pub const fn square(size: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size,
            height: size,
        }
    }

    /// Creates a box, returning `None` unless both dimensions are finite and
    /// positive.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        let valid = x.is_finite()
            && y.is_finite()
            && width.is_finite()
            && height.is_finite()
            && width > 0.0
            && height > 0.0;
        valid.then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Creates a box anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Option<Self> {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Per-axis factors that map this box onto `dest`.
    pub fn scale_to(&self, dest: &CoordinateBox) -> Vec2 {
        Vec2::new(dest.width / self.width, dest.height / self.height)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

// ============================================================================
// PathSegment / Path
// ============================================================================

/// One drawing command with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    CubicCurveTo {
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    /// Elliptical arc in endpoint form. `x_rotation` is in degrees.
    ArcTo {
        radii: Vec2,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    ClosePath,
}

impl PathSegment {
    /// The on-curve point this segment ends at. `None` for `ClosePath`.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) => Some(p),
            Self::CubicCurveTo { to, .. } | Self::ArcTo { to, .. } => Some(to),
            Self::ClosePath => None,
        }
    }
}

/// An ordered list of segments, possibly holding several contours.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Number of contours, counted by their opening `MoveTo`.
    pub fn contour_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::MoveTo(_)))
            .count()
    }

    /// Returns true if the last segment closes its contour.
    pub fn is_closed(&self) -> bool {
        matches!(self.segments.last(), Some(PathSegment::ClosePath))
    }

    /// All on-curve points in order, `MoveTo` targets included.
    pub fn end_points(&self) -> Vec<Point> {
        self.segments.iter().filter_map(PathSegment::end_point).collect()
    }

    /// Lowers the path to kurbo form, converting arcs into cubic curves.
    pub fn to_bez_path(&self) -> BezPath {
        let mut bez = BezPath::new();
        let mut current = Point::ZERO;
        let mut start = Point::ZERO;
        let mut needs_move = true;

        for segment in &self.segments {
            if needs_move && !matches!(segment, PathSegment::MoveTo(_) | PathSegment::ClosePath) {
                bez.move_to(current);
                start = current;
                needs_move = false;
            }

            match *segment {
                PathSegment::MoveTo(p) => {
                    bez.move_to(p);
                    current = p;
                    start = p;
                    needs_move = false;
                }
                PathSegment::LineTo(p) => {
                    bez.line_to(p);
                    current = p;
                }
                PathSegment::CubicCurveTo { ctrl1, ctrl2, to } => {
                    bez.curve_to(ctrl1, ctrl2, to);
                    current = to;
                }
                PathSegment::ArcTo {
                    radii,
                    x_rotation,
                    large_arc,
                    sweep,
                    to,
                } => {
                    let svg_arc = SvgArc {
                        from: current,
                        to,
                        radii,
                        x_rotation: x_rotation.to_radians(),
                        large_arc,
                        sweep,
                    };
                    match Arc::from_svg_arc(&svg_arc) {
                        Some(arc) => arc.append_iter(ARC_TOLERANCE).for_each(|el| bez.push(el)),
                        // Zero radii degrade to a straight line.
                        None if to != current => bez.line_to(to),
                        None => {}
                    }
                    current = to;
                }
                PathSegment::ClosePath => {
                    if !needs_move {
                        bez.close_path();
                    }
                    current = start;
                    needs_move = true;
                }
            }
        }

        bez
    }

    /// Tight geometric bounds of the path (curve extrema, not control points).
    pub fn bounds(&self) -> Rect {
        if self.is_empty() {
            return Rect::ZERO;
        }
        self.to_bez_path().bounding_box()
    }

    /// Builds a rasterizable `tiny_skia` path.
    ///
    /// Returns `None` if the path encloses nothing drawable.
    pub fn to_skia_path(&self) -> Option<tiny_skia::Path> {
        let mut builder = tiny_skia::PathBuilder::new();
        for el in self.to_bez_path().elements() {
            match *el {
                PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
                PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
                PathEl::QuadTo(c, p) => {
                    builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32)
                }
                PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    p.x as f32,
                    p.y as f32,
                ),
                PathEl::ClosePath => builder.close(),
            }
        }
        builder.finish()
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self::from_segments(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 0.05, "{a} != {b}");
    }

    #[test]
    fn coordinate_box_rejects_degenerate_sizes() {
        assert!(CoordinateBox::from_size(0.0, 10.0).is_none());
        assert!(CoordinateBox::from_size(10.0, f64::NAN).is_none());
        assert!(CoordinateBox::new(5.0, 5.0, 1.0, 1.0).is_some());
    }

    #[test]
    fn scale_factors_are_independent() {
        let src = CoordinateBox::square(50.0);
        let dst = CoordinateBox::from_size(100.0, 25.0).unwrap();
        assert_eq!(src.scale_to(&dst), Vec2::new(2.0, 0.5));
    }

    #[test]
    fn bounds_follow_arc_extrema() {
        // Half circle bulging to y = -10 below the chord.
        let path = Path::from_segments(vec![
            PathSegment::MoveTo(Point::new(0.0, 0.0)),
            PathSegment::ArcTo {
                radii: Vec2::new(10.0, 10.0),
                x_rotation: 0.0,
                large_arc: false,
                sweep: true,
                to: Point::new(20.0, 0.0),
            },
            PathSegment::ClosePath,
        ]);

        let bounds = path.bounds();
        assert_close(bounds.x0, 0.0);
        assert_close(bounds.x1, 20.0);
        assert_close(bounds.y0, -10.0);
        assert_close(bounds.y1, 0.0);
    }

    #[test]
    fn zero_radius_arc_is_a_line() {
        let path = Path::from_segments(vec![
            PathSegment::MoveTo(Point::new(0.0, 0.0)),
            PathSegment::ArcTo {
                radii: Vec2::ZERO,
                x_rotation: 0.0,
                large_arc: false,
                sweep: false,
                to: Point::new(4.0, 3.0),
            },
        ]);
        let bez = path.to_bez_path();
        assert_eq!(bez.elements().len(), 2);
        assert!(matches!(bez.elements()[1], PathEl::LineTo(_)));
    }

    #[test]
    fn segments_after_close_restart_at_subpath_start() {
        let path = Path::from_segments(vec![
            PathSegment::MoveTo(Point::new(1.0, 1.0)),
            PathSegment::LineTo(Point::new(5.0, 1.0)),
            PathSegment::ClosePath,
            PathSegment::LineTo(Point::new(1.0, 5.0)),
        ]);
        let bez = path.to_bez_path();
        assert_eq!(bez.elements()[3], PathEl::MoveTo(Point::new(1.0, 1.0)));
        assert_eq!(path.contour_count(), 1);
        assert!(!path.is_closed());
    }

    #[test]
    fn empty_path_has_no_skia_form() {
        assert!(Path::new().to_skia_path().is_none());
        assert_eq!(Path::new().bounds(), Rect::ZERO);
    }
}
