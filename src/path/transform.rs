//! Mapping paths between coordinate boxes.

use kurbo::{Affine, Vec2};

use super::{CoordinateBox, Path, PathSegment};

/// Maps `path` from `source` coordinates into `dest` coordinates.
///
/// X and Y are scaled independently by `dest.width / source.width` and
/// `dest.height / source.height`. Every operand is mapped, control points
/// included; arc radii scale per axis and the arc's x-axis rotation is left
/// untouched, which is exact for axis-aligned arcs.
pub fn transform(path: &Path, source: &CoordinateBox, dest: &CoordinateBox) -> Path {
    let scale = source.scale_to(dest);
    let affine = Affine::translate(dest.origin().to_vec2())
        * Affine::scale_non_uniform(scale.x, scale.y)
        * Affine::translate(-source.origin().to_vec2());
    let radius_scale = Vec2::new(scale.x.abs(), scale.y.abs());

    path.iter()
        .map(|segment| match *segment {
            PathSegment::MoveTo(p) => PathSegment::MoveTo(affine * p),
            PathSegment::LineTo(p) => PathSegment::LineTo(affine * p),
            PathSegment::CubicCurveTo { ctrl1, ctrl2, to } => PathSegment::CubicCurveTo {
                ctrl1: affine * ctrl1,
                ctrl2: affine * ctrl2,
                to: affine * to,
            },
            PathSegment::ArcTo {
                radii,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => PathSegment::ArcTo {
                radii: Vec2::new(radii.x * radius_scale.x, radii.y * radius_scale.y),
                x_rotation,
                large_arc,
                sweep,
                to: affine * to,
            },
            PathSegment::ClosePath => PathSegment::ClosePath,
        })
        .collect()
}
