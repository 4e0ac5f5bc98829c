//! Vector path data stored in painting cells.

use kurbo::{BezPath, ParamCurveExtrema, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a path.
pub type PathId = Uuid;

/// Stroke color used by [`Path::default`].
pub const DEFAULT_STROKE_COLOR: &str = "#000000";
/// Stroke width used by [`Path::default`].
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// One vertex of a path: an anchor point and its two curve handles.
///
/// Handles are offsets relative to `point`. A zero handle means the curve
/// leaves or enters the anchor in a straight line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub point: Point,
    #[serde(default = "zero_point")]
    pub handle_in: Point,
    #[serde(default = "zero_point")]
    pub handle_out: Point,
}

fn zero_point() -> Point {
    Point::ZERO
}

impl Segment {
    /// A corner segment without handles.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            handle_in: Point::ZERO,
            handle_out: Point::ZERO,
        }
    }

    pub fn with_handles(point: Point, handle_in: Point, handle_out: Point) -> Self {
        Self {
            point,
            handle_in,
            handle_out,
        }
    }

    /// Whether both handles are zero.
    pub fn is_corner(&self) -> bool {
        self.handle_in == Point::ZERO && self.handle_out == Point::ZERO
    }

    /// Absolute position of the incoming control point.
    pub fn control_in(&self) -> Point {
        self.point + self.handle_in.to_vec2()
    }

    /// Absolute position of the outgoing control point.
    pub fn control_out(&self) -> Point {
        self.point + self.handle_out.to_vec2()
    }
}

/// A stroked vector path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    #[serde(default = "Uuid::new_v4")]
    pub id: PathId,
    /// Segments in drawing order.
    pub segments: Vec<Segment>,
    /// Opaque color string, e.g. `"#ff0000"`.
    pub stroke_color: String,
    pub stroke_width: f64,
}

impl Path {
    /// Create an empty path with the given stroke.
    pub fn new(stroke_color: impl Into<String>, stroke_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            segments: Vec::new(),
            stroke_color: stroke_color.into(),
            stroke_width,
        }
    }

    /// Create a path from existing segments.
    pub fn from_segments(segments: Vec<Segment>, stroke_color: impl Into<String>, stroke_width: f64) -> Self {
        Self {
            segments,
            ..Self::new(stroke_color, stroke_width)
        }
    }

    /// Create a polyline through the given points.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            segments: points.into_iter().map(Segment::new).collect(),
            ..Self::default()
        }
    }

    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Anchor of the first segment. Paths are filed under the cell containing it.
    pub fn first_point(&self) -> Option<Point> {
        self.segments.first().map(|s| s.point)
    }

    /// Build the cubic Bézier outline of this path.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some(first) = self.segments.first() else {
            return path;
        };

        path.move_to(first.point);
        for pair in self.segments.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if from.handle_out == Point::ZERO && to.handle_in == Point::ZERO {
                path.line_to(to.point);
            } else {
                path.curve_to(from.control_out(), to.control_in(), to.point);
            }
        }

        path
    }

    /// Bounding box of the stroked curve.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.first_point() else {
            return Rect::ZERO;
        };

        let half_width = self.stroke_width.max(0.0) / 2.0;
        self.to_bez_path()
            .segments()
            .fold(Rect::from_points(first, first), |acc, seg| acc.union(seg.bounding_box()))
            .inflate(half_width, half_width)
    }

    /// Move every anchor by `delta`. Handles are relative and stay unchanged.
    pub fn translate(&mut self, delta: Vec2) {
        for segment in &mut self.segments {
            segment.point += delta;
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    #[test]
    fn test_path_creation() {
        let path = Path::new("#ff0000", 4.0);
        assert!(path.is_empty());
        assert_eq!(path.stroke_color, "#ff0000");
        assert_eq!(path.first_point(), None);
    }

    #[test]
    fn test_push_segments() {
        let mut path = Path::default();
        path.push_segment(Segment::new(Point::new(1.0, 2.0)));
        path.push_segment(Segment::new(Point::new(3.0, 4.0)));
        assert_eq!(path.len(), 2);
        assert_eq!(path.first_point(), Some(Point::new(1.0, 2.0)));
    }

    #[test]
    fn test_corner_segments_become_lines() {
        let path = Path::from_points([Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        let elements: Vec<_> = path.to_bez_path().elements().to_vec();
        assert_eq!(
            elements,
            vec![
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(10.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_handles_are_relative() {
        let a = Segment::with_handles(Point::new(0.0, 0.0), Point::ZERO, Point::new(5.0, 5.0));
        let b = Segment::with_handles(Point::new(10.0, 0.0), Point::new(-5.0, 5.0), Point::ZERO);
        assert!(!a.is_corner());

        let path = Path::from_segments(vec![a, b], "#000", 1.0);
        let elements: Vec<_> = path.to_bez_path().elements().to_vec();
        assert_eq!(
            elements[1],
            PathEl::CurveTo(Point::new(5.0, 5.0), Point::new(5.0, 5.0), Point::new(10.0, 0.0))
        );
    }

    #[test]
    fn test_bounds_include_stroke() {
        let mut path = Path::from_points([Point::new(0.0, 0.0), Point::new(100.0, 50.0)]);
        path.stroke_width = 4.0;

        let bounds = path.bounds();
        assert!((bounds.x0 + 2.0).abs() < f64::EPSILON);
        assert!((bounds.y0 + 2.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 102.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 52.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_point_bounds() {
        let mut path = Path::from_points([Point::new(7.0, 8.0)]);
        path.stroke_width = 2.0;
        assert_eq!(path.bounds(), Rect::new(6.0, 7.0, 8.0, 9.0));
        assert_eq!(Path::default().bounds(), Rect::ZERO);
    }

    #[test]
    fn test_translate() {
        let mut path = Path::from_segments(
            vec![Segment::with_handles(Point::new(1.0, 1.0), Point::new(-1.0, 0.0), Point::new(1.0, 0.0))],
            "#000",
            1.0,
        );
        path.translate(Vec2::new(10.0, 20.0));
        assert_eq!(path.segments[0].point, Point::new(11.0, 21.0));
        assert_eq!(path.segments[0].handle_out, Point::new(1.0, 0.0));
    }

    #[test]
    fn test_missing_id_and_handles_are_defaulted() {
        let json = r##"{
            "segments": [{ "point": { "x": 1.0, "y": 2.0 } }],
            "stroke_color": "#123456",
            "stroke_width": 3.0
        }"##;
        let path: Path = serde_json::from_str(json).expect("Failed to parse path");
        assert_eq!(path.len(), 1);
        assert!(path.segments[0].is_corner());
        assert!(!path.id.is_nil());
    }
}
