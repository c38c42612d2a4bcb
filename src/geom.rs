use euclid::{Box2D, Point2D, Size2D, Vector2D};

/// Unit tag for board coordinates.  Everything in this crate lives in this
/// one space; the tag exists so euclid will yell about mixing in screen
/// coordinates from the application side.
pub struct BoardSpace;
pub type Coord = i32;
pub type Point = Point2D<Coord, BoardSpace>;
pub type Vector = Vector2D<Coord, BoardSpace>;
pub type BBox = Box2D<Coord, BoardSpace>;
pub type Size = Size2D<Coord, BoardSpace>;

// Coordinates are assumed to fit comfortably in 30 bits (board space), so
// differences fit in 32 and their pairwise products in 64.  All the
// predicates below promote to i64 before multiplying.

#[inline]
pub fn cross(o: Point, a: Point, b: Point) -> i64 {
    let ax = (a.x - o.x) as i64;
    let ay = (a.y - o.y) as i64;
    let bx = (b.x - o.x) as i64;
    let by = (b.y - o.y) as i64;
    return ax * by - ay * bx;
}

#[inline]
pub fn dot(o: Point, a: Point, b: Point) -> i64 {
    let ax = (a.x - o.x) as i64;
    let ay = (a.y - o.y) as i64;
    let bx = (b.x - o.x) as i64;
    let by = (b.y - o.y) as i64;
    return ax * bx + ay * by;
}

/// Half-open box spanning the two endpoints of an edge.  Max is exclusive,
/// so even a horizontal or vertical edge gets a box one unit wide; adjacent
/// edges therefore never produce spuriously overlapping boxes.
pub fn edge_box(a: Point, b: Point) -> BBox {
    let min = Point::new(a.x.min(b.x), a.y.min(b.y));
    let max = Point::new(a.x.max(b.x) + 1, a.y.max(b.y) + 1);
    return BBox::new(min, max);
}

/// True if p lies on the closed segment a-b.
pub fn point_on_segment(p: Point, a: Point, b: Point) -> bool {
    if cross(a, b, p) != 0 {
        return false;
    }
    // collinear; check the projection onto the dominant axis
    if (b.x - a.x).abs() >= (b.y - a.y).abs() {
        return p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x);
    }
    else {
        return p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y);
    }
}

/// Does the (infinite) supporting line of a-b pass through the box?  Used as
/// the region-pruning callback in the intersection pass: a subtree of edges
/// whose bounds lie strictly on one side of the line cannot cross the edge.
/// Conservative for half-open boxes (tests the outer corners).
pub fn line_crosses_box(a: Point, b: Point, bounds: &BBox) -> bool {
    let corners = [
        bounds.min,
        Point::new(bounds.max.x, bounds.min.y),
        bounds.max,
        Point::new(bounds.min.x, bounds.max.y),
    ];
    let mut above = false;
    let mut below = false;
    for &c in corners.iter() {
        let s = cross(a, b, c);
        if s >= 0 {
            above = true;
        }
        if s <= 0 {
            below = true;
        }
    }
    return above && below;
}

/// Monotone pseudo-angle of the direction from `origin` towards `to`: not
/// the true angle, but a monotone function of it, cheap to compute and
/// exactly equal for exactly equal direction ratios.  Range [0, 4).
pub fn pseudo_angle(origin: Point, to: Point) -> f64 {
    let vx = (to.x - origin.x) as i64;
    let vy = (to.y - origin.y) as i64;
    debug_assert!(vx != 0 || vy != 0);
    let dx = vx.abs() as f64;
    let dy = vy.abs() as f64;
    let ang = dy / (dx + dy);
    if vx >= 0 && vy >= 0 {
        return ang;
    }
    else if vx < 0 && vy >= 0 {
        return 2.0 - ang;
    }
    else if vx < 0 {
        return 2.0 + ang;
    }
    else {
        return 4.0 - ang;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentIntersection {
    None,
    /// The segments meet at a single point (possibly an endpoint of either).
    Point(Point),
    /// The segments are collinear and overlap; the two points bound the
    /// shared span, in order along the first segment.
    Segment(Point, Point),
}

/// Intersect the closed segments a1-a2 and b1-b2 on the integer grid.
/// A true crossing off the grid is snap-rounded to the nearest grid point,
/// which is what lets the callers insert it as a real vertex.
pub fn intersect_segments(a1: Point, a2: Point, b1: Point, b2: Point) -> SegmentIntersection {
    // cheap rejection on the closed bounding spans
    if a1.x.max(a2.x) < b1.x.min(b2.x) || b1.x.max(b2.x) < a1.x.min(a2.x)
        || a1.y.max(a2.y) < b1.y.min(b2.y) || b1.y.max(b2.y) < a1.y.min(a2.y)
    {
        return SegmentIntersection::None;
    }

    let d1x = (a2.x - a1.x) as i64;
    let d1y = (a2.y - a1.y) as i64;
    let d2x = (b2.x - b1.x) as i64;
    let d2y = (b2.y - b1.y) as i64;
    let ex = (b1.x - a1.x) as i64;
    let ey = (b1.y - a1.y) as i64;
    let denom = d1x * d2y - d1y * d2x;

    if denom == 0 {
        if ex * d1y - ey * d1x != 0 {
            // parallel but not collinear
            return SegmentIntersection::None;
        }
        return overlap_collinear(a1, a2, b1, b2);
    }

    // s along a, t along b; both must land in [0, 1], checked without
    // dividing by comparing numerators against the denominator
    let s_num = ex * d2y - ey * d2x;
    let t_num = ex * d1y - ey * d1x;
    let (s_ok, t_ok) = if denom > 0 {
        (s_num >= 0 && s_num <= denom, t_num >= 0 && t_num <= denom)
    }
    else {
        (s_num <= 0 && s_num >= denom, t_num <= 0 && t_num >= denom)
    };
    if !s_ok || !t_ok {
        return SegmentIntersection::None;
    }

    if s_num == 0 {
        return SegmentIntersection::Point(a1);
    }
    if s_num == denom {
        return SegmentIntersection::Point(a2);
    }
    if t_num == 0 {
        return SegmentIntersection::Point(b1);
    }
    if t_num == denom {
        return SegmentIntersection::Point(b2);
    }

    let s = s_num as f64 / denom as f64;
    let x = (a1.x as f64 + s * d1x as f64).round() as Coord;
    let y = (a1.y as f64 + s * d1y as f64).round() as Coord;
    return SegmentIntersection::Point(Point::new(x, y));
}

fn overlap_collinear(a1: Point, a2: Point, b1: Point, b2: Point) -> SegmentIntersection {
    // all four points are on one line; order them along its dominant axis
    let horizontal = (a2.x - a1.x).abs() >= (a2.y - a1.y).abs();
    let key = |p: Point| if horizontal { p.x } else { p.y };

    let (alo, ahi) = if key(a1) <= key(a2) { (a1, a2) } else { (a2, a1) };
    let (blo, bhi) = if key(b1) <= key(b2) { (b1, b2) } else { (b2, b1) };

    if key(ahi) < key(blo) || key(bhi) < key(alo) {
        return SegmentIntersection::None;
    }

    let lo = if key(alo) >= key(blo) { alo } else { blo };
    let hi = if key(ahi) <= key(bhi) { ahi } else { bhi };
    if lo == hi {
        return SegmentIntersection::Point(lo);
    }
    // report the pair in order along a1 -> a2
    if key(a1) <= key(a2) {
        return SegmentIntersection::Segment(lo, hi);
    }
    else {
        return SegmentIntersection::Segment(hi, lo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: Coord, y: Coord) -> Point {
        return Point::new(x, y);
    }

    #[test]
    fn cross_orientation() {
        assert!(cross(pt(0, 0), pt(10, 0), pt(0, 10)) > 0);
        assert!(cross(pt(0, 0), pt(0, 10), pt(10, 0)) < 0);
        assert_eq!(cross(pt(0, 0), pt(5, 5), pt(10, 10)), 0);
    }

    #[test]
    fn proper_crossing() {
        let got = intersect_segments(pt(0, 0), pt(10, 10), pt(0, 10), pt(10, 0));
        assert_eq!(got, SegmentIntersection::Point(pt(5, 5)));
    }

    #[test]
    fn crossing_rounds_to_grid() {
        // crosses at (4.5, 4.5); must snap to a grid point next to it
        let got = intersect_segments(pt(0, 0), pt(9, 9), pt(0, 9), pt(9, 0));
        match got {
            SegmentIntersection::Point(p) => {
                assert!((p.x - 4).abs() <= 1 && (p.y - 4).abs() <= 1);
            }
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn endpoint_touch() {
        let got = intersect_segments(pt(0, 0), pt(10, 0), pt(10, 0), pt(20, 5));
        assert_eq!(got, SegmentIntersection::Point(pt(10, 0)));
    }

    #[test]
    fn vertex_on_edge_interior() {
        let got = intersect_segments(pt(0, 0), pt(10, 0), pt(4, 0), pt(4, 8));
        assert_eq!(got, SegmentIntersection::Point(pt(4, 0)));
    }

    #[test]
    fn parallel_disjoint() {
        let got = intersect_segments(pt(0, 0), pt(10, 0), pt(0, 5), pt(10, 5));
        assert_eq!(got, SegmentIntersection::None);
    }

    #[test]
    fn collinear_overlap() {
        let got = intersect_segments(pt(0, 0), pt(10, 0), pt(5, 0), pt(20, 0));
        assert_eq!(got, SegmentIntersection::Segment(pt(5, 0), pt(10, 0)));
    }

    #[test]
    fn collinear_touch_is_a_point() {
        let got = intersect_segments(pt(0, 0), pt(10, 0), pt(10, 0), pt(20, 0));
        assert_eq!(got, SegmentIntersection::Point(pt(10, 0)));
    }

    #[test]
    fn collinear_disjoint() {
        let got = intersect_segments(pt(0, 0), pt(10, 0), pt(11, 0), pt(20, 0));
        assert_eq!(got, SegmentIntersection::None);
    }

    #[test]
    fn vertical_collinear_overlap() {
        let got = intersect_segments(pt(3, 0), pt(3, 10), pt(3, 4), pt(3, 25));
        assert_eq!(got, SegmentIntersection::Segment(pt(3, 4), pt(3, 10)));
    }

    #[test]
    fn pseudo_angle_quadrants() {
        let o = pt(0, 0);
        assert_eq!(pseudo_angle(o, pt(10, 0)), 0.0);
        assert_eq!(pseudo_angle(o, pt(0, 10)), 1.0);
        assert_eq!(pseudo_angle(o, pt(-10, 0)), 2.0);
        assert_eq!(pseudo_angle(o, pt(0, -10)), 3.0);
        // monotone within a quadrant
        assert!(pseudo_angle(o, pt(10, 1)) < pseudo_angle(o, pt(10, 9)));
    }

    #[test]
    fn pseudo_angle_equal_for_equal_directions() {
        let o = pt(0, 0);
        assert_eq!(pseudo_angle(o, pt(3, 9)), pseudo_angle(o, pt(1, 3)));
        assert_eq!(pseudo_angle(o, pt(-2, 14)), pseudo_angle(o, pt(-1, 7)));
    }

    #[test]
    fn line_box_prune() {
        let b = BBox::new(pt(10, 10), pt(20, 20));
        assert!(line_crosses_box(pt(0, 0), pt(30, 30), &b));
        assert!(!line_crosses_box(pt(0, 100), pt(100, 100), &b));
    }

    #[test]
    fn edge_box_never_empty() {
        let b = edge_box(pt(0, 5), pt(10, 5));
        assert_eq!(b.min, pt(0, 5));
        assert_eq!(b.max, pt(11, 6));
    }
}
