//! The polygon data model: vertices in circular index arenas, contours
//! ("plines"), polygon areas (outer plus holes), and polygon sets (disjoint
//! islands forming one operand or one result).  No boolean algorithms here,
//! just the invariants, construction, containment and validity checks.

use bitflags::bitflags;

use crate::geom::{cross, edge_box, BBox, Point, SegmentIntersection};
use crate::geom;
use crate::heap::CostHeap;
use crate::rtree::{RTree, SearchResult};

bitflags! {
    pub struct VertFlags: u8 {
        /// the edge leaving this vertex was already emitted into a result
        const MARK = 0b0001;
        /// this vertex is a genuine intersection point of the two operands
        const CROSS = 0b0010;
    }
}

/// Classification of the edge leaving a vertex, relative to the other
/// operand.  SHARED means coincident with one of the other operand's edges
/// in the same direction; SHARED2 the same but opposite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    Unknown,
    Inside,
    Outside,
    Shared,
    Shared2,
}

/// Whole-contour status, set by the intersection and labeling passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContourStatus {
    Unknown,
    /// crossed (or touched) by the other operand somewhere
    Isected,
    /// untouched and wholly inside the other operand
    Inside,
    /// untouched and wholly outside the other operand
    Outside,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    B,
}

impl Operand {
    pub fn other(self) -> Operand {
        return match self {
            Operand::A => Operand::B,
            Operand::B => Operand::A,
        };
    }
}

/// Index-based weak reference to a vertex of either operand; also names the
/// edge leaving that vertex.  Never dangles as long as the operation keeps
/// both operand sets alive, which the orchestrator does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertRef {
    pub operand: Operand,
    pub island: u32,
    pub contour: u32,
    pub vert: u32,
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub p: Point,
    pub next: u32,
    pub prev: u32,
    pub label: Label,
    pub flags: VertFlags,
    /// coincident edge on the other operand, for SHARED / SHARED2 edges
    pub shared: Option<VertRef>,
    /// entries in the labeling pass's CVC arena; present only while this is
    /// a cross vertex inside an operation
    pub cvc_prev: Option<u32>,
    pub cvc_next: Option<u32>,
}

impl Vertex {
    fn new(p: Point) -> Self {
        return Vertex {
            p,
            next: 0,
            prev: 0,
            label: Label::Unknown,
            flags: VertFlags::empty(),
            shared: None,
            cvc_prev: None,
            cvc_next: None,
        };
    }
}

// -----------------------------------------------------------------------------
// contour

/// A single closed simple polygon boundary: an outer boundary (positive
/// area, counterclockwise) or a hole (negative area).  Vertices live in an
/// arena and chain circularly through `next`/`prev` indices, so inserting a
/// vertex mid-edge is O(1) and nothing ever dangles.
#[derive(Clone)]
pub struct Contour {
    verts: Vec<Vertex>,
    head: u32,
    pub bbox: BBox,
    pub area: f64,
    pub status: ContourStatus,
    tree: RTree,
}

impl Contour {
    /// Build a contour from a point sequence, dropping consecutive
    /// duplicates (and a duplicated closing point).  The point order decides
    /// the orientation: counterclockwise (positive area) is an outer
    /// boundary, clockwise a hole.
    pub fn from_points(points: &[Point]) -> Contour {
        let mut clean: Vec<Point> = Vec::with_capacity(points.len());
        for &p in points.iter() {
            if clean.last() != Some(&p) {
                clean.push(p);
            }
        }
        while clean.len() > 1 && clean.first() == clean.last() {
            clean.pop();
        }

        let n = clean.len();
        let mut verts: Vec<Vertex> = clean.into_iter().map(Vertex::new).collect();
        for i in 0..n {
            verts[i].next = ((i + 1) % n) as u32;
            verts[i].prev = ((i + n - 1) % n) as u32;
        }

        let mut contour = Contour {
            verts,
            head: 0,
            bbox: BBox::zero(),
            area: 0.0,
            status: ContourStatus::Unknown,
            tree: RTree::new(),
        };
        contour.recompute();
        return contour;
    }

    pub fn len(&self) -> usize {
        return self.verts.len();
    }

    pub fn head(&self) -> u32 {
        return self.head;
    }

    pub fn is_outer(&self) -> bool {
        return self.area > 0.0;
    }

    pub fn vert(&self, i: u32) -> &Vertex {
        return &self.verts[i as usize];
    }

    pub(crate) fn vert_mut(&mut self, i: u32) -> &mut Vertex {
        return &mut self.verts[i as usize];
    }

    pub fn point(&self, i: u32) -> Point {
        return self.verts[i as usize].p;
    }

    pub(crate) fn tree(&self) -> &RTree {
        return &self.tree;
    }

    /// The boundary points in traversal order, starting at the head vertex.
    pub fn points(&self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.verts.len());
        if self.verts.is_empty() {
            return out;
        }
        let mut i = self.head;
        loop {
            out.push(self.verts[i as usize].p);
            i = self.verts[i as usize].next;
            if i == self.head {
                break;
            }
        }
        return out;
    }

    /// Signed area, bounding box and the per-edge spatial index, all from
    /// scratch.  Called at construction and after any bulk mutation.
    fn recompute(&mut self) {
        let pts = self.points();
        let mut doubled: i128 = 0;
        for i in 0..pts.len() {
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            doubled += (a.x as i128) * (b.y as i128) - (b.x as i128) * (a.y as i128);
        }
        self.area = doubled as f64 / 2.0;

        if pts.is_empty() {
            self.bbox = BBox::zero();
        }
        else {
            let mut min = pts[0];
            let mut max = pts[0];
            for &p in pts.iter() {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
            // half-open, so the box is never empty
            self.bbox = BBox::new(min, Point::new(max.x + 1, max.y + 1));
        }

        self.rebuild_tree();
    }

    /// Rebuild the per-edge index.  Each record's owner is the index of the
    /// edge's base vertex.
    pub(crate) fn rebuild_tree(&mut self) {
        self.tree = RTree::new();
        for i in 0..self.verts.len() {
            let a = self.verts[i].p;
            let b = self.verts[self.verts[i].next as usize].p;
            self.tree.insert(edge_box(a, b), i as u32);
        }
    }

    /// Splice a new vertex into the edge leaving `at`, keeping the count,
    /// bounding box and edge index current (the old edge's box is split into
    /// two).  Returns the new vertex's index.
    pub(crate) fn insert_after(&mut self, at: u32, p: Point) -> u32 {
        let next = self.verts[at as usize].next;
        let a = self.verts[at as usize].p;
        let b = self.verts[next as usize].p;
        debug_assert!(p != a && p != b);

        let idx = self.verts.len() as u32;
        let mut v = Vertex::new(p);
        v.prev = at;
        v.next = next;
        self.verts.push(v);
        self.verts[at as usize].next = idx;
        self.verts[next as usize].prev = idx;

        self.tree.remove(edge_box(a, b), at);
        self.tree.insert(edge_box(a, p), at);
        self.tree.insert(edge_box(p, b), idx);

        let grown = BBox::new(p, Point::new(p.x + 1, p.y + 1));
        self.bbox = self.bbox.union(&grown);
        return idx;
    }

    /// Flip the orientation: a hole becomes an outer boundary and vice
    /// versa.  Edge ownership moves to the other endpoint, so the edge index
    /// is rebuilt.
    pub(crate) fn invert(&mut self) {
        for v in self.verts.iter_mut() {
            std::mem::swap(&mut v.next, &mut v.prev);
        }
        self.area = -self.area;
        self.rebuild_tree();
    }

    /// Clear everything an operation scribbled on the vertices.
    pub(crate) fn reset_marks(&mut self) {
        for v in self.verts.iter_mut() {
            v.label = Label::Unknown;
            v.flags = VertFlags::empty();
            v.shared = None;
            v.cvc_prev = None;
            v.cvc_next = None;
        }
        self.status = ContourStatus::Unknown;
    }

    /// Find the vertex at exactly this point, if any, via the edge index.
    pub fn find_vertex_at(&self, p: Point) -> Option<u32> {
        let probe = BBox::new(p, Point::new(p.x + 1, p.y + 1));
        let mut found = None;
        self.tree.search(Some(&probe), |_| false, |_, owner| {
            let v = &self.verts[owner as usize];
            if v.p == p {
                found = Some(owner);
                return SearchResult::Stop;
            }
            let next = v.next;
            if self.verts[next as usize].p == p {
                found = Some(next);
                return SearchResult::Stop;
            }
            return SearchResult::Miss;
        });
        return found;
    }

    /// Crossing-number point-in-polygon test.  Points exactly on the
    /// boundary give an arbitrary answer; the passes arrange never to ask
    /// about those.
    pub fn contains_point(&self, p: Point) -> bool {
        if !self.bbox.contains(p) {
            return false;
        }
        let mut inside = false;
        for i in 0..self.verts.len() {
            let a = self.verts[i].p;
            let b = self.verts[self.verts[i].next as usize].p;
            if (a.y > p.y) != (b.y > p.y) {
                let s = cross(a, b, p);
                if b.y > a.y {
                    if s > 0 {
                        inside = !inside;
                    }
                }
                else if s < 0 {
                    inside = !inside;
                }
            }
        }
        return inside;
    }

    /// No edge of this contour crosses another except where consecutive
    /// edges meet at their shared vertex.
    pub fn is_simple(&self) -> bool {
        if self.verts.len() < 3 {
            return false;
        }
        for i in 0..self.verts.len() as u32 {
            let a1 = self.verts[i as usize].p;
            let a2 = self.verts[self.verts[i as usize].next as usize].p;
            let mut ok = true;
            self.tree.search(Some(&edge_box(a1, a2)), |_| false, |_, owner| {
                if owner <= i {
                    // each pair once
                    return SearchResult::Miss;
                }
                let b1 = self.verts[owner as usize].p;
                let b2 = self.verts[self.verts[owner as usize].next as usize].p;
                let joint = if self.verts[i as usize].next == owner {
                    Some(a2)
                }
                else if self.verts[owner as usize].next == i {
                    Some(a1)
                }
                else {
                    None
                };
                match geom::intersect_segments(a1, a2, b1, b2) {
                    SegmentIntersection::None => SearchResult::Miss,
                    SegmentIntersection::Point(p) => {
                        if joint == Some(p) {
                            return SearchResult::Miss;
                        }
                        ok = false;
                        return SearchResult::Stop;
                    }
                    SegmentIntersection::Segment(..) => {
                        ok = false;
                        return SearchResult::Stop;
                    }
                }
            });
            if !ok {
                return false;
            }
        }
        return true;
    }
}

// -----------------------------------------------------------------------------
// polygon area

/// One outer contour plus any number of holes, with a spatial index over its
/// own contours for containment queries.  Owns its contours and the index;
/// dropping the area drops both.
#[derive(Clone)]
pub struct PolyArea {
    contours: Vec<Contour>,
    tree: RTree,
}

impl PolyArea {
    pub fn new(outer: Contour) -> PolyArea {
        let mut area = PolyArea {
            contours: Vec::new(),
            tree: RTree::new(),
        };
        area.push_contour(outer);
        return area;
    }

    /// Build from a point list per contour: the first is the outer boundary,
    /// the rest are holes.  Orientation is taken from each point order.
    pub fn from_contours(point_lists: &[Vec<Point>]) -> Option<PolyArea> {
        let mut lists = point_lists.iter();
        let outer = Contour::from_points(lists.next()?);
        let mut area = PolyArea::new(outer);
        for list in lists {
            area.push_contour(Contour::from_points(list));
        }
        return Some(area);
    }

    pub fn outer(&self) -> &Contour {
        return &self.contours[0];
    }

    pub fn contours(&self) -> &[Contour] {
        return &self.contours;
    }

    pub(crate) fn contour_mut(&mut self, i: u32) -> &mut Contour {
        return &mut self.contours[i as usize];
    }

    pub(crate) fn tree(&self) -> &RTree {
        return &self.tree;
    }

    pub fn bbox(&self) -> BBox {
        return self.contours[0].bbox;
    }

    pub(crate) fn push_contour(&mut self, contour: Contour) {
        self.tree.insert(contour.bbox, self.contours.len() as u32);
        self.contours.push(contour);
    }

    /// Detach the hole at `i` (never the outer), leaving a tombstone so the
    /// sibling contours keep their indices.  The index entry is removed.
    pub(crate) fn take_hole(&mut self, i: u32) -> Contour {
        assert!(i > 0);
        let hole = std::mem::replace(
            &mut self.contours[i as usize],
            Contour::from_points(&[]),
        );
        self.tree.remove(hole.bbox, i);
        return hole;
    }

    pub(crate) fn drop_tombstones(&mut self) {
        if !self.contours.iter().any(|c| c.verts.is_empty()) {
            return;
        }
        let contours = std::mem::replace(&mut self.contours, Vec::new());
        self.tree = RTree::new();
        for c in contours {
            if !c.verts.is_empty() {
                self.push_contour(c);
            }
        }
    }

    /// Outer positive and simple, holes negative, simple, and inside the
    /// outer boundary.
    pub fn valid(&self) -> bool {
        if self.contours.is_empty() {
            return false;
        }
        let outer = &self.contours[0];
        if !outer.is_outer() || !outer.is_simple() {
            return false;
        }
        for hole in self.contours.iter().skip(1) {
            if hole.is_outer() || !hole.is_simple() {
                return false;
            }
            let inside = hole.bbox.min.x >= outer.bbox.min.x
                && hole.bbox.min.y >= outer.bbox.min.y
                && hole.bbox.max.x <= outer.bbox.max.x
                && hole.bbox.max.y <= outer.bbox.max.y
                && outer.contains_point(hole.point(hole.head()));
            if !inside {
                return false;
            }
        }
        return true;
    }
}

// -----------------------------------------------------------------------------
// polygon set

/// A whole operand or result: zero or more disjoint polygon areas.  Stands
/// in for a circular ring of sibling islands; a Vec is all the ring was
/// ever walked for.
#[derive(Clone, Default)]
pub struct PolySet {
    pub islands: Vec<PolyArea>,
}

impl PolySet {
    pub fn new() -> PolySet {
        return PolySet { islands: Vec::new() };
    }

    pub fn from_island(island: PolyArea) -> PolySet {
        return PolySet { islands: vec![island] };
    }

    pub fn is_empty(&self) -> bool {
        return self.islands.is_empty();
    }

    pub fn bbox(&self) -> Option<BBox> {
        let mut iter = self.islands.iter();
        let first = iter.next()?.bbox();
        return Some(iter.fold(first, |acc, island| acc.union(&island.bbox())));
    }

    /// Net signed area: outer boundaries count positive, holes negative.
    pub fn area(&self) -> f64 {
        return self
            .islands
            .iter()
            .flat_map(|island| island.contours.iter())
            .map(|c| c.area)
            .sum();
    }

    /// Is the point in the set's material?  The deciding contour is the
    /// smallest-area contour containing the point (found through each
    /// island's contour index, ranked by the cost heap): an outer boundary
    /// means yes, a hole means no.
    pub fn contains_point(&self, p: Point) -> bool {
        let probe = BBox::new(p, Point::new(p.x + 1, p.y + 1));
        let mut heap = CostHeap::new();
        let mut candidates: Vec<(u32, u32)> = Vec::new();
        for (ii, island) in self.islands.iter().enumerate() {
            if !island.bbox().contains(p) {
                continue;
            }
            island.tree.search(Some(&probe), |_| false, |_, owner| {
                let contour = &island.contours[owner as usize];
                if contour.verts.is_empty() {
                    return SearchResult::Miss;
                }
                heap.push(contour.area.abs(), candidates.len() as u32);
                candidates.push((ii as u32, owner));
                return SearchResult::Hit;
            });
        }
        while let Some((_, idx)) = heap.pop() {
            let (ii, ci) = candidates[idx as usize];
            let contour = &self.islands[ii as usize].contours[ci as usize];
            if contour.contains_point(p) {
                return contour.is_outer();
            }
        }
        return false;
    }

    /// Boundary validity: every island is well formed.  Islands are assumed
    /// disjoint (the boolean operations only ever produce disjoint ones).
    pub fn valid(&self) -> bool {
        return self.islands.iter().all(|island| island.valid());
    }

    pub(crate) fn reset_marks(&mut self) {
        for island in self.islands.iter_mut() {
            for contour in island.contours.iter_mut() {
                contour.reset_marks();
            }
        }
    }

    /// Forget only the emitted-edge bits, keeping labels, cross flags and
    /// CVC links; used between the two collections of a combined
    /// intersect-and-subtract run.
    pub(crate) fn clear_marks(&mut self) {
        for island in self.islands.iter_mut() {
            for contour in island.contours.iter_mut() {
                for i in 0..contour.len() as u32 {
                    contour.vert_mut(i).flags.remove(VertFlags::MARK);
                }
            }
        }
    }
}
