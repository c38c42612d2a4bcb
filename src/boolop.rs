//! The public boolean-operation entry points.  Each one sequences the same
//! passes (intersect, build CVC, label both ways, collect crossed contours,
//! dispatch settled contours, reassign holes) and differs only in the rule
//! tables and in ownership: the `_free` variants consume their operands, the
//! move standing in for the transfer-of-ownership contract, while the others
//! copy.

use crate::collect::{collect_isected, collect_settled};
use crate::errors::*;
use crate::holes::assemble;
use crate::intersect::{intersect_sets, sets_touch};
use crate::label::{build_cvc, label_set};
use crate::poly::{Operand, PolySet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    /// everything in either operand
    Union,
    /// everything in both operands
    Isect,
    /// everything in the first operand but not the second
    Sub,
    /// everything in exactly one operand
    Xor,
}

/// Non-destructive boolean: both operands are copied before the passes run.
pub fn boolean(a: &PolySet, b: &PolySet, op: BoolOp) -> Result<PolySet> {
    return boolean_free(a.clone(), b.clone(), op);
}

/// Consuming boolean: both operands are spent, even on error.
pub fn boolean_free(mut a: PolySet, mut b: PolySet, op: BoolOp) -> Result<PolySet> {
    check_operand(&a, "first operand")?;
    check_operand(&b, "second operand")?;
    a.reset_marks();
    b.reset_marks();

    if let Some(result) = trivial_case(&mut a, &mut b, op) {
        debug_assert!(result.valid());
        return Ok(result);
    }

    intersect_sets(&mut a, &mut b, false);
    let cvc = build_cvc(&mut a, &mut b);
    label_set(&mut a, &b, &cvc);
    label_set(&mut b, &a, &cvc);

    let mut pool = Vec::new();
    collect_isected(&mut a, &mut b, &cvc, op, &mut pool);
    collect_settled(&a, Operand::A, op, &mut pool);
    collect_settled(&b, Operand::B, op, &mut pool);

    let result = assemble(pool)?;
    debug_assert!(result.valid());
    return Ok(result);
}

/// Compute `a AND b` and `a SUB b` from one intersection-and-labeling pass,
/// consuming both operands.  The emitted-edge marks are swept clean between
/// the two collections; labels and connectivity are shared.
pub fn and_subtract_free(mut a: PolySet, mut b: PolySet) -> Result<(PolySet, PolySet)> {
    check_operand(&a, "first operand")?;
    check_operand(&b, "second operand")?;
    a.reset_marks();
    b.reset_marks();

    if a.is_empty() || b.is_empty() || disjoint(&a, &b) {
        // nothing in common: the intersection is empty, the difference is a
        return Ok((PolySet::new(), a));
    }

    intersect_sets(&mut a, &mut b, false);
    let cvc = build_cvc(&mut a, &mut b);
    label_set(&mut a, &b, &cvc);
    label_set(&mut b, &a, &cvc);

    let mut isect_pool = Vec::new();
    collect_isected(&mut a, &mut b, &cvc, BoolOp::Isect, &mut isect_pool);
    collect_settled(&a, Operand::A, BoolOp::Isect, &mut isect_pool);
    collect_settled(&b, Operand::B, BoolOp::Isect, &mut isect_pool);

    a.clear_marks();
    b.clear_marks();

    let mut sub_pool = Vec::new();
    collect_isected(&mut a, &mut b, &cvc, BoolOp::Sub, &mut sub_pool);
    collect_settled(&a, Operand::A, BoolOp::Sub, &mut sub_pool);
    collect_settled(&b, Operand::B, BoolOp::Sub, &mut sub_pool);

    let isect = assemble(isect_pool)?;
    let sub = assemble(sub_pool)?;
    debug_assert!(isect.valid() && sub.valid());
    return Ok((isect, sub));
}

/// Do the two sets touch?  True on any boundary contact (a single shared
/// point is enough) and also when one set sits wholly inside the other:
/// the callers are connectivity checks, and containment connects.
/// Non-destructive and short-circuiting.
pub fn touching(a: &PolySet, b: &PolySet) -> Result<bool> {
    check_operand(a, "first operand")?;
    check_operand(b, "second operand")?;
    if a.is_empty() || b.is_empty() || disjoint(a, b) {
        return Ok(false);
    }
    if sets_touch(a, b) {
        return Ok(true);
    }
    // no boundary contact: containment still counts, and with no contact
    // every island is strictly inside or strictly outside, so one point of
    // each outer decides
    for island in a.islands.iter() {
        let head = island.outer().point(island.outer().head());
        if b.contains_point(head) {
            return Ok(true);
        }
    }
    for island in b.islands.iter() {
        let head = island.outer().point(island.outer().head());
        if a.contains_point(head) {
            return Ok(true);
        }
    }
    return Ok(false);
}

/// Shape sanity shared by every entry point: an island's first contour must
/// be an outer boundary.  Deeper validity (simplicity, hole nesting) is the
/// caller's contract, checkable through `PolySet::valid`.
fn check_operand(set: &PolySet, which: &'static str) -> Result<()> {
    for island in set.islands.iter() {
        if island.contours().is_empty() || !island.outer().is_outer() {
            return Err(ErrorKind::BadInput(which).into());
        }
    }
    return Ok(());
}

fn disjoint(a: &PolySet, b: &PolySet) -> bool {
    return match (a.bbox(), b.bbox()) {
        (Some(ba), Some(bb)) => !ba.intersects(&bb),
        _ => true,
    };
}

/// Answers that need no passes at all: an empty operand, or bounding boxes
/// that never meet.
fn trivial_case(a: &mut PolySet, b: &mut PolySet, op: BoolOp) -> Option<PolySet> {
    if a.is_empty() || b.is_empty() || disjoint(a, b) {
        let result = match op {
            BoolOp::Union | BoolOp::Xor => {
                let mut merged = std::mem::replace(a, PolySet::new());
                merged.islands.append(&mut b.islands);
                merged
            }
            BoolOp::Isect => PolySet::new(),
            BoolOp::Sub => std::mem::replace(a, PolySet::new()),
        };
        return Some(result);
    }
    return None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Coord, Point};
    use crate::poly::PolyArea;

    fn pt(x: Coord, y: Coord) -> Point {
        return Point::new(x, y);
    }

    fn square_set(x: Coord, y: Coord, side: Coord) -> PolySet {
        let points = vec![
            pt(x, y),
            pt(x + side, y),
            pt(x + side, y + side),
            pt(x, y + side),
        ];
        return PolySet::from_island(PolyArea::from_contours(&[points]).unwrap());
    }

    #[test]
    fn empty_operand_trivia() {
        let a = square_set(0, 0, 10);
        let empty = PolySet::new();

        let union = boolean(&a, &empty, BoolOp::Union).unwrap();
        assert_eq!(union.area(), 100.0);
        let isect = boolean(&a, &empty, BoolOp::Isect).unwrap();
        assert!(isect.is_empty());
        let sub = boolean(&a, &empty, BoolOp::Sub).unwrap();
        assert_eq!(sub.area(), 100.0);
        let sub = boolean(&empty, &a, BoolOp::Sub).unwrap();
        assert!(sub.is_empty());
        let xor = boolean(&empty, &a, BoolOp::Xor).unwrap();
        assert_eq!(xor.area(), 100.0);
    }

    #[test]
    fn disjoint_union_keeps_both_islands() {
        let result = boolean(&square_set(0, 0, 10), &square_set(20, 20, 10), BoolOp::Union).unwrap();
        assert_eq!(result.islands.len(), 2);
        assert_eq!(result.area(), 200.0);
        assert!(result.valid());
    }

    #[test]
    fn boolean_is_non_destructive() {
        let a = square_set(0, 0, 10);
        let b = square_set(5, 5, 10);
        let _ = boolean(&a, &b, BoolOp::Union).unwrap();
        // operands unchanged
        assert_eq!(a.islands[0].contours()[0].len(), 4);
        assert_eq!(b.islands[0].contours()[0].len(), 4);
    }

    #[test]
    fn and_subtract_matches_the_single_ops() {
        let a = square_set(0, 0, 10);
        let b = square_set(5, 5, 10);
        let (isect, sub) = and_subtract_free(a.clone(), b.clone()).unwrap();
        assert_eq!(isect.area(), boolean(&a, &b, BoolOp::Isect).unwrap().area());
        assert_eq!(sub.area(), boolean(&a, &b, BoolOp::Sub).unwrap().area());
    }

    #[test]
    fn touch_by_corner_edge_and_distance() {
        let a = square_set(0, 0, 10);
        assert_eq!(touching(&a, &square_set(10, 10, 10)).unwrap(), true);
        assert_eq!(touching(&a, &square_set(10, 0, 10)).unwrap(), true);
        assert_eq!(touching(&a, &square_set(11, 0, 10)).unwrap(), false);
        assert_eq!(touching(&a, &square_set(5, 5, 10)).unwrap(), true);
    }

    #[test]
    fn containment_counts_as_touching() {
        let a = square_set(0, 0, 30);
        let b = square_set(10, 10, 5);
        assert_eq!(touching(&a, &b).unwrap(), true);
        assert_eq!(touching(&b, &a).unwrap(), true);
    }

    #[test]
    fn backwards_island_is_rejected() {
        // an island whose first contour winds like a hole
        let backwards = PolySet::from_island(PolyArea::from_contours(&[vec![
            pt(0, 0),
            pt(0, 10),
            pt(10, 10),
            pt(10, 0),
        ]])
        .unwrap());
        let b = square_set(0, 0, 4);
        assert!(boolean(&backwards, &b, BoolOp::Union).is_err());
        assert!(touching(&backwards, &b).is_err());
    }
}
