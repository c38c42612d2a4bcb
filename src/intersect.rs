//! The snap-rounding intersection pass: find every point where an edge of
//! one operand crosses (or touches) an edge of the other, insert vertices at
//! those points, and flag them as cross vertices.  Inserting a vertex can
//! change which pairs intersect once coordinates round to the grid, so the
//! whole pass re-runs until a sweep comes up empty.

use std::collections::HashMap;

use crate::geom::{edge_box, intersect_segments, line_crosses_box, Point, SegmentIntersection};
use crate::poly::{ContourStatus, Operand, PolySet, VertFlags};
use crate::rtree::SearchResult;

/// One pending vertex insertion (or cross-flagging, if a vertex already
/// sits at the point): contour address, the edge's base vertex as it was
/// during the sweep, and the snapped intersection point.
#[derive(Clone, Copy, Debug)]
struct Task {
    side: Operand,
    island: u32,
    contour: u32,
    edge: u32,
    p: Point,
}

/// Run the intersection pass over two operand sets until no sweep inserts
/// anything.  Returns true if the operands intersect or touch anywhere.
/// With `stop_on_first` the function returns as soon as any intersection is
/// known, leaving the operands only partially processed; callers use that
/// purely as an existence test on scratch copies.
pub(crate) fn intersect_sets(a: &mut PolySet, b: &mut PolySet, stop_on_first: bool) -> bool {
    let mut found_any = false;
    loop {
        let mut tasks: Vec<Task> = Vec::new();

        for (ia, island_a) in a.islands.iter().enumerate() {
            for (ib, island_b) in b.islands.iter().enumerate() {
                if !island_a.bbox().intersects(&island_b.bbox()) {
                    continue;
                }
                // pick contour pairs through the island's contour index
                for (ca, contour_a) in island_a.contours().iter().enumerate() {
                    island_b.tree().search(Some(&contour_a.bbox), |_| false, |_, cb| {
                        let contour_b = &island_b.contours()[cb as usize];
                        sweep_pair(
                            contour_a,
                            (ia as u32, ca as u32),
                            contour_b,
                            (ib as u32, cb),
                            &mut tasks,
                        );
                        return SearchResult::Hit;
                    });
                    if stop_on_first && !tasks.is_empty() {
                        return true;
                    }
                }
            }
        }

        if !tasks.is_empty() {
            found_any = true;
        }
        let inserted = apply_tasks(a, b, tasks);
        if inserted == 0 {
            break;
        }
    }
    return found_any;
}

/// Pure existence test: do the two sets' boundaries meet anywhere?  Runs
/// the same sweep as the full pass but stops at the first hit and never
/// mutates anything.
pub(crate) fn sets_touch(a: &PolySet, b: &PolySet) -> bool {
    let mut tasks: Vec<Task> = Vec::new();
    for island_a in a.islands.iter() {
        for island_b in b.islands.iter() {
            if !island_a.bbox().intersects(&island_b.bbox()) {
                continue;
            }
            for (ca, contour_a) in island_a.contours().iter().enumerate() {
                island_b.tree().search(Some(&contour_a.bbox), |_| false, |_, cb| {
                    let contour_b = &island_b.contours()[cb as usize];
                    sweep_pair(contour_a, (0, ca as u32), contour_b, (0, cb), &mut tasks);
                    if tasks.is_empty() {
                        return SearchResult::Miss;
                    }
                    return SearchResult::Stop;
                });
                if !tasks.is_empty() {
                    return true;
                }
            }
        }
    }
    return false;
}

/// Sweep one contour pair: the contour with fewer vertices drives, every
/// one of its edges is checked against the other contour's edge index.
/// Subtrees whose bounds lie entirely on one side of the driving edge's
/// supporting line are pruned.
fn sweep_pair(
    contour_a: &crate::poly::Contour,
    at_a: (u32, u32),
    contour_b: &crate::poly::Contour,
    at_b: (u32, u32),
    tasks: &mut Vec<Task>,
) {
    if !contour_a.bbox.intersects(&contour_b.bbox) {
        return;
    }
    let (driver, driver_at, driver_side, target, target_at, target_side) =
        if contour_a.len() <= contour_b.len() {
            (contour_a, at_a, Operand::A, contour_b, at_b, Operand::B)
        }
        else {
            (contour_b, at_b, Operand::B, contour_a, at_a, Operand::A)
        };

    for i in 0..driver.len() as u32 {
        let a1 = driver.point(i);
        let a2 = driver.point(driver.vert(i).next);
        let query = edge_box(a1, a2);
        target.tree().search(
            Some(&query),
            |node_bounds| !line_crosses_box(a1, a2, node_bounds),
            |_, j| {
                let b1 = target.point(j);
                let b2 = target.point(target.vert(j).next);
                let mut push = |p: Point| {
                    tasks.push(Task {
                        side: driver_side,
                        island: driver_at.0,
                        contour: driver_at.1,
                        edge: i,
                        p,
                    });
                    tasks.push(Task {
                        side: target_side,
                        island: target_at.0,
                        contour: target_at.1,
                        edge: j,
                        p,
                    });
                };
                match intersect_segments(a1, a2, b1, b2) {
                    SegmentIntersection::None => return SearchResult::Miss,
                    SegmentIntersection::Point(p) => {
                        push(p);
                    }
                    SegmentIntersection::Segment(p, q) => {
                        // collinear overlap: both boundary points of the
                        // shared span become cross vertices
                        push(p);
                        push(q);
                    }
                }
                return SearchResult::Hit;
            },
        );
    }
}

/// Apply a sweep's pending insertions in one batch.  Tasks are grouped per
/// original edge and applied in order along the edge, so several hits on one
/// edge splice correctly.  Returns the number of vertices actually inserted
/// (pure touches flag an existing vertex instead).
fn apply_tasks(a: &mut PolySet, b: &mut PolySet, tasks: Vec<Task>) -> usize {
    let mut per_edge: HashMap<(Operand, u32, u32, u32), Vec<Point>> = HashMap::new();
    for task in tasks {
        per_edge
            .entry((task.side, task.island, task.contour, task.edge))
            .or_insert_with(Vec::new)
            .push(task.p);
    }

    let mut inserted = 0;
    for ((side, island, contour, edge), mut points) in per_edge {
        let set = match side {
            Operand::A => &mut *a,
            Operand::B => &mut *b,
        };
        let contour = set.islands[island as usize].contour_mut(contour);
        contour.status = ContourStatus::Isected;

        let base_point = contour.point(edge);
        let end = contour.vert(edge).next;
        let end_point = contour.point(end);

        // order along the edge, drop duplicates
        points.sort_by_key(|&p| crate::geom::dot(base_point, end_point, p));
        points.dedup();

        let mut cur = edge;
        for p in points {
            if p == base_point {
                contour.vert_mut(edge).flags.insert(VertFlags::CROSS);
            }
            else if p == end_point {
                contour.vert_mut(end).flags.insert(VertFlags::CROSS);
            }
            else {
                let fresh = contour.insert_after(cur, p);
                contour.vert_mut(fresh).flags.insert(VertFlags::CROSS);
                inserted += 1;
                cur = fresh;
            }
        }
    }
    return inserted;
}
