//! Hole reassignment.  Collection produces a flat pool of contours; the
//! positive ones become islands and every negative one must find the outer
//! contour it nests inside.  Candidates come from an R-tree over the result
//! islands, ranked smallest-area-first with the cost heap so the innermost
//! container wins; a displacement loop re-queues holes that turn out to nest
//! inside a newly placed hole.

use std::collections::VecDeque;

use crate::errors::*;
use crate::heap::CostHeap;
use crate::poly::{Contour, PolyArea, PolySet};
use crate::rtree::{RTree, SearchResult};

fn covers(outer: &crate::geom::BBox, inner: &crate::geom::BBox) -> bool {
    return outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && inner.max.x <= outer.max.x
        && inner.max.y <= outer.max.y;
}

/// Build the result set from a collection pool: islands from the outer
/// contours, then every hole nested into the smallest island that
/// geometrically contains it.  A hole nobody contains means the pool never
/// came from a well-formed result and is an error.
pub(crate) fn assemble(contours: Vec<Contour>) -> Result<PolySet> {
    let mut set = PolySet::new();
    let mut queue: VecDeque<Contour> = VecDeque::new();
    for contour in contours {
        if contour.is_outer() {
            set.islands.push(PolyArea::new(contour));
        }
        else {
            queue.push_back(contour);
        }
    }

    // index the islands by their outer bounds
    let mut island_tree = RTree::new();
    for (i, island) in set.islands.iter().enumerate() {
        island_tree.insert(island.bbox(), i as u32);
    }

    while let Some(hole) = queue.pop_front() {
        let head_point = hole.point(hole.head());

        // candidate containers, innermost (smallest outer) first
        let mut heap = CostHeap::new();
        island_tree.search(
            Some(&hole.bbox),
            |node_bounds| !covers(node_bounds, &hole.bbox),
            |bounds, owner| {
                if !covers(bounds, &hole.bbox) {
                    return SearchResult::Miss;
                }
                heap.push(set.islands[owner as usize].outer().area, owner);
                return SearchResult::Hit;
            },
        );

        let mut home = None;
        while let Some((_, owner)) = heap.pop() {
            if set.islands[owner as usize].outer().contains_point(head_point) {
                home = Some(owner);
                break;
            }
        }
        let home = match home {
            Some(owner) => owner as usize,
            None => return Err(ErrorKind::OrphanHole.into()),
        };

        // a hole already in this island may nest inside the new hole; kick
        // it back into the queue so it can find the island that actually
        // surrounds it
        let island = &set.islands[home];
        let mut displaced: Vec<u32> = Vec::new();
        island.tree().search(Some(&hole.bbox), |_| false, |_, ci| {
            if ci == 0 {
                return SearchResult::Miss;
            }
            let sibling = &island.contours()[ci as usize];
            if sibling.len() == 0 {
                return SearchResult::Miss;
            }
            if covers(&hole.bbox, &sibling.bbox)
                && hole.contains_point(sibling.point(sibling.head()))
            {
                displaced.push(ci);
                return SearchResult::Hit;
            }
            return SearchResult::Miss;
        });
        for ci in displaced {
            queue.push_back(set.islands[home].take_hole(ci));
        }

        set.islands[home].push_contour(hole);
    }

    for island in set.islands.iter_mut() {
        island.drop_tombstones();
    }
    return Ok(set);
}
