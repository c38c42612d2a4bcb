//! Cross-vertex connectivity and edge labeling.  At every point where the
//! two operands genuinely meet, every incident edge (from either operand)
//! gets an entry in a circular ring sorted by pseudo-angle; those rings are
//! what decide whether each edge runs inside, outside, or along the other
//! operand.
//!
//! The case analysis in `node_label` and the equal-angle tie-breaks in the
//! ring ordering are load-bearing: the collection rules consume these exact
//! five labels, and the shared/shared2 cases only work because a coincident
//! other-operand entry always sorts ring-adjacent to the edge it shadows.

use std::collections::HashMap;

use crate::geom::{pseudo_angle, Coord};
use crate::poly::{ContourStatus, Label, Operand, PolySet, VertFlags, VertRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    /// entry for the edge arriving at the vertex (towards `prev`)
    Prev,
    /// entry for the edge leaving the vertex (towards `next`)
    Next,
}

pub(crate) struct CvcEntry {
    pub vert: VertRef,
    pub side: Side,
    pub angle: f64,
    /// the vertex owning the edge this entry stands for: the vertex itself
    /// for Next entries, its predecessor for Prev entries
    pub edge_owner: VertRef,
    pub prev: u32,
    pub next: u32,
}

/// The arena of CVC entries for one whole operation.  Vertices point into it
/// through `cvc_prev`/`cvc_next`; it outlives labeling and collection, then
/// drops with the operation.
pub(crate) struct Cvc {
    pub entries: Vec<CvcEntry>,
}

impl Cvc {
    pub fn entry(&self, i: u32) -> &CvcEntry {
        return &self.entries[i as usize];
    }
}

/// Build the CVC rings for every cross vertex of both operands and hang the
/// entry indices off the vertices.
pub(crate) fn build_cvc(a: &mut PolySet, b: &mut PolySet) -> Cvc {
    let mut entries: Vec<CvcEntry> = Vec::new();
    let mut rings: HashMap<(Coord, Coord), Vec<u32>> = HashMap::new();

    {
        let mut scan = |operand: Operand, set: &PolySet| {
            for (ii, island) in set.islands.iter().enumerate() {
                for (ci, contour) in island.contours().iter().enumerate() {
                    if contour.status != ContourStatus::Isected {
                        continue;
                    }
                    for vi in 0..contour.len() as u32 {
                        let v = contour.vert(vi);
                        if !v.flags.contains(VertFlags::CROSS) {
                            continue;
                        }
                        let here = VertRef {
                            operand,
                            island: ii as u32,
                            contour: ci as u32,
                            vert: vi,
                        };
                        let ring = rings.entry((v.p.x, v.p.y)).or_insert_with(Vec::new);

                        let prev_at = VertRef { vert: v.prev, ..here };
                        ring.push(entries.len() as u32);
                        entries.push(CvcEntry {
                            vert: here,
                            side: Side::Prev,
                            angle: pseudo_angle(v.p, contour.point(v.prev)),
                            edge_owner: prev_at,
                            prev: 0,
                            next: 0,
                        });
                        ring.push(entries.len() as u32);
                        entries.push(CvcEntry {
                            vert: here,
                            side: Side::Next,
                            angle: pseudo_angle(v.p, contour.point(v.next)),
                            edge_owner: here,
                            prev: 0,
                            next: 0,
                        });
                    }
                }
            }
        };
        scan(Operand::A, a);
        scan(Operand::B, b);
    }

    // sort each ring by angle and close it up.  Ties happen exactly when two
    // edges leave the point in the same direction; putting Next entries
    // first (then operand A) makes a coincident pair ring-adjacent with a
    // deterministic order, which node_label's neighbor check relies on.
    for ring in rings.values_mut() {
        ring.sort_by(|&x, &y| {
            let ex = &entries[x as usize];
            let ey = &entries[y as usize];
            return ex
                .angle
                .partial_cmp(&ey.angle)
                .unwrap()
                .then_with(|| side_rank(ex.side).cmp(&side_rank(ey.side)))
                .then_with(|| operand_rank(ex.vert.operand).cmp(&operand_rank(ey.vert.operand)));
        });
        let n = ring.len();
        for k in 0..n {
            let here = ring[k] as usize;
            entries[here].prev = ring[(k + n - 1) % n];
            entries[here].next = ring[(k + 1) % n];
        }
    }

    // hang the entries off their vertices
    for (idx, entry) in entries.iter().enumerate() {
        let set = match entry.vert.operand {
            Operand::A => &mut *a,
            Operand::B => &mut *b,
        };
        let v = set.islands[entry.vert.island as usize]
            .contour_mut(entry.vert.contour)
            .vert_mut(entry.vert.vert);
        match entry.side {
            Side::Prev => v.cvc_prev = Some(idx as u32),
            Side::Next => v.cvc_next = Some(idx as u32),
        }
    }

    return Cvc { entries };
}

fn side_rank(side: Side) -> u8 {
    return match side {
        Side::Next => 0,
        Side::Prev => 1,
    };
}

fn operand_rank(operand: Operand) -> u8 {
    return match operand {
        Operand::A => 0,
        Operand::B => 1,
    };
}

/// Classify the edge leaving a cross vertex (the vertex behind entry
/// `e_idx`, a Next entry).  Fixed case analysis:
///
/// - an other-operand entry at exactly the same angle means the edges
///   coincide: a Next entry runs the same way (SHARED), a Prev entry the
///   opposite way (SHARED2); the coincident edge's owner is reported so the
///   caller can link the twins.
/// - otherwise the first other-operand entry counterclockwise decides: its
///   Prev side means we are about to leave the other operand's wedge, so
///   the edge is INSIDE; its Next side means we are about to enter it, so
///   the edge is OUTSIDE.
fn node_label(cvc: &Cvc, e_idx: u32) -> (Label, Option<VertRef>) {
    let e = cvc.entry(e_idx);
    let this_op = e.vert.operand;

    // a coincident entry can only sit immediately next to us in the ring
    for &l_idx in [e.next, e.prev].iter() {
        let l = cvc.entry(l_idx);
        if l_idx != e_idx && l.vert.operand != this_op && l.angle == e.angle {
            return match l.side {
                Side::Next => (Label::Shared, Some(l.edge_owner)),
                Side::Prev => (Label::Shared2, Some(l.edge_owner)),
            };
        }
    }

    let mut l_idx = e.next;
    while l_idx != e_idx {
        let l = cvc.entry(l_idx);
        if l.vert.operand != this_op {
            return match l.side {
                Side::Prev => (Label::Inside, None),
                Side::Next => (Label::Outside, None),
            };
        }
        l_idx = l.next;
    }
    // a ring with no other-operand entries shouldn't exist; let the caller
    // inherit whatever it had
    return (Label::Unknown, None);
}

/// Label every edge of every contour of `this` against `other`: crossed
/// contours edge by edge through their CVC rings, untouched contours
/// wholesale through a point-containment test.
pub(crate) fn label_set(this: &mut PolySet, other: &PolySet, cvc: &Cvc) {
    for island in this.islands.iter_mut() {
        for ci in 0..island.contours().len() as u32 {
            if island.contours()[ci as usize].status == ContourStatus::Isected {
                label_contour(island.contour_mut(ci), cvc);
            }
            else {
                let contour = island.contour_mut(ci);
                let head_point = contour.point(contour.head());
                contour.status = if other.contains_point(head_point) {
                    ContourStatus::Inside
                }
                else {
                    ContourStatus::Outside
                };
            }
        }
    }
}

fn label_contour(contour: &mut crate::poly::Contour, cvc: &Cvc) {
    let n = contour.len() as u32;
    let start = match (0..n).find(|&i| contour.vert(i).cvc_next.is_some()) {
        Some(i) => i,
        None => return,
    };

    let mut label = Label::Unknown;
    let mut i = start;
    loop {
        match contour.vert(i).cvc_next {
            Some(e_idx) => {
                let (fresh, shared) = node_label(cvc, e_idx);
                if fresh != Label::Unknown {
                    label = fresh;
                }
                contour.vert_mut(i).label = label;
                contour.vert_mut(i).shared = shared;
            }
            None => {
                // an uncrossed run continues whatever the last cross vertex
                // decided; shared runs always end in another cross vertex,
                // so only INSIDE/OUTSIDE can flow here
                debug_assert!(label == Label::Inside || label == Label::Outside);
                contour.vert_mut(i).label = label;
            }
        }
        // shared state does not leak past its own edge
        if label == Label::Shared || label == Label::Shared2 {
            label = Label::Unknown;
        }
        i = contour.vert(i).next;
        if i == start {
            break;
        }
    }
}
