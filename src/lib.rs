//! Boolean operations (union, intersection, subtraction, xor, touch test)
//! on integer-coordinate polygons with holes, the way a board editor needs
//! them: snap-rounded crossings, an R-tree under every contour, and results
//! handed back as disjoint islands ready for pour filling and clearance
//! checks.

pub mod errors;
pub mod geom;
pub mod heap;
pub mod rtree;
pub mod poly;
mod intersect;
mod label;
mod collect;
mod holes;
pub mod boolop;
pub mod svg_dump;

pub use crate::boolop::{and_subtract_free, boolean, boolean_free, touching, BoolOp};
pub use crate::geom::{BBox, BoardSpace, Coord, Point};
pub use crate::poly::{Contour, PolyArea, PolySet};
