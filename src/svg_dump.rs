//! Debug output: dump one or more polygon sets as layered SVG.  Handy for
//! eyeballing what an operation actually produced; nothing in the engine
//! calls this on its own.

use std::path::Path as FsPath;

use svg::node::element::path::Data;
use svg::node::element::{Group, Path};
use svg::Document;

use crate::errors::*;
use crate::poly::PolySet;

/// Write `layers` (set, css color) into an SVG file, one group per set,
/// one even-odd path per island so holes render as holes.
pub fn dump_svg<P: AsRef<FsPath>>(path: P, layers: &[(&PolySet, &str)]) -> Result<()> {
    let mut bounds = None;
    for (set, _) in layers.iter() {
        if let Some(b) = set.bbox() {
            bounds = match bounds {
                None => Some(b),
                Some(acc) => Some(b.union(&acc)),
            };
        }
    }
    let bounds = match bounds {
        Some(b) => b,
        None => return Ok(()),
    };

    let margin = 8.0;
    let mut doc = Document::new().set(
        "viewBox",
        (
            bounds.min.x as f32 - margin,
            bounds.min.y as f32 - margin,
            (bounds.max.x - bounds.min.x) as f32 + 2.0 * margin,
            (bounds.max.y - bounds.min.y) as f32 + 2.0 * margin,
        ),
    );

    for (set, color) in layers.iter() {
        let mut group = Group::new()
            .set("fill", *color)
            .set("fill-opacity", 0.4)
            .set("stroke", *color)
            .set("stroke-width", 0.5);
        for island in set.islands.iter() {
            let mut data = Data::new();
            for contour in island.contours().iter() {
                let points = contour.points();
                let mut iter = points.iter();
                if let Some(first) = iter.next() {
                    data = data.move_to((first.x as f32, first.y as f32));
                    for p in iter {
                        data = data.line_to((p.x as f32, p.y as f32));
                    }
                    data = data.close();
                }
            }
            group = group.add(Path::new().set("fill-rule", "evenodd").set("d", data));
        }
        doc = doc.add(group);
    }

    svg::save(path, &doc)?;
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::poly::PolyArea;

    #[test]
    fn writes_a_file_with_hole_subpaths() {
        let donut = PolyArea::from_contours(&[
            vec![Point::new(0, 0), Point::new(30, 0), Point::new(30, 30), Point::new(0, 30)],
            vec![Point::new(10, 10), Point::new(10, 20), Point::new(20, 20), Point::new(20, 10)],
        ])
        .unwrap();
        let set = PolySet::from_island(donut);

        let path = std::env::temp_dir().join("copperclip_dump_test.svg");
        dump_svg(&path, &[(&set, "#c87137")]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("evenodd"));
        // outer and hole each close a subpath
        assert!(written.to_lowercase().matches('z').count() >= 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_layers_write_nothing() {
        let set = PolySet::new();
        let path = std::env::temp_dir().join("copperclip_dump_empty.svg");
        let _ = std::fs::remove_file(&path);
        dump_svg(&path, &[(&set, "#000")]).unwrap();
        assert!(!path.exists());
    }
}
