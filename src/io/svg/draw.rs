use std::io::Write;

use anyhow::Result;
use geo::{Coord, CoordsIter, LineString, MultiPolygon, Point};

/// Projection function: planar coords -> SVG coords (x,y)
pub(crate) type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

/// Draw neighbor edges as straight lines between centroids.
pub(crate) fn draw_edges(writer: &mut impl Write, edges: &[(Point<f64>, Point<f64>)], project: &Projection) -> Result<()> {
    for (a, b) in edges {
        let (x1, y1) = project(&a.0);
        let (x2, y2) = project(&b.0);
        writeln!(writer, r##"<line class="edge" x1="{x1:.3}" y1="{y1:.3}" x2="{x2:.3}" y2="{y2:.3}"/>"##)?;
    }
    Ok(())
}

/// Draw shapes with a shared fill color; holes use the even-odd rule.
pub(crate) fn draw_polygons_with_fill(writer: &mut impl Write, shapes: &[MultiPolygon<f64>], fill: &str, project: &Projection) -> Result<()> {
    for shape in shapes {
        let path = multipolygon_to_path(shape, project);
        if path.is_empty() { continue }
        writeln!(writer, r#"<path class="blk" fill-rule="evenodd" style="fill:{fill}" d="{path}"/>"#)?;
    }
    Ok(())
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
pub(crate) fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();

    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), project, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, project, &mut out);
        }
    }

    out
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
fn ring_to_path(ring: &LineString<f64>, project: &Projection, out: &mut String) {
    let mut coords = ring.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
}
