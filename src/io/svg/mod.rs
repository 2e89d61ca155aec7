//! SVG rendering of diagnostic plot layers.

mod color;
mod draw;
mod writer;

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};
use geo::Coord;

use crate::diagnostics::PlotLayer;

pub(crate) use color::*;
pub(crate) use draw::*;
pub(crate) use writer::*;

const WIDTH: f64 = 1200.0;
const MARGIN: f64 = 10.0;

/// Render every layer into `writer`, one colored `<g>` per layer in order.
pub(crate) fn render_layers<W: Write>(writer: W, layers: &[PlotLayer]) -> Result<W> {
    let bounds = layers.iter()
        .flat_map(|layer| layer.shapes.iter())
        .filter_map(geograph::bounds)
        .reduce(|a, b| geograph::merge_rects(&a, &b))
        .ok_or_else(|| anyhow!("[io::svg] Could not determine bounds; nothing to draw."))?;

    let extent = bounds.width().max(bounds.height()).max(f64::EPSILON);
    let scale = (WIDTH - 2.0 * MARGIN) / extent;
    let width = bounds.width() * scale + 2.0 * MARGIN;
    let height = bounds.height() * scale + 2.0 * MARGIN;

    // planar -> SVG coords (Y down)
    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = MARGIN + (coord.x - bounds.min().x) * scale;
        let y = MARGIN + (bounds.max().y - coord.y) * scale;
        (x, y)
    };

    let mut svg = SvgWriter::new(writer);
    svg.write_header(width, height, MARGIN, scale, &bounds)?;
    svg.write_styles()?;

    for (i, layer) in layers.iter().enumerate() {
        writeln!(svg, r#"<g id="{}">"#, layer_id(&layer.name))?;
        draw_polygons_with_fill(&mut svg, &layer.shapes, &golden_angle_color(i).to_string(), &project)?;
        draw_edges(&mut svg, &layer.edges, &project)?;
        writeln!(svg, "</g>")?;
    }

    svg.write_footer()?;
    svg.flush()?;
    Ok(svg.into_inner())
}

/// Layer names reduced to characters that are safe inside an XML id attribute.
fn layer_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

/// Render layers into an SVG file at `path`.
pub(crate) fn write_layers_svg(path: &Path, layers: &[PlotLayer]) -> Result<()> {
    let file = SvgWriter::create(path)?;
    render_layers(file, layers)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use geo::{MultiPolygon, Point, Rect};

    use super::*;

    fn layer(name: &str, x: f64) -> PlotLayer {
        PlotLayer {
            name: name.into(),
            shapes: vec![MultiPolygon::new(vec![Rect::new((x, 0.), (x + 1., 1.)).to_polygon()])],
            edges: vec![(Point::new(x + 0.5, 0.5), Point::new(x + 1.5, 0.5))],
        }
    }

    #[test]
    fn one_group_per_layer() {
        let bytes = render_layers(Vec::new(), &[layer("a", 0.), layer("b", 1.)]).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert_eq!(svg.matches("<g id=").count(), 2);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn layer_names_cannot_break_out_of_the_id() {
        let bytes = render_layers(Vec::new(), &[layer(r#"a"><script>"#, 0.)]).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains(r#"<g id="a___script_">"#));
        assert!(!svg.contains("<script>"));
    }

    #[test]
    fn empty_layers_are_an_error() {
        assert!(render_layers(Vec::new(), &[]).is_err());
    }
}
