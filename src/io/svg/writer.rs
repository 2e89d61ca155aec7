//! SVG writing operations.

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

pub(crate) struct SvgWriter<W: Write> {
    writer: W,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl<W: Write> Write for SvgWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter<BufWriter<File>> {
    /// Create a new SVG writer to a file path
    pub(crate) fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("[io::svg] Failed to create {}", path.display()))?;

        Ok(Self { writer: BufWriter::new(file) })
    }
}

impl<W: Write> SvgWriter<W> {
    pub(crate) fn new(writer: W) -> Self { Self { writer } }

    pub(crate) fn into_inner(self) -> W { self.writer }

    /// Write the SVG header, including the XML declaration and opening <svg> tag.
    pub(crate) fn write_header(&mut self, width: f64, height: f64, margin: f64, scale: f64, bounds: &geo::Rect) -> Result<()> {
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg"
            width="{width:.0}" height="{height:.0}"
            viewBox="0 0 {width:.0} {height:.0}"
            data-x-min="{x_min}" data-x-max="{x_max}"
            data-y-min="{y_min}" data-y-max="{y_max}"
            data-margin="{margin}" data-scale="{scale}">"##,
            x_min = bounds.min().x,
            x_max = bounds.max().x,
            y_min = bounds.min().y,
            y_max = bounds.max().y,
        )?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(())
    }

    /// Write SVG styles for layer shapes and neighbor edges.
    pub(crate) fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<defs>
<style>
    .blk {{ stroke: #111827; stroke-width: 0.5; fill-opacity: 0.85; }}
    .edge {{ stroke: #2563eb; stroke-opacity: 0.5; stroke-width: 0.8; }}
    .label {{ font: 12px sans-serif; fill: #111827; }}
</style>
</defs>"##)?;
        Ok(())
    }

    /// Write the closing </svg> tag.
    pub(crate) fn write_footer(&mut self) -> Result<()> {
        writeln!(self, "</svg>")?;
        Ok(())
    }
}
