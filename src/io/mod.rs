//! Format-specific reading and writing.
//!
//! - `geojson` - census block input and district output
//! - `svg` - diagnostic plots

pub(crate) mod geojson;
pub(crate) mod svg;
