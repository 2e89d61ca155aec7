use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::diagnostics::{Diagnostics, PlotLayer};
use crate::error::Result;
use crate::io::svg::write_layers_svg;

/// Writes `<tag>.json` snapshots and `<tag>.svg` plots into a directory.
#[derive(Clone, Debug)]
pub struct DumpDir {
    dir: PathBuf,
}

impl DumpDir {
    /// Use `dir` for dumps, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[inline] pub fn dir(&self) -> &Path { &self.dir }

    fn path(&self, tag: &str, extension: &str) -> PathBuf {
        let name = tag.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();
        self.dir.join(format!("{name}.{extension}"))
    }
}

impl Diagnostics for DumpDir {
    fn save(&self, tag: &str, snapshot: &Value) {
        let path = self.path(tag, "json");
        let written = serde_json::to_vec_pretty(snapshot)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| fs::write(&path, bytes).map_err(anyhow::Error::from));
        match written {
            Ok(()) => debug!("saved diagnostic snapshot {}", path.display()),
            Err(e) => warn!("could not save diagnostic snapshot {}: {e:#}", path.display()),
        }
    }

    fn plot(&self, tag: &str, layers: &[PlotLayer]) {
        let path = self.path(tag, "svg");
        match write_layers_svg(&path, layers) {
            Ok(()) => debug!("saved diagnostic plot {}", path.display()),
            Err(e) => warn!("could not save diagnostic plot {}: {e:#}", path.display()),
        }
    }
}
