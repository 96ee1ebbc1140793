//! Capture artifact persistence.
//!
//! All artifacts of a run land in one results directory whose path is held
//! explicitly; the process working directory is never changed.

use crate::engine::result::ValidationReport;
use crate::{PreflightError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of images written by the camera check
pub const IMAGE_EXTENSION: &str = "png";

/// Output location for a single run
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create the results directory if absent. Safe to call when it exists.
    pub fn prepare(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| PreflightError::Io {
            context: format!("creating {}", dir.display()),
            message: e.to_string(),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for the image at `index` of a capture batch
    pub fn image_file_name(index: usize) -> String {
        format!("image_{}.{}", index, IMAGE_EXTENSION)
    }

    /// Write raw image bytes as `image_<index>.png`, replacing any earlier run's file
    pub fn write_image(&self, index: usize, bytes: &[u8]) -> Result<String> {
        let name = Self::image_file_name(index);
        self.write_bytes(&name, bytes)?;
        Ok(name)
    }

    /// Write arbitrary bytes to `name` inside the results directory
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        std::fs::write(&path, bytes).map_err(|e| PreflightError::Io {
            context: format!("writing {}", path.display()),
            message: e.to_string(),
        })?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Save the run report as pretty-printed JSON
    pub fn write_report(&self, name: &str, report: &ValidationReport) -> Result<PathBuf> {
        let json = serde_json::to_vec_pretty(report).map_err(|e| PreflightError::Io {
            context: "serializing report".to_string(),
            message: e.to_string(),
        })?;
        self.write_bytes(name, &json)
    }
}
