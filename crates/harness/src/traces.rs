//! Trace file discovery.
//!
//! The trace set is loaded once by an explicit call and is read-only for the rest
//! of the run. Paths are sorted so enumeration order is the same on every host.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::common::{HarnessError, TraceFile};

/// The universe of trace files available to a session.
#[derive(Clone, Debug, Default)]
pub struct TraceSet {
    files: Vec<TraceFile>,
}

impl TraceSet {
    /// Lists every regular file in `dir`.
    ///
    /// Each trace path is `dir` joined with the entry name, so relative directories
    /// produce relative trace paths exactly as the collaborators will see them.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::TraceDiscovery`] if the directory or one of its
    /// entries cannot be read.
    pub fn discover(dir: &Path) -> Result<Self, HarnessError> {
        let discovery_error = |source| HarnessError::TraceDiscovery {
            dir: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir).map_err(discovery_error)? {
            let path = dir.join(entry.map_err(discovery_error)?.file_name());
            if path.is_file() {
                paths.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-file trace directory entry");
            }
        }
        paths.sort();

        if paths.is_empty() {
            warn!(dir = %dir.display(), "trace directory holds no files");
        }
        debug!(dir = %dir.display(), count = paths.len(), "discovered trace files");

        Ok(Self::from_files(paths.into_iter().map(TraceFile::new)))
    }

    /// Builds a set from explicit files, keeping the given order.
    pub fn from_files(files: impl IntoIterator<Item = TraceFile>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// The trace files in enumeration order.
    pub fn files(&self) -> &[TraceFile] {
        &self.files
    }

    /// Number of trace files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no trace files were found.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
