//! Pipeline file store
//!
//! A saved pipeline is a YAML document holding a format version and the
//! ordered list of steps, each tagged with its kind:
//!
//! ```yaml
//! version: 1
//! steps:
//!   - kind: exec
//!     program_args: [grep, -n]
//!   - kind: args
//!     separator: ","
//!   - kind: store
//!     target_path: out/result.txt
//! ```

use crate::core::{PersistenceError, Pipeline, Step};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current version of the pipeline file format
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PipelineFileRef<'a> {
    version: u32,
    steps: &'a [Step],
}

#[derive(Deserialize)]
struct PipelineFile {
    version: u32,
    #[serde(default)]
    steps: Vec<Step>,
}

/// Saves and loads a pipeline's steps at a fixed path
#[derive(Debug, Clone)]
pub struct PipelineStore {
    path: PathBuf,
}

impl PipelineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the pipeline's steps, creating parent directories as needed
    pub fn save(&self, pipeline: &Pipeline) -> Result<(), PersistenceError> {
        let document = PipelineFileRef {
            version: FORMAT_VERSION,
            steps: pipeline.steps(),
        };
        let yaml = serde_yaml::to_string(&document).map_err(|e| PersistenceError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        std::fs::write(&self.path, yaml).map_err(|source| self.io_error(source))?;

        info!(
            "Saved {} steps to {}",
            pipeline.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the saved steps
    ///
    /// A missing file is an empty pipeline, not an error.
    pub fn load(&self) -> Result<Vec<Step>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No pipeline file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let document: PipelineFile =
            serde_yaml::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        if document.version != FORMAT_VERSION {
            return Err(self.corrupt(format!(
                "unsupported format version {} (expected {})",
                document.version, FORMAT_VERSION
            )));
        }

        for (index, step) in document.steps.iter().enumerate() {
            step.validate()
                .map_err(|e| self.corrupt(format!("step {}: {}", index, e)))?;
        }

        debug!(
            "Loaded {} steps from {}",
            document.steps.len(),
            self.path.display()
        );
        Ok(document.steps)
    }

    /// Load the saved steps into a new pipeline
    pub fn load_pipeline(&self) -> Result<Pipeline, PersistenceError> {
        self.load().map(Pipeline::with_steps)
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn corrupt(&self, message: String) -> PersistenceError {
        PersistenceError::Corrupt {
            path: self.path.clone(),
            message,
        }
    }
}
