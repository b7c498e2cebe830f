//! Input and output directories declared to the host build.
//!
//! A host that tracks up-to-date state needs the set of directories the
//! engine reads and the set it writes. Pipelines may share either, so both
//! lists are deduplicated by absolute path, keeping the first occurrence.

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::definition::PipelineDefinition;
use super::progress::{PathRole, ProgressEvent, ProgressReporter};

/// Unique source and destination directories across all pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeclaredPaths {
    /// Source directories, in first-seen pipeline order
    pub inputs: Vec<PathBuf>,
    /// Destination directories, in first-seen pipeline order
    pub outputs: Vec<PathBuf>,
}

impl DeclaredPaths {
    /// Collect inputs and outputs, reporting each added path at debug level.
    pub fn collect(pipelines: &[PipelineDefinition], reporter: &dyn ProgressReporter) -> Self {
        let inputs = declared_inputs(pipelines);
        let outputs = declared_outputs(pipelines);

        for path in &inputs {
            reporter.report(ProgressEvent::PathDeclared { role: PathRole::Input, path: path.clone() });
        }
        for path in &outputs {
            reporter.report(ProgressEvent::PathDeclared { role: PathRole::Output, path: path.clone() });
        }

        Self { inputs, outputs }
    }
}

/// Unique source directories. Pipelines without one are skipped.
pub fn declared_inputs(pipelines: &[PipelineDefinition]) -> Vec<PathBuf> {
    unique_paths(pipelines.iter().map(PipelineDefinition::source))
}

/// Unique destination directories. Pipelines without one are skipped.
pub fn declared_outputs(pipelines: &[PipelineDefinition]) -> Vec<PathBuf> {
    unique_paths(pipelines.iter().map(PipelineDefinition::destination))
}

fn unique_paths<'a, I>(paths: I) -> Vec<PathBuf>
where
    I: Iterator<Item = Option<&'a Path>>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for path in paths.flatten() {
        if path.as_os_str().is_empty() {
            continue;
        }
        if seen.insert(path.to_path_buf()) {
            unique.push(path.to_path_buf());
        }
    }
    unique
}
