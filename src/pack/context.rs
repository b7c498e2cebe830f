//! Pack context: turns a loaded configuration into engine input.

use crate::config::{expand_template, PackConfig, ParameterConfig, PipelineConfig};
use std::path::{Path, PathBuf};

use super::definition::PipelineDefinition;
use super::engine::{EngineOptions, WorkingDir};
use super::parameter::ParameterSet;

/// Configuration and paths for one engine run.
///
/// Source directories resolve against the project root; destination
/// directories resolve against the build directory.
#[derive(Debug, Clone)]
pub struct PackContext {
    /// The loaded configuration
    config: PackConfig,
    /// Project root directory (where texpipe.toml is located)
    project_root: PathBuf,
    /// Whether to run in verbose mode
    verbose: bool,
    /// Whether to only print commands
    dry_run: bool,
    /// Optional filter to run specific pipelines only
    pipeline_filter: Option<Vec<String>>,
}

impl PackContext {
    /// Create a new pack context.
    pub fn new(config: PackConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, verbose: false, dry_run: false, pipeline_filter: None }
    }

    /// Get the configuration.
    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Build directory (resolved to absolute path).
    pub fn build_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.build_dir)
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run only the named pipelines. An empty list means all.
    pub fn with_filter(mut self, pipelines: Vec<String>) -> Self {
        self.pipeline_filter = if pipelines.is_empty() { None } else { Some(pipelines) };
        self
    }

    /// Get the pipeline filter.
    pub fn pipeline_filter(&self) -> Option<&[String]> {
        self.pipeline_filter.as_deref()
    }

    /// Filter entries that name no configured pipeline.
    pub fn unknown_pipelines(&self) -> Vec<&str> {
        self.pipeline_filter
            .iter()
            .flatten()
            .filter(|name| self.config.pipeline(name).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Resolve a path relative to the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Engine settings from the `[packer]` section.
    pub fn engine_options(&self) -> EngineOptions {
        let packer = &self.config.packer;
        let working_dir = match packer.working_dir.as_str() {
            "inherit" => WorkingDir::Inherit,
            "destination" => WorkingDir::Destination,
            dir => WorkingDir::Fixed(self.resolve_path(Path::new(dir))),
        };

        EngineOptions {
            executable: packer.executable.clone(),
            working_dir,
            exit_code: packer.exit_code,
            listing_order: packer.listing_order,
            dry_run: self.dry_run,
        }
    }

    /// Pipeline definitions in configuration order, honoring the filter.
    pub fn definitions(&self) -> Vec<PipelineDefinition> {
        self.config
            .pipelines
            .iter()
            .filter(|p| self.is_selected(&p.name))
            .map(|p| self.definition(p))
            .collect()
    }

    fn is_selected(&self, name: &str) -> bool {
        match &self.pipeline_filter {
            Some(names) => names.iter().any(|n| n == name),
            None => true,
        }
    }

    fn definition(&self, pipeline: &PipelineConfig) -> PipelineDefinition {
        let mut definition = PipelineDefinition::new(pipeline.name.clone())
            .includes(pipeline.includes.iter().cloned())
            .excludes(pipeline.excludes.iter().cloned())
            .parameters(self.parameters(pipeline));

        if let Some(src) = &pipeline.src {
            definition = definition.source_dir(self.resolve_path(src));
        }
        if let Some(dst) = &pipeline.dst {
            definition = definition.destination_dir(resolve_against(&self.build_dir(), dst));
        }
        if let Some(include) = &pipeline.include {
            definition = definition.include(include.clone());
        }
        if let Some(exclude) = &pipeline.exclude {
            definition = definition.exclude(exclude.clone());
        }
        if let Some(sheet) = pipeline.sheet.clone() {
            definition = definition.sheet_name(move |name| expand_template(&sheet, name));
        }
        if let Some(data) = pipeline.data.clone() {
            definition = definition.data_name(move |name| expand_template(&data, name));
        }

        definition
    }

    fn parameters(&self, pipeline: &PipelineConfig) -> ParameterSet {
        let mut set = ParameterSet::new();
        for parameter in self.config.defaults.parameters.iter().chain(&pipeline.parameters) {
            add_parameter(&mut set, parameter);
        }
        set
    }
}

fn add_parameter(set: &mut ParameterSet, parameter: &ParameterConfig) {
    set.add(&parameter.name, &parameter.args);
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
