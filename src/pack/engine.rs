//! Pipeline engine.
//!
//! Drives every pipeline through
//! validate → create destination → list → select → (name → build → run → log)
//! sequentially. Configuration problems stop the run before the offending
//! pipeline spawns anything; per-directory failures are reported and the run
//! moves on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::command::{build_arguments, format_command_line};
use super::definition::{PipelineDefinition, ResolvedPipeline};
use super::error::{ConfigurationError, EngineError, InvocationError};
use super::filter::{list_source_entries, ListingOrder, SourceEntry};
use super::progress::{NullProgress, ProgressEvent, ProgressReporter};
use super::result::{InvocationResult, InvocationStatus, RunResult};
use super::runner::{ExecutionResult, ProcessRunner, SystemRunner};

/// Default name of the packer executable.
pub const DEFAULT_EXECUTABLE: &str = "TexturePacker";

/// Working directory of the spawned tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkingDir {
    /// Inherit the engine's working directory
    #[default]
    Inherit,
    /// Run inside the pipeline's destination directory
    Destination,
    /// Run inside a fixed directory
    Fixed(PathBuf),
}

impl WorkingDir {
    fn for_destination<'a>(&'a self, destination: &'a Path) -> Option<&'a Path> {
        match self {
            WorkingDir::Inherit => None,
            WorkingDir::Destination => Some(destination),
            WorkingDir::Fixed(dir) => Some(dir),
        }
    }
}

/// How the tool's exit code affects the invocation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExitCodePolicy {
    /// Record the code but never fail on it
    #[default]
    Ignore,
    /// A non-zero code (or signal termination) fails the invocation
    Fail,
}

impl std::str::FromStr for ExitCodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" => Ok(ExitCodePolicy::Ignore),
            "fail" => Ok(ExitCodePolicy::Fail),
            _ => Err(format!("unknown exit code policy '{}' (expected ignore or fail)", s)),
        }
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Packer executable, resolved through `PATH`
    pub executable: String,
    /// Working directory of the tool
    pub working_dir: WorkingDir,
    /// Exit-code handling
    pub exit_code: ExitCodePolicy,
    /// Order in which subdirectories are visited
    pub listing_order: ListingOrder,
    /// Build and report commands without running anything
    pub dry_run: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            working_dir: WorkingDir::default(),
            exit_code: ExitCodePolicy::default(),
            listing_order: ListingOrder::default(),
            dry_run: false,
        }
    }
}

/// Executes pipeline definitions.
pub struct PackEngine {
    options: EngineOptions,
    runner: Arc<dyn ProcessRunner>,
    reporter: Arc<dyn ProgressReporter>,
}

impl PackEngine {
    /// Create an engine with the system runner and no reporting.
    pub fn new(options: EngineOptions) -> Self {
        Self { options, runner: Arc::new(SystemRunner::new()), reporter: Arc::new(NullProgress) }
    }

    /// Use a different process runner.
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Send events to `reporter`.
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    /// Engine settings.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run every pipeline in order.
    ///
    /// Returns `Err` for configuration errors and for a destination
    /// directory that cannot be created. Tool failures are recorded in the
    /// returned [`RunResult`]. Use [`PackEngine::run_into`] to keep the
    /// results of pipelines that ran before an error.
    pub fn run(&self, pipelines: &[PipelineDefinition]) -> Result<RunResult, EngineError> {
        let mut result = RunResult::new();
        self.run_into(pipelines, &mut result)?;
        Ok(result)
    }

    /// Run every pipeline in order, collecting into `result`.
    ///
    /// On error, `result` holds every invocation made before the failing
    /// pipeline. `RunCompleted` is reported in both cases.
    pub fn run_into(
        &self,
        pipelines: &[PipelineDefinition],
        result: &mut RunResult,
    ) -> Result<(), EngineError> {
        let start = Instant::now();
        let mut seen = HashSet::new();

        self.reporter.report(ProgressEvent::RunStarted { pipelines: pipelines.len() });

        let mut outcome = Ok(());
        for definition in pipelines {
            if let Err(e) = self.run_pipeline(definition, &mut seen, result) {
                outcome = Err(e);
                break;
            }
            result.pipelines.push(definition.name().to_string());
        }

        result.total_duration = start.elapsed();
        self.reporter.report(ProgressEvent::RunCompleted {
            success: outcome.is_ok() && result.is_success(),
            duration_ms: result.total_duration.as_millis() as u64,
            processed: result.success_count(),
            skipped: result.skipped_count(),
            failed: result.failed_count(),
        });

        outcome
    }

    /// Run the pre-flight checks of every pipeline without touching the disk.
    pub fn check(pipelines: &[PipelineDefinition]) -> Vec<ConfigurationError> {
        pipelines.iter().filter_map(|p| p.resolve().err()).collect()
    }

    fn run_pipeline(
        &self,
        definition: &PipelineDefinition,
        seen: &mut HashSet<(PathBuf, PathBuf, PathBuf)>,
        result: &mut RunResult,
    ) -> Result<(), EngineError> {
        let pipeline = definition.resolve()?;

        if !self.options.dry_run {
            fs::create_dir_all(pipeline.destination_dir).map_err(|source| EngineError::Io {
                path: pipeline.destination_dir.to_path_buf(),
                source,
            })?;
        }

        let qualifying = pipeline.filter.select(self.list_sources(&pipeline));

        self.reporter.report(ProgressEvent::PipelineStarted {
            pipeline: pipeline.name.to_string(),
            source: pipeline.source_dir.to_path_buf(),
            destination: pipeline.destination_dir.to_path_buf(),
            qualifying: qualifying.len(),
        });

        for entry in &qualifying {
            let invocation = self.process_directory(&pipeline, entry, seen);
            result.add_result(invocation);
        }

        Ok(())
    }

    fn list_sources(&self, pipeline: &ResolvedPipeline<'_>) -> Vec<SourceEntry> {
        match list_source_entries(pipeline.source_dir, self.options.listing_order) {
            Ok(entries) => entries,
            Err(e) => {
                self.reporter.report(ProgressEvent::Warning {
                    pipeline: Some(pipeline.name.to_string()),
                    message: format!(
                        "cannot read source directory {}: {}",
                        pipeline.source_dir.display(),
                        e
                    ),
                });
                Vec::new()
            }
        }
    }

    fn process_directory(
        &self,
        pipeline: &ResolvedPipeline<'_>,
        entry: &SourceEntry,
        seen: &mut HashSet<(PathBuf, PathBuf, PathBuf)>,
    ) -> InvocationResult {
        let start = Instant::now();
        let sheet = pipeline.sheet_path(&entry.name);
        let data = pipeline.data_path(&entry.name);
        let args = build_arguments(&sheet, &data, pipeline.parameters, &entry.path);

        self.reporter.report(ProgressEvent::CommandLine {
            pipeline: pipeline.name.to_string(),
            line: format_command_line(&self.options.executable, &args),
        });

        let invocation = InvocationResult::new(
            pipeline.name,
            entry.path.clone(),
            sheet.clone(),
            data.clone(),
            args,
        );

        if !seen.insert((entry.path.clone(), sheet, data)) {
            self.reporter.report(ProgressEvent::Warning {
                pipeline: Some(pipeline.name.to_string()),
                message: format!(
                    "directory {} was already packed to the same outputs in this run",
                    entry.path.display()
                ),
            });
            return invocation.with_status(InvocationStatus::Skipped);
        }

        if self.options.dry_run {
            return invocation.with_status(InvocationStatus::Skipped);
        }

        let working_dir = self.options.working_dir.for_destination(pipeline.destination_dir);
        let execution = self.runner.run(&self.options.executable, &invocation.args, working_dir);
        let duration = start.elapsed();

        self.report_streams(pipeline.name, &execution);

        let exit_code = execution.exit_code;
        let status = match self.classify(execution) {
            Ok(()) => {
                self.reporter.report(ProgressEvent::DirectoryProcessed {
                    pipeline: pipeline.name.to_string(),
                    source: invocation.source.clone(),
                    sheet: invocation.sheet.clone(),
                    data: invocation.data.clone(),
                    duration_ms: duration.as_millis() as u64,
                });
                InvocationStatus::Success
            }
            Err(e) => {
                self.reporter.report(ProgressEvent::InvocationFailed {
                    pipeline: pipeline.name.to_string(),
                    source: invocation.source.clone(),
                    message: e.to_string(),
                });
                InvocationStatus::Failed(e.to_string())
            }
        };

        invocation.with_status(status).with_exit_code(exit_code).with_duration(duration)
    }

    fn report_streams(&self, pipeline: &str, execution: &ExecutionResult) {
        if !execution.stdout.is_empty() {
            self.reporter.report(ProgressEvent::ToolOutput {
                pipeline: pipeline.to_string(),
                text: execution.stdout_text(),
            });
        }
        if !execution.stderr.is_empty() {
            self.reporter.report(ProgressEvent::ToolError {
                pipeline: pipeline.to_string(),
                text: execution.stderr_text(),
            });
        }
    }

    fn classify(&self, execution: ExecutionResult) -> Result<(), InvocationError> {
        if let Some(error) = execution.error {
            return Err(error.into());
        }
        match (self.options.exit_code, execution.exit_code) {
            (ExitCodePolicy::Ignore, _) => Ok(()),
            (ExitCodePolicy::Fail, Some(0)) => Ok(()),
            (ExitCodePolicy::Fail, Some(code)) => Err(InvocationError::NonZeroExit(code)),
            (ExitCodePolicy::Fail, None) => Err(InvocationError::Terminated),
        }
    }
}
