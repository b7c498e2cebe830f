//! Configuration schema types for `texpipe.toml`
//!
//! Defines the structure and validation rules for texpipe project configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::pack::{ExitCodePolicy, ListingOrder};

/// Project layout section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Build directory; pipeline destinations are relative to it
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { build_dir: default_build_dir() }
    }
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

/// External tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Executable name or path
    #[serde(default = "default_executable")]
    pub executable: String,
    /// `"inherit"`, `"destination"`, or a directory path
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    /// Exit-code handling
    #[serde(default)]
    pub exit_code: ExitCodePolicy,
    /// Subdirectory listing order
    #[serde(default)]
    pub listing_order: ListingOrder,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            working_dir: default_working_dir(),
            exit_code: ExitCodePolicy::default(),
            listing_order: ListingOrder::default(),
        }
    }
}

fn default_executable() -> String {
    crate::pack::DEFAULT_EXECUTABLE.to_string()
}

fn default_working_dir() -> String {
    "inherit".to_string()
}

/// Single parameter argument. Non-string values are stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// String argument
    String(String),
    /// Integer argument
    Integer(i64),
    /// Float argument
    Float(f64),
    /// Boolean argument
    Bool(bool),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::String(s) => write!(f, "{}", s),
            ArgValue::Integer(i) => write!(f, "{}", i),
            ArgValue::Float(x) => write!(f, "{}", x),
            ArgValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Tool parameter entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterConfig {
    /// Parameter name without leading dashes
    pub name: String,
    /// Arguments following the flag
    #[serde(default)]
    pub args: Vec<ArgValue>,
}

/// Settings shared by every pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Parameters placed before each pipeline's own parameters
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
}

/// One `[[pipeline]]` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,
    /// Source directory, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<PathBuf>,
    /// Destination directory, relative to the build directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<PathBuf>,
    /// Single subdirectory to process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    /// Subdirectories to process
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    /// Single subdirectory to skip
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    /// Subdirectories to skip
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
    /// Sheet file name template; `{name}` is the subdirectory name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Data file name template; `{name}` is the subdirectory name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Pipeline parameters
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
}

/// Complete texpipe.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackConfig {
    /// Project layout
    #[serde(default)]
    pub project: ProjectConfig,
    /// External tool settings
    #[serde(default)]
    pub packer: PackerConfig,
    /// Shared pipeline settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Pipelines, in execution order
    #[serde(default, rename = "pipeline")]
    pub pipelines: Vec<PipelineConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "pipeline.ui.sheet")
    pub field: String,
    /// Error message
    pub message: String,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texpipe.toml: '{}' {}", self.field, self.message)
    }
}

impl PackConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.packer.executable.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "packer.executable".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if self.packer.working_dir.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "packer.working_dir".to_string(),
                message: "must be \"inherit\", \"destination\", or a directory".to_string(),
            });
        }

        check_parameters("defaults.parameters", &self.defaults.parameters, &mut errors);

        let mut names = HashSet::new();
        for (index, pipeline) in self.pipelines.iter().enumerate() {
            if pipeline.name.trim().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("pipeline[{}].name", index),
                    message: "must be a non-empty string".to_string(),
                });
            } else if !names.insert(pipeline.name.as_str()) {
                errors.push(ConfigValidationError {
                    field: format!("pipeline.{}", pipeline.name),
                    message: "is defined more than once".to_string(),
                });
            }

            for (field, template) in [("sheet", &pipeline.sheet), ("data", &pipeline.data)] {
                if matches!(template, Some(t) if t.trim().is_empty()) {
                    errors.push(ConfigValidationError {
                        field: format!("pipeline.{}.{}", pipeline.name, field),
                        message: "must not be empty".to_string(),
                    });
                }
            }

            check_parameters(
                &format!("pipeline.{}.parameters", pipeline.name),
                &pipeline.parameters,
                &mut errors,
            );
        }

        errors
    }

    /// Look up a pipeline by name.
    pub fn pipeline(&self, name: &str) -> Option<&PipelineConfig> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}

fn check_parameters(field: &str, parameters: &[ParameterConfig], errors: &mut Vec<ConfigValidationError>) {
    for parameter in parameters {
        if parameter.name.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: "parameter names must be non-empty".to_string(),
            });
        }
    }
}

/// Expand `{name}` placeholders in a file name template.
pub fn expand_template(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}
