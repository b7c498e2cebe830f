//! Pipeline definitions.
//!
//! A [`PipelineDefinition`] describes one source directory → destination
//! directory packing unit. Definitions are assembled with a builder during
//! configuration and read-only once the engine runs.
//!
//! ```ignore
//! let ui = PipelineDefinition::new("ui")
//!     .source_dir("/project/assets/ui")
//!     .destination_dir("/project/build/atlases")
//!     .excludes(["drafts"])
//!     .sheet_name(|dir| format!("{dir}.png"))
//!     .data_name(|dir| format!("{dir}.json"))
//!     .flag("trim")
//!     .parameter("format", ["phaser"]);
//! ```

use std::env;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::error::ConfigurationError;
use super::filter::FilterSpec;
use super::parameter::ParameterSet;

/// Maps a subdirectory base name to an output file name.
pub type NameFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// One named processing unit.
pub struct PipelineDefinition {
    name: String,
    source_dir: Option<PathBuf>,
    destination_dir: Option<PathBuf>,
    filter: FilterSpec,
    sheet_name: Option<NameFn>,
    data_name: Option<NameFn>,
    parameters: ParameterSet,
}

impl fmt::Debug for PipelineDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineDefinition")
            .field("name", &self.name)
            .field("source_dir", &self.source_dir)
            .field("destination_dir", &self.destination_dir)
            .field("filter", &self.filter)
            .field("sheet_name", &self.sheet_name.is_some())
            .field("data_name", &self.data_name.is_some())
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Fields of a definition that passed the pre-flight checks.
pub struct ResolvedPipeline<'a> {
    /// Pipeline name
    pub name: &'a str,
    /// Absolute source directory
    pub source_dir: &'a Path,
    /// Absolute destination directory
    pub destination_dir: &'a Path,
    /// Validated filter
    pub filter: &'a FilterSpec,
    /// Sheet naming callback
    pub sheet_name: &'a NameFn,
    /// Data naming callback
    pub data_name: &'a NameFn,
    /// Tool parameters
    pub parameters: &'a ParameterSet,
}

impl fmt::Debug for ResolvedPipeline<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPipeline")
            .field("name", &self.name)
            .field("source_dir", &self.source_dir)
            .field("destination_dir", &self.destination_dir)
            .field("filter", &self.filter)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

impl ResolvedPipeline<'_> {
    /// Absolute sheet path for a subdirectory.
    pub fn sheet_path(&self, dir_name: &str) -> PathBuf {
        under(self.destination_dir, &(self.sheet_name)(dir_name))
    }

    /// Absolute data path for a subdirectory.
    pub fn data_path(&self, dir_name: &str) -> PathBuf {
        under(self.destination_dir, &(self.data_name)(dir_name))
    }
}

/// Join `file_name` onto `dir`, always nesting it inside `dir`: root and
/// prefix components of an absolute name are dropped.
fn under(dir: &Path, file_name: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    for component in Path::new(file_name).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            other => path.push(other),
        }
    }
    path
}

impl PipelineDefinition {
    /// Create an empty definition. Name is used for diagnostics only.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_dir: None,
            destination_dir: None,
            filter: FilterSpec::default(),
            sheet_name: None,
            data_name: None,
            parameters: ParameterSet::default(),
        }
    }

    /// Set the source directory. Relative paths are resolved against the
    /// current directory now, once.
    pub fn source_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.source_dir = Some(absolutize(dir.as_ref()));
        self
    }

    /// Set the destination directory. Relative paths are resolved against
    /// the current directory now, once.
    pub fn destination_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.destination_dir = Some(absolutize(dir.as_ref()));
        self
    }

    /// Only process the subdirectory with this name.
    pub fn include(mut self, name: impl Into<String>) -> Self {
        self.filter.include = Some(name.into());
        self
    }

    /// Only process subdirectories with these names.
    pub fn includes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.includes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Skip the subdirectory with this name.
    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.filter.exclude = Some(name.into());
        self
    }

    /// Skip subdirectories with these names.
    pub fn excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.excludes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Replace the whole filter.
    pub fn filter(mut self, filter: FilterSpec) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sheet naming callback. The result is converted to a string
    /// right after each call.
    pub fn sheet_name<F, S>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> S + Send + Sync + 'static,
        S: ToString,
    {
        self.sheet_name = Some(normalize_name_fn(f));
        self
    }

    /// Set the data naming callback. The result is converted to a string
    /// right after each call.
    pub fn data_name<F, S>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> S + Send + Sync + 'static,
        S: ToString,
    {
        self.data_name = Some(normalize_name_fn(f));
        self
    }

    /// Register a parameter with arguments. See [`ParameterSet::add`].
    pub fn parameter<I>(mut self, name: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.parameters.add(name, args);
        self
    }

    /// Register a parameter without arguments.
    pub fn flag(self, name: &str) -> Self {
        self.parameter(name, std::iter::empty::<String>())
    }

    /// Replace the whole parameter set.
    pub fn parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    /// Mutable access to the parameter set, for append-only registration.
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source directory, if set.
    pub fn source(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// Destination directory, if set.
    pub fn destination(&self) -> Option<&Path> {
        self.destination_dir.as_deref()
    }

    /// Filter settings.
    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    /// Tool parameters.
    pub fn parameter_set(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Run the pre-flight checks.
    ///
    /// Checks required fields in the order `src`, `dst`, `sheet`, `data`,
    /// then the filter rules. Touches nothing on disk.
    pub fn resolve(&self) -> Result<ResolvedPipeline<'_>, ConfigurationError> {
        let source_dir = non_empty(self.source_dir.as_deref())
            .ok_or_else(|| self.missing("src"))?;
        let destination_dir = non_empty(self.destination_dir.as_deref())
            .ok_or_else(|| self.missing("dst"))?;
        let sheet_name = self.sheet_name.as_ref().ok_or_else(|| self.missing("sheet"))?;
        let data_name = self.data_name.as_ref().ok_or_else(|| self.missing("data"))?;

        self.filter.validate().map_err(|conflict| ConfigurationError::ConflictingFilters {
            pipeline: self.name.clone(),
            conflict,
        })?;

        Ok(ResolvedPipeline {
            name: &self.name,
            source_dir,
            destination_dir,
            filter: &self.filter,
            sheet_name,
            data_name,
            parameters: &self.parameters,
        })
    }

    fn missing(&self, field: &'static str) -> ConfigurationError {
        ConfigurationError::MissingField { pipeline: self.name.clone(), field }
    }
}

/// Wrap a callback returning any `ToString` into a [`NameFn`].
pub fn normalize_name_fn<F, S>(f: F) -> NameFn
where
    F: Fn(&str) -> S + Send + Sync + 'static,
    S: ToString,
{
    Box::new(move |name| f(name).to_string())
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

fn absolutize(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
