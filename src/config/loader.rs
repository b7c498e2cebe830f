//! Configuration loading and discovery for `texpipe.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PackConfig;
use crate::pack::{ExitCodePolicy, ListingOrder};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file name.
pub const CONFIG_FILE: &str = "texpipe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse texpipe.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the packer executable
    pub executable: Option<String>,
    /// Override the exit-code policy
    pub exit_code: Option<ExitCodePolicy>,
    /// Override the listing order
    pub listing_order: Option<ListingOrder>,
    /// Override the build directory
    pub build_dir: Option<PathBuf>,
}

/// Find texpipe.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a texpipe.toml file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find texpipe.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a texpipe.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration with no pipelines.
///
/// # Example
/// ```ignore
/// let config = load_config(Some(Path::new("game/texpipe.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<PackConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<PackConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PackConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Configuration used when no texpipe.toml is found.
pub fn default_config() -> PackConfig {
    PackConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PackConfig, overrides: &CliOverrides) {
    if let Some(ref executable) = overrides.executable {
        config.packer.executable = executable.clone();
    }

    if let Some(exit_code) = overrides.exit_code {
        config.packer.exit_code = exit_code;
    }

    if let Some(listing_order) = overrides.listing_order {
        config.packer.listing_order = listing_order;
    }

    if let Some(ref build_dir) = overrides.build_dir {
        config.project.build_dir = build_dir.clone();
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the texpipe.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"");

        let subdir = temp.path().join("assets").join("ui");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_config_from_cwd() {
        let temp = TempDir::new().expect("should create temp dir");
        write_config(temp.path(), b"[project]\nbuild_dir = \"out\"");
        let nested = temp.path().join("assets");
        fs::create_dir_all(&nested).expect("should create subdirectory");

        let original = env::current_dir().expect("should read cwd");
        env::set_current_dir(&nested).expect("should change cwd");
        let config = load_config(None);
        env::set_current_dir(original).expect("should restore cwd");

        assert_eq!(config.expect("should load").project.build_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[packer]
exit_code = "fail"

[[pipeline]]
name = "ui"
src = "assets/ui"
dst = "atlases"
sheet = "{name}.png"
data = "{name}.json"
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.packer.exit_code, ExitCodePolicy::Fail);
        assert_eq!(config.pipelines.len(), 1);
        assert_eq!(config.pipelines[0].src, Some(PathBuf::from("assets/ui")));
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("nonexistent.toml");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_unknown_policy_is_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[packer]\nexit_code = \"sometimes\"");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
[packer]
executable = ""

[[pipeline]]
name = ""
"#,
        );

        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            executable: Some("./fake-packer".to_string()),
            exit_code: Some(ExitCodePolicy::Fail),
            listing_order: Some(ListingOrder::Filesystem),
            build_dir: Some(PathBuf::from("dist")),
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.packer.executable, "./fake-packer");
        assert_eq!(config.packer.exit_code, ExitCodePolicy::Fail);
        assert_eq!(config.packer.listing_order, ListingOrder::Filesystem);
        assert_eq!(config.project.build_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_merge_cli_overrides_empty_keeps_config() {
        let mut config = default_config();
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config.packer.executable, "TexturePacker");
        assert_eq!(config.project.build_dir, PathBuf::from("build"));
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
        assert_eq!(resolve_path(root, Path::new("assets")), PathBuf::from("/project/assets"));
    }

    #[test]
    fn test_project_root() {
        let config_path = Path::new("/project/texpipe.toml");
        assert_eq!(project_root(config_path), Some(Path::new("/project")));
    }
}
