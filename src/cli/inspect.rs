//! Inspection commands (check, paths)

use std::path::Path;
use std::process::ExitCode;

use super::{load_project, EXIT_ERROR, EXIT_SUCCESS};
use crate::pack::{DeclaredPaths, NullProgress, PackContext, PackEngine};

/// Run the check command
pub fn run_check(config_path: Option<&Path>) -> ExitCode {
    let (config, project_root) = match load_project(config_path, false) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let definitions = PackContext::new(config, project_root).definitions();
    let errors = PackEngine::check(&definitions);

    if errors.is_empty() {
        println!("{} pipeline(s) OK", definitions.len());
        ExitCode::from(EXIT_SUCCESS)
    } else {
        for error in &errors {
            eprintln!("Error: {}", error);
        }
        eprintln!("{} of {} pipeline(s) invalid", errors.len(), definitions.len());
        ExitCode::from(EXIT_ERROR)
    }
}

/// Run the paths command
pub fn run_paths(config_path: Option<&Path>, json: bool) -> ExitCode {
    let (config, project_root) = match load_project(config_path, false) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let definitions = PackContext::new(config, project_root).definitions();
    let declared = DeclaredPaths::collect(&definitions, &NullProgress);

    if json {
        match serde_json::to_string_pretty(&declared) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("Inputs:");
        for path in &declared.inputs {
            println!("  {}", path.display());
        }
        println!("Outputs:");
        for path in &declared.outputs {
            println!("  {}", path.display());
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}
