//! Build command implementation

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use super::{load_project, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::{merge_cli_overrides, CliOverrides};
use crate::pack::{
    ConsoleProgress, DeclaredPaths, ExitCodePolicy, JsonProgress, ListingOrder, PackContext,
    PackEngine, ProgressReporter, RunResult,
};

/// Flags of the build command
#[derive(Debug, Default)]
pub struct BuildArgs {
    pub pipelines: Vec<String>,
    pub dry_run: bool,
    pub verbose: bool,
    pub json: bool,
    pub executable: Option<String>,
    pub fail_on_exit_code: bool,
    pub listing_order: Option<ListingOrder>,
}

/// Run the build command
pub fn run_build(config_path: Option<&Path>, args: BuildArgs) -> ExitCode {
    let (mut config, project_root) = match load_project(config_path, args.verbose) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let overrides = CliOverrides {
        executable: args.executable,
        exit_code: args.fail_on_exit_code.then_some(ExitCodePolicy::Fail),
        listing_order: args.listing_order,
        ..Default::default()
    };
    merge_cli_overrides(&mut config, &overrides);

    let context = PackContext::new(config, project_root)
        .with_verbose(args.verbose)
        .with_dry_run(args.dry_run)
        .with_filter(args.pipelines);

    let unknown = context.unknown_pipelines();
    if !unknown.is_empty() {
        eprintln!("Error: Unknown pipeline(s): {}", unknown.join(", "));
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let definitions = context.definitions();
    if definitions.is_empty() {
        eprintln!("No pipelines configured");
        return ExitCode::from(EXIT_SUCCESS);
    }

    let reporter: Arc<dyn ProgressReporter> = if args.json {
        Arc::new(JsonProgress::new())
    } else {
        Arc::new(ConsoleProgress::new().with_verbose(context.is_verbose()))
    };

    DeclaredPaths::collect(&definitions, reporter.as_ref());

    let engine = PackEngine::new(context.engine_options()).with_reporter(reporter);

    let mut result = RunResult::new();
    match engine.run_into(&definitions, &mut result) {
        Ok(()) if result.is_success() => {
            if !args.json {
                println!("{}", result.summary());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(()) => {
            if !args.json {
                eprintln!("{}", result.summary());
            }
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            if !args.json && !result.invocations.is_empty() {
                eprintln!("{}", result.summary());
            }
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
