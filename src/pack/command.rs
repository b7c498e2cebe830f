//! Argument vectors for the external packer.

use std::path::Path;

use super::parameter::ParameterSet;

/// Build the argument vector for one source subdirectory.
///
/// The layout is always
/// `--sheet <sheet> --data <data> [--<name> <args>...]* <source>`, with
/// parameters in insertion order. The executable name is not included.
/// Each element is meant to be passed to the process as a discrete argument;
/// no quoting is applied.
pub fn build_arguments(
    sheet: &Path,
    data: &Path,
    parameters: &ParameterSet,
    source: &Path,
) -> Vec<String> {
    let mut args = Vec::with_capacity(5 + parameters.len() * 2);

    args.push("--sheet".to_string());
    args.push(path_arg(sheet));
    args.push("--data".to_string());
    args.push(path_arg(data));

    for parameter in parameters {
        args.push(format!("--{}", parameter.name()));
        args.extend(parameter.args().iter().cloned());
    }

    args.push(path_arg(source));
    args
}

/// Render a command line for diagnostics: executable and arguments joined by
/// single spaces.
pub fn format_command_line(executable: &str, args: &[String]) -> String {
    let mut line = String::from(executable);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
