//! texpipe - Command-line tool for packing asset directories with TexturePacker

use std::process::ExitCode;

use texpipe::cli;

fn main() -> ExitCode {
    cli::run()
}
