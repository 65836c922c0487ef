//! taskboard - task prioritization and sprint planning

use std::process::ExitCode;

fn main() -> ExitCode {
    taskboard::cli::run()
}
