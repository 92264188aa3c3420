mod cli;
mod settings;

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = cli::run() {
        eprintln!("Error: {err:#}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
