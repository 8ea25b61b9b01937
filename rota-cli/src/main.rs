//! Entry point for the `rota` command-line interface.
#![forbid(unsafe_code)]

use std::io::Write;
use std::process::ExitCode;

use rota_cli::CliError;

fn main() -> ExitCode {
    match rota_cli::run() {
        Ok(completion) => completion.exit_code(),
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            let report = eyre::Report::new(err);
            writeln!(std::io::stderr().lock(), "rota: {report:?}").ok();
            ExitCode::FAILURE
        }
    }
}
