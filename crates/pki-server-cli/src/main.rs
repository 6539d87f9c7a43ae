//! Entry point for the `pki-server` instance management tool.
//!
//! The binary delegates to [`pki_server_cli::run`], which loads configuration,
//! parses the command line, and drives the lifecycle controller or status
//! aggregator for the selected instance.

use std::io::{self, IsTerminal, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdout_is_terminal = io::stdout().is_terminal();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    pki_server_cli::run(
        std::env::args_os(),
        &mut stdout,
        &mut stderr,
        stdout_is_terminal,
    )
}
