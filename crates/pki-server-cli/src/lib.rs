//! Command-line runtime for managing PKI server instances.
//!
//! The module owns argument parsing, configuration bootstrapping, and command
//! dispatch. Configuration loading, process launching, activity checking and
//! the IO streams are all injected so the runtime can be exercised from the
//! binary entrypoint and from tests alike.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

mod cli;
mod command;
mod commands;
mod config;
mod context;
mod errors;
mod lifecycle;
mod status;
mod subsystem;
mod telemetry;

pub use cli::{OutputFormat, ResolvedOutputFormat};

use cli::Cli;
use command::CommandTree;
use config::{ConfigArgumentSplit, prepare_cli_arguments, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use context::{RequestContext, Verbosity};
pub(crate) use errors::AppError;
use lifecycle::{
    ActivityCheck, LifecycleController, LifecycleOutput, NetworkCheck, ProcessLauncher,
    SystemLauncher,
};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `pki_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--instance-root",
    "--server-command",
    "--log-filter",
    "--log-format",
    "--connect-timeout-secs",
];

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E, stdout_is_terminal: bool) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }

    pub(crate) const fn stdout_is_terminal(&self) -> bool {
        self.stdout_is_terminal
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, C: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a C,
}

impl<'a, 'io, W, E, C> CliRunner<'a, 'io, W, E, C>
where
    W: Write,
    E: Write,
    C: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a C) -> Self {
        Self { io, loader }
    }

    fn run<I, L, P>(&mut self, args: I, launcher: L, activity: P) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        L: ProcessLauncher,
        P: ActivityCheck,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli = match Cli::try_parse_from(prepare_cli_arguments(&args, &split)) {
            Ok(cli) => cli,
            Err(error) => return self.report_parse_error(error),
        };

        match self.execute(cli, &split, launcher, activity) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                let _ = writeln!(self.io.stderr, "ERROR: {error}");
                if let Some(usage) = error.usage() {
                    let _ = writeln!(self.io.stderr, "{usage}");
                }
                ExitCode::FAILURE
            }
        }
    }

    /// Help and version requests go to stdout and succeed; anything else is a
    /// usage error.
    fn report_parse_error(&mut self, error: clap::Error) -> ExitCode {
        if !error.use_stderr() {
            let _ = write!(self.io.stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        let error = AppError::CliUsage(error);
        let _ = write!(self.io.stderr, "{error}");
        ExitCode::FAILURE
    }

    fn execute<L, P>(
        &mut self,
        cli: Cli,
        split: &ConfigArgumentSplit,
        launcher: L,
        activity: P,
    ) -> Result<(), AppError>
    where
        L: ProcessLauncher,
        P: ActivityCheck,
    {
        let config = self.loader.load(&split.config_arguments)?;
        let commands = CommandTree::standard();
        let context = RequestContext {
            config: &config,
            commands: &commands,
            verbosity: Verbosity::from_flags(cli.verbose, cli.debug),
            stdout_is_terminal: self.io.stdout_is_terminal(),
        };
        let _telemetry = telemetry::install(context.config, context.verbosity)?;

        let node = context.commands.lookup(cli.command.path()).unwrap_or(command::ROOT);
        info!(
            target: "pki_server_cli",
            command = %context.commands.qualified_name(node),
            summary = context.commands.summary(node).unwrap_or_default(),
            "Command"
        );
        let usage = context.commands.usage(node);

        let mut controller = LifecycleController::new(launcher, activity, config.server_command());
        let mut output = LifecycleOutput::new(&mut *self.io.stdout);
        let result =
            commands::dispatch(cli.command, &context, &usage, &mut controller, &mut output);
        if let Err(failure) = &result {
            error!(target: "pki_server_cli", error = %failure, "command failed");
        }
        result.map_err(AppError::from)
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E, stdout_is_terminal: bool) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr, stdout_is_terminal);
    run_with_collaborators(args, &mut io, &OrthoConfigLoader, SystemLauncher, NetworkCheck)
}

/// Runs the CLI with injected configuration, launcher and activity check.
pub(crate) fn run_with_collaborators<I, W, E, C, L, P>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &C,
    launcher: L,
    activity: P,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    C: ConfigLoader,
    L: ProcessLauncher,
    P: ActivityCheck,
{
    CliRunner::new(io, loader).run(args, launcher, activity)
}

#[cfg(test)]
mod tests;
