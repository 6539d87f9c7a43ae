//! Command-line argument definitions for `pki-server`.
//!
//! clap parses the arguments; the explicit command tree in [`crate::command`]
//! supplies qualified names and usage lines for diagnostics.

use clap::{Args, Parser, Subcommand, ValueEnum};
use pki_config::{DEFAULT_INSTANCE_NAME, DEFAULT_MAX_WAIT_SECS};
use pki_instance::SubsystemKind;

/// Output format selection for the status report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `human` for terminal output and `json` for redirected output.
    Auto,
    /// Always render the indented text report.
    #[default]
    Human,
    /// Always emit the report as JSON.
    Json,
}

/// Output format after resolving `auto` based on TTY detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedOutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    /// Resolves the output format based on whether stdout is a terminal.
    #[must_use]
    pub fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto if stdout_is_terminal => ResolvedOutputFormat::Human,
            Self::Auto => ResolvedOutputFormat::Json,
            Self::Human => ResolvedOutputFormat::Human,
            Self::Json => ResolvedOutputFormat::Json,
        }
    }
}

/// Command-line interface for PKI server instances.
#[derive(Parser, Debug)]
#[command(name = "pki-server", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Run in verbose mode.
    #[arg(short = 'v', long, global = true)]
    pub(crate) verbose: bool,
    /// Show debug messages.
    #[arg(long, global = true)]
    pub(crate) debug: bool,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Create PKI server.
    Create(CreateArgs),
    /// Remove PKI server.
    Remove(RemoveArgs),
    /// Display PKI service status.
    Status(StatusArgs),
    /// Start PKI server.
    Start(WaitArgs),
    /// Stop PKI server.
    Stop(WaitArgs),
    /// Restart PKI server.
    Restart(WaitArgs),
    /// Run PKI server in the foreground.
    Run(RunArgs),
    /// CA management commands.
    Ca(SubsystemArgs),
    /// KRA management commands.
    Kra(SubsystemArgs),
    /// OCSP management commands.
    Ocsp(SubsystemArgs),
    /// TKS management commands.
    Tks(SubsystemArgs),
    /// TPS management commands.
    Tps(SubsystemArgs),
    /// ACME management commands.
    Acme(SubsystemArgs),
    /// EST management commands.
    Est(SubsystemArgs),
}

impl CliCommand {
    /// Names of the selected command path, root first.
    pub(crate) fn path(&self) -> Vec<&'static str> {
        match self {
            Self::Create(_) => vec!["create"],
            Self::Remove(_) => vec!["remove"],
            Self::Status(_) => vec!["status"],
            Self::Start(_) => vec!["start"],
            Self::Stop(_) => vec!["stop"],
            Self::Restart(_) => vec!["restart"],
            Self::Run(_) => vec!["run"],
            Self::Ca(args) => args.path(SubsystemKind::Ca),
            Self::Kra(args) => args.path(SubsystemKind::Kra),
            Self::Ocsp(args) => args.path(SubsystemKind::Ocsp),
            Self::Tks(args) => args.path(SubsystemKind::Tks),
            Self::Tps(args) => args.path(SubsystemKind::Tps),
            Self::Acme(args) => args.path(SubsystemKind::Acme),
            Self::Est(args) => args.path(SubsystemKind::Est),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CreateArgs {
    /// Process owner.
    #[arg(long, value_name = "NAME")]
    pub(crate) user: Option<String>,
    /// Process group.
    #[arg(long, value_name = "NAME")]
    pub(crate) group: Option<String>,
    /// Force creation.
    #[arg(long)]
    pub(crate) force: bool,
    /// Instance ID.
    #[arg(value_name = "INSTANCE_ID", default_value = DEFAULT_INSTANCE_NAME)]
    pub(crate) instance: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RemoveArgs {
    /// Force removal.
    #[arg(long)]
    pub(crate) force: bool,
    /// Instance ID.
    #[arg(value_name = "INSTANCE_ID", default_value = DEFAULT_INSTANCE_NAME)]
    pub(crate) instance: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct StatusArgs {
    /// Controls how the report is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) output: OutputFormat,
    /// Instance ID.
    #[arg(value_name = "INSTANCE_ID", default_value = DEFAULT_INSTANCE_NAME)]
    pub(crate) instance: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct WaitArgs {
    /// Wait until the operation completes.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Maximum wait time in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_MAX_WAIT_SECS)]
    pub(crate) max_wait: u64,
    /// Connection timeout in seconds for each readiness check.
    #[arg(long, value_name = "SECONDS")]
    pub(crate) timeout: Option<u64>,
    /// Instance ID.
    #[arg(value_name = "INSTANCE_ID", default_value = DEFAULT_INSTANCE_NAME)]
    pub(crate) instance: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RunArgs {
    /// Run as the current user.
    #[arg(long)]
    pub(crate) as_current_user: bool,
    /// Run with the Java debugger.
    #[arg(long, group = "debugger")]
    pub(crate) with_jdb: bool,
    /// Run with the GNU debugger.
    #[arg(long, group = "debugger")]
    pub(crate) with_gdb: bool,
    /// Run with Valgrind.
    #[arg(long, group = "debugger")]
    pub(crate) with_valgrind: bool,
    /// Java agent path.
    #[arg(long, value_name = "PATH")]
    pub(crate) agentpath: Option<String>,
    /// Instance ID.
    #[arg(value_name = "INSTANCE_ID", default_value = DEFAULT_INSTANCE_NAME)]
    pub(crate) instance: String,
}

/// Instance selector shared by subsystem commands.
#[derive(Args, Debug, Clone)]
pub(crate) struct InstanceArg {
    /// Instance ID.
    #[arg(
        short = 'i',
        long = "instance",
        value_name = "INSTANCE_ID",
        default_value = DEFAULT_INSTANCE_NAME
    )]
    pub(crate) instance: String,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SubsystemArgs {
    #[command(subcommand)]
    pub(crate) action: SubsystemAction,
}

impl SubsystemArgs {
    fn path(&self, kind: SubsystemKind) -> Vec<&'static str> {
        let mut path = vec![kind.as_str()];
        path.extend(self.action.path());
        path
    }
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum SubsystemAction {
    /// Subsystem configuration management commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Subsystem group management commands.
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },
}

impl SubsystemAction {
    fn path(&self) -> Vec<&'static str> {
        match self {
            Self::Config { action } => vec!["config", action.name()],
            Self::Group { action } => {
                let mut path = vec!["group"];
                path.extend(action.path());
                path
            }
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ConfigAction {
    /// Find subsystem configuration parameters.
    Find(InstanceArg),
    /// Show subsystem configuration parameter.
    Show {
        /// Parameter name.
        #[arg(value_name = "NAME")]
        name: Option<String>,
        #[command(flatten)]
        instance: InstanceArg,
    },
    /// Set subsystem configuration parameter.
    Set {
        /// Parameter name.
        #[arg(value_name = "NAME")]
        name: Option<String>,
        /// Parameter value.
        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: Option<String>,
        #[command(flatten)]
        instance: InstanceArg,
    },
    /// Unset subsystem configuration parameter.
    Unset {
        /// Parameter name.
        #[arg(value_name = "NAME")]
        name: Option<String>,
        #[command(flatten)]
        instance: InstanceArg,
    },
}

impl ConfigAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Find(_) => "find",
            Self::Show { .. } => "show",
            Self::Set { .. } => "set",
            Self::Unset { .. } => "unset",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum GroupAction {
    /// Find groups.
    Find(InstanceArg),
    /// Group member management commands.
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
}

impl GroupAction {
    fn path(&self) -> Vec<&'static str> {
        match self {
            Self::Find(_) => vec!["find"],
            Self::Member { action } => vec!["member", action.name()],
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum MemberAction {
    /// Find group members.
    Find {
        /// Group ID.
        #[arg(value_name = "GROUP_ID")]
        group: Option<String>,
        #[command(flatten)]
        instance: InstanceArg,
    },
    /// Add group member.
    Add {
        /// Group ID.
        #[arg(value_name = "GROUP_ID")]
        group: Option<String>,
        /// Member ID.
        #[arg(value_name = "MEMBER_ID")]
        member: Option<String>,
        #[command(flatten)]
        instance: InstanceArg,
    },
}

impl MemberAction {
    fn name(&self) -> &'static str {
        match self {
            Self::Find { .. } => "find",
            Self::Add { .. } => "add",
        }
    }
}
