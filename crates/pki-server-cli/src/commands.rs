//! Dispatch of parsed commands to the controller, status aggregator and
//! subsystem handlers.

use std::io::Write;
use std::time::Duration;

use pki_instance::{
    DEFAULT_INSTANCE_GROUP, DEFAULT_INSTANCE_USER, InstanceSettings, SubsystemKind,
};

use crate::cli::{CliCommand, CreateArgs, RunArgs, StatusArgs, WaitArgs};
use crate::context::RequestContext;
use crate::lifecycle::{
    ActivityCheck, Debugger, LaunchModifiers, LifecycleController, LifecycleError,
    LifecycleOutput, ProcessLauncher, Transition, WaitOptions,
};
use crate::{status, subsystem};

/// Executes `command`; `usage` names the selected command for argument errors.
pub(crate) fn dispatch<L, P, W>(
    command: CliCommand,
    context: &RequestContext<'_>,
    usage: &str,
    controller: &mut LifecycleController<L, P>,
    output: &mut LifecycleOutput<W>,
) -> Result<(), LifecycleError>
where
    L: ProcessLauncher,
    P: ActivityCheck,
    W: Write,
{
    match command {
        CliCommand::Create(args) => create(context, controller, args),
        CliCommand::Remove(args) => {
            let handle = context.instance(&args.instance)?;
            controller.remove(&handle, args.force)
        }
        CliCommand::Status(args) => status(context, controller, &args, output),
        CliCommand::Start(args) => {
            let handle = context.existing_instance(&args.instance)?;
            let transition = controller.start(&handle, wait_options(context, &args))?;
            report_transition(output, transition, "started")
        }
        CliCommand::Stop(args) => {
            let handle = context.existing_instance(&args.instance)?;
            let transition = controller.stop(&handle, wait_options(context, &args))?;
            report_transition(output, transition, "stopped")
        }
        CliCommand::Restart(args) => {
            let handle = context.existing_instance(&args.instance)?;
            let options = wait_options(context, &args);
            controller.restart(&handle, options, options)
        }
        CliCommand::Run(args) => {
            let handle = context.existing_instance(&args.instance)?;
            controller.run(&handle, &launch_modifiers(args))
        }
        CliCommand::Ca(args) => {
            subsystem::execute(SubsystemKind::Ca, args, context, usage, output)
        }
        CliCommand::Kra(args) => {
            subsystem::execute(SubsystemKind::Kra, args, context, usage, output)
        }
        CliCommand::Ocsp(args) => {
            subsystem::execute(SubsystemKind::Ocsp, args, context, usage, output)
        }
        CliCommand::Tks(args) => {
            subsystem::execute(SubsystemKind::Tks, args, context, usage, output)
        }
        CliCommand::Tps(args) => {
            subsystem::execute(SubsystemKind::Tps, args, context, usage, output)
        }
        CliCommand::Acme(args) => {
            subsystem::execute(SubsystemKind::Acme, args, context, usage, output)
        }
        CliCommand::Est(args) => {
            subsystem::execute(SubsystemKind::Est, args, context, usage, output)
        }
    }
}

fn create<L: ProcessLauncher, P: ActivityCheck>(
    context: &RequestContext<'_>,
    controller: &mut LifecycleController<L, P>,
    args: CreateArgs,
) -> Result<(), LifecycleError> {
    let handle = context.instance(&args.instance)?;
    let settings = InstanceSettings {
        user: args.user.unwrap_or_else(|| DEFAULT_INSTANCE_USER.to_owned()),
        group: args.group.unwrap_or_else(|| DEFAULT_INSTANCE_GROUP.to_owned()),
        ..InstanceSettings::default()
    };
    controller.create(&handle, &settings, args.force)?;
    Ok(())
}

fn status<L, P, W>(
    context: &RequestContext<'_>,
    controller: &LifecycleController<L, P>,
    args: &StatusArgs,
    output: &mut LifecycleOutput<W>,
) -> Result<(), LifecycleError>
where
    L: ProcessLauncher,
    P: ActivityCheck,
    W: Write,
{
    let instance = context.existing_instance(&args.instance)?.load()?;
    let active = controller.is_active(&instance, context.connect_timeout(None))?;
    let report = status::build_report(&instance, active, &status::local_hostname());
    let format = args.output.resolve(context.stdout_is_terminal);
    status::render_report(&report, format, &mut output.stdout)
}

fn wait_options(context: &RequestContext<'_>, args: &WaitArgs) -> WaitOptions {
    WaitOptions {
        wait: args.wait,
        max_wait: Duration::from_secs(args.max_wait),
        per_attempt: context.connect_timeout(args.timeout),
    }
}

fn launch_modifiers(args: RunArgs) -> LaunchModifiers {
    let debugger = if args.with_jdb {
        Some(Debugger::Jdb)
    } else if args.with_gdb {
        Some(Debugger::Gdb)
    } else if args.with_valgrind {
        Some(Debugger::Valgrind)
    } else {
        None
    };
    LaunchModifiers {
        as_current_user: args.as_current_user,
        debugger,
        agentpath: args.agentpath,
    }
}

fn report_transition<W: Write>(
    output: &mut LifecycleOutput<W>,
    transition: Transition,
    state: &str,
) -> Result<(), LifecycleError> {
    match transition {
        Transition::AlreadyInState => output.stdout_line(format_args!("Instance already {state}")),
        Transition::Changed => Ok(()),
    }
}
