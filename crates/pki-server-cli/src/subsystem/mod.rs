//! `<kind> config ...` and `<kind> group ...` commands.

mod config;
mod group;

use std::io::Write;

use pki_instance::{Instance, Subsystem, SubsystemKind};

use crate::cli::{SubsystemAction, SubsystemArgs};
use crate::context::RequestContext;
use crate::lifecycle::{LifecycleError, LifecycleOutput};

/// Runs one subsystem command. `usage` is printed alongside argument errors.
pub(crate) fn execute<W: Write>(
    kind: SubsystemKind,
    args: SubsystemArgs,
    context: &RequestContext<'_>,
    usage: &str,
    output: &mut LifecycleOutput<W>,
) -> Result<(), LifecycleError> {
    match args.action {
        SubsystemAction::Config { action } => config::execute(kind, action, context, usage, output),
        SubsystemAction::Group { action } => group::execute(kind, action, context, usage, output),
    }
}

fn load(context: &RequestContext<'_>, name: &str) -> Result<Instance, LifecycleError> {
    Ok(context.existing_instance(name)?.load()?)
}

/// Returns the `kind` subsystem hosted by `instance`.
fn installed(instance: &Instance, kind: SubsystemKind) -> Result<&Subsystem, LifecycleError> {
    instance
        .subsystem(kind)
        .ok_or_else(|| missing_subsystem(instance, kind))
}

fn installed_mut(
    instance: &mut Instance,
    kind: SubsystemKind,
) -> Result<&mut Subsystem, LifecycleError> {
    let name = instance.name().to_owned();
    instance
        .subsystem_mut(kind)
        .ok_or(LifecycleError::NoSuchSubsystem {
            subsystem: kind.label(),
            instance: name,
        })
}

fn missing_subsystem(instance: &Instance, kind: SubsystemKind) -> LifecycleError {
    LifecycleError::NoSuchSubsystem {
        subsystem: kind.label(),
        instance: instance.name().to_owned(),
    }
}

/// Unwraps a positional argument clap left optional.
fn required(
    value: Option<String>,
    argument: &'static str,
    usage: &str,
) -> Result<String, LifecycleError> {
    value.ok_or_else(|| LifecycleError::MissingArgument {
        argument,
        usage: usage.to_owned(),
    })
}
