//! Subsystem configuration parameters.

use std::io::Write;

use pki_instance::SubsystemKind;
use tracing::debug;

use super::{installed, installed_mut, load, required};
use crate::cli::ConfigAction;
use crate::context::RequestContext;
use crate::lifecycle::{LifecycleError, LifecycleOutput};

const PARAMETER_NAME: &str = "parameter name";
const PARAMETER_VALUE: &str = "parameter value";

pub(super) fn execute<W: Write>(
    kind: SubsystemKind,
    action: ConfigAction,
    context: &RequestContext<'_>,
    usage: &str,
    output: &mut LifecycleOutput<W>,
) -> Result<(), LifecycleError> {
    match action {
        ConfigAction::Find(selector) => {
            let instance = load(context, &selector.instance)?;
            for (name, value) in installed(&instance, kind)?.config().find() {
                output.stdout_line(format_args!("{name}={value}"))?;
            }
            Ok(())
        }
        ConfigAction::Show { name, instance } => {
            let name = required(name, PARAMETER_NAME, usage)?;
            let instance = load(context, &instance.instance)?;
            match installed(&instance, kind)?.config().get(&name) {
                Some(value) => output.stdout_line(format_args!("{value}")),
                None => Err(LifecycleError::NoSuchParameter { name }),
            }
        }
        ConfigAction::Set {
            name,
            value,
            instance,
        } => {
            let name = required(name, PARAMETER_NAME, usage)?;
            let value = required(value, PARAMETER_VALUE, usage)?;
            let mut instance = load(context, &instance.instance)?;
            let subsystem = installed_mut(&mut instance, kind)?;
            subsystem.config_mut().set(name.as_str(), value)?;
            subsystem.config().persist()?;
            debug!(
                target: "pki_server_cli::subsystem::config",
                subsystem = kind.as_str(),
                parameter = name.as_str(),
                "parameter updated"
            );
            Ok(())
        }
        ConfigAction::Unset { name, instance } => {
            let name = required(name, PARAMETER_NAME, usage)?;
            let mut instance = load(context, &instance.instance)?;
            let subsystem = installed_mut(&mut instance, kind)?;
            if subsystem.config_mut().unset(&name) {
                subsystem.config().persist()?;
            }
            Ok(())
        }
    }
}
