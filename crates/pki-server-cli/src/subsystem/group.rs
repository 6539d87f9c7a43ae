//! Subsystem group listing and membership.

use std::io::Write;

use pki_instance::{FileGroupDirectory, GroupDirectory, SubsystemKind};
use tracing::info;

use super::{installed, load, required};
use crate::cli::{GroupAction, MemberAction};
use crate::context::RequestContext;
use crate::lifecycle::{LifecycleError, LifecycleOutput};

const GROUP_ID: &str = "group ID";
const MEMBER_ID: &str = "member ID";

pub(super) fn execute<W: Write>(
    kind: SubsystemKind,
    action: GroupAction,
    context: &RequestContext<'_>,
    usage: &str,
    output: &mut LifecycleOutput<W>,
) -> Result<(), LifecycleError> {
    match action {
        GroupAction::Find(selector) => {
            let directory = open_directory(context, kind, &selector.instance)?;
            write_blocks(output, "Group ID", &directory.groups()?)
        }
        GroupAction::Member {
            action: MemberAction::Find { group, instance },
        } => {
            let group = required(group, GROUP_ID, usage)?;
            let directory = open_directory(context, kind, &instance.instance)?;
            write_blocks(output, "User ID", &directory.members(&group)?)
        }
        GroupAction::Member {
            action:
                MemberAction::Add {
                    group,
                    member,
                    instance,
                },
        } => {
            let group = required(group, GROUP_ID, usage)?;
            let member = required(member, MEMBER_ID, usage)?;
            let mut directory = open_directory(context, kind, &instance.instance)?;
            info!(
                target: "pki_server_cli::subsystem::group",
                "Adding {member} into {group}"
            );
            directory.add_member(&group, &member)?;
            Ok(())
        }
    }
}

fn open_directory(
    context: &RequestContext<'_>,
    kind: SubsystemKind,
    name: &str,
) -> Result<FileGroupDirectory, LifecycleError> {
    let instance = load(context, name)?;
    installed(&instance, kind)?;
    let path = instance.paths().group_store_path(kind.as_str());
    Ok(FileGroupDirectory::open(path)?)
}

/// Prints one `  <label>: <id>` line per entry with blank lines between.
fn write_blocks<W: Write>(
    output: &mut LifecycleOutput<W>,
    label: &str,
    entries: &[String],
) -> Result<(), LifecycleError> {
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            output.stdout_line(format_args!(""))?;
        }
        output.stdout_line(format_args!("  {label}: {entry}"))?;
    }
    Ok(())
}
