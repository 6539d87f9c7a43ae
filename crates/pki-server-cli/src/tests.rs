//! Runtime tests driving the CLI through injected collaborators.

mod status_commands;
mod support;
