//! Command implementations.
//!
//! Each command is defined in its own module file. `default_registry` wires
//! them all up for the interactive shell.

pub mod connect;
pub mod create;
pub mod delete;
pub mod get;
pub mod help;
pub mod history;
pub mod ls;
pub mod set;
pub mod stat;
pub mod system;

pub use connect::{CloseCommand, ConnectCommand};
pub use create::CreateCommand;
pub use delete::{DeleteAllCommand, DeleteCommand};
pub use get::GetCommand;
pub use help::HelpCommand;
pub use history::{CommandHistory, HistoryCommand, SharedHistory};
pub use ls::LsCommand;
pub use set::SetCommand;
pub use stat::StatCommand;
pub use system::QuitCommand;

use crate::cli::command::{Command, Streams};
use crate::cli::registry::CommandRegistry;
use crate::client::{SharedSession, Stat};
use crate::error::{CliError, CliResult};

/// Build a registry holding every shell command.
pub fn default_registry(
    streams: &Streams,
    session: &SharedSession,
    history: &SharedHistory,
) -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    Box::new(LsCommand::new(streams)).register_into(&mut registry);
    Box::new(CreateCommand::new(streams)).register_into(&mut registry);
    Box::new(GetCommand::new(streams)).register_into(&mut registry);
    Box::new(SetCommand::new(streams)).register_into(&mut registry);
    Box::new(StatCommand::new(streams)).register_into(&mut registry);
    Box::new(DeleteCommand::new(streams)).register_into(&mut registry);
    Box::new(DeleteAllCommand::new(streams)).register_into(&mut registry);
    Box::new(ConnectCommand::new(streams, session.clone())).register_into(&mut registry);
    Box::new(CloseCommand::new(streams, session.clone())).register_into(&mut registry);
    Box::new(HistoryCommand::new(streams, history.clone())).register_into(&mut registry);
    Box::new(QuitCommand::new(streams)).register_into(&mut registry);
    Box::new(HelpCommand::new(streams, registry.shared_usage())).register_into(&mut registry);
    registry
}

/// Argument parser skeleton shared by all commands.
fn parser(token: &'static str) -> clap::Command {
    clap::Command::new(token)
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
}

/// Reject anything that is not a well-formed absolute node path.
///
/// Sequential nodes may end in `/`; the service appends the counter.
pub(crate) fn validate_path(path: &str, sequential: bool) -> CliResult<()> {
    let invalid = |reason: &str| {
        Err(CliError::MalformedArguments(format!(
            "Invalid path string \"{}\" caused by {}",
            path, reason
        )))
    };

    if !path.starts_with('/') {
        return invalid("path must start with / character");
    }
    if path.len() == 1 {
        return if sequential {
            invalid("empty node name specified")
        } else {
            Ok(())
        };
    }
    if path.ends_with('/') && !sequential {
        return invalid("path must not end with / character");
    }

    let body = path.strip_suffix('/').unwrap_or(path);
    for segment in body[1..].split('/') {
        match segment {
            "" => return invalid("empty node name specified"),
            "." | ".." => return invalid("relative paths not allowed"),
            _ => {}
        }
        if segment.chars().any(|c| c.is_control()) {
            return invalid("invalid character");
        }
    }
    Ok(())
}

/// Join a parent path and a child name.
pub(crate) fn child_path(parent: &str, child: &str) -> String {
    if parent == "/" {
        format!("/{}", child)
    } else {
        format!("{}/{}", parent, child)
    }
}

fn format_time(millis: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(millis)
        .map(|time| time.format("%a %b %d %H:%M:%S UTC %Y").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Render node metadata, one `name = value` line per field.
pub(crate) fn format_stat(stat: &Stat) -> String {
    format!(
        "cZxid = 0x{:x}\n\
         ctime = {}\n\
         mZxid = 0x{:x}\n\
         mtime = {}\n\
         pZxid = 0x{:x}\n\
         cversion = {}\n\
         dataVersion = {}\n\
         aclVersion = {}\n\
         ephemeralOwner = 0x{:x}\n\
         dataLength = {}\n\
         numChildren = {}\n",
        stat.czxid,
        format_time(stat.ctime),
        stat.mzxid,
        format_time(stat.mtime),
        stat.pzxid,
        stat.cversion,
        stat.version,
        stat.aversion,
        stat.ephemeral_owner,
        stat.data_length,
        stat.num_children,
    )
}

/// Render child names the way `ls` prints them: `[a, b]`.
pub(crate) fn format_children(children: &[String]) -> String {
    format!("[{}]", children.join(", "))
}

/// Error for `execute` being called before any successful `parse`.
fn not_parsed(token: &str) -> CliError {
    CliError::MalformedArguments(format!("{}: arguments not parsed", token))
}
