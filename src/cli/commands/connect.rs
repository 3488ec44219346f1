//! Session management commands.
//!
//! These act on the shell's `Session` rather than on the bound client. The
//! dispatcher notices the session changed and rebinds every command.

use clap::Arg;

use crate::cli::command::{Command, CommandBase, Streams};
use crate::client::SharedSession;
use crate::error::{CliError, CliResult};

use super::{not_parsed, parser};

/// Check a `host:port[,host:port...]` connection string.
pub(crate) fn validate_server(server: &str) -> CliResult<()> {
    let invalid = || CliError::MalformedArguments(format!("Invalid connection string: {}", server));

    if server.is_empty() {
        return Err(invalid());
    }
    for address in server.split(',') {
        let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        port.parse::<u16>().map_err(|_| invalid())?;
    }
    Ok(())
}

/// Close the current session and connect to another server.
pub struct ConnectCommand {
    base: CommandBase,
    session: SharedSession,
    server: Option<String>,
}

impl ConnectCommand {
    pub fn new(streams: &Streams, session: SharedSession) -> Self {
        Self {
            base: CommandBase::new("connect", "host:port", streams),
            session,
            server: None,
        }
    }
}

impl Command for ConnectCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = parser("connect")
            .arg(Arg::new("server").required(true))
            .try_get_matches_from(args)?;
        let server = matches
            .get_one::<String>("server")
            .cloned()
            .unwrap_or_default();
        validate_server(&server)?;

        self.server = Some(server);
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let server = self.server.as_deref().ok_or_else(|| not_parsed("connect"))?;
        self.session.borrow_mut().connect(server)?;
        Ok(true)
    }
}

/// Close the current session, keeping the shell running.
pub struct CloseCommand {
    base: CommandBase,
    session: SharedSession,
}

impl CloseCommand {
    pub fn new(streams: &Streams, session: SharedSession) -> Self {
        Self {
            base: CommandBase::new("close", "(no options)", streams),
            session,
        }
    }
}

impl Command for CloseCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        parser("close").try_get_matches_from(args)?;
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        self.session.borrow_mut().close()?;
        Ok(true)
    }
}
