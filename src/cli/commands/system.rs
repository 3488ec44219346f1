//! Quit command - leave the shell.

use crate::cli::command::{Command, CommandBase, Streams};
use crate::error::CliResult;

use super::parser;

pub struct QuitCommand {
    base: CommandBase,
}

impl QuitCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("quit", "(no options)", streams),
        }
    }
}

impl Command for QuitCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        parser("quit").try_get_matches_from(args)?;
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        Ok(false)
    }
}
