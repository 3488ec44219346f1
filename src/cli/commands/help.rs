//! Help command - displays available commands and their usage.

use clap::Arg;

use crate::cli::command::{Command, CommandBase, Streams};
use crate::cli::registry::SharedUsage;
use crate::error::{CliError, CliResult};

use super::parser;

/// Help command implementation.
///
/// Reads the registry's live usage index, so commands registered after
/// `help` itself are listed too.
pub struct HelpCommand {
    base: CommandBase,
    usage: SharedUsage,
    topic: Option<String>,
}

impl HelpCommand {
    pub fn new(streams: &Streams, usage: SharedUsage) -> Self {
        Self {
            base: CommandBase::new("help", "[command]", streams),
            usage,
            topic: None,
        }
    }
}

impl Command for HelpCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = parser("help")
            .arg(Arg::new("command"))
            .try_get_matches_from(args)?;
        let topic = matches.get_one::<String>("command").cloned();
        if let Some(token) = topic.as_deref() {
            if !self.usage.borrow().contains_key(token) {
                return Err(CliError::MalformedArguments(format!(
                    "Unknown command: {}",
                    token
                )));
            }
        }

        self.topic = topic;
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let usage = self.usage.borrow();
        let output = match self.topic.as_deref() {
            Some(token) => format!("{}\n", usage.get(token).map_or(token, String::as_str)),
            None => {
                let mut output = String::from("zkcli -server host:port cmd args\n");
                for line in usage.values() {
                    output.push('\t');
                    output.push_str(line);
                    output.push('\n');
                }
                output
            }
        };

        self.base.write_out(&output)?;
        Ok(true)
    }
}
