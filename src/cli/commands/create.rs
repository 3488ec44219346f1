//! Create a node.

use clap::{Arg, ArgAction};

use crate::cli::command::{Command, CommandBase, Streams};
use crate::client::CreateMode;
use crate::error::CliResult;

use super::{not_parsed, parser, validate_path};

struct CreateOptions {
    path: String,
    data: Vec<u8>,
    mode: CreateMode,
}

pub struct CreateCommand {
    base: CommandBase,
    options: Option<CreateOptions>,
}

impl CreateCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("create", "[-s] [-e] path [data]", streams),
            options: None,
        }
    }

    fn parser() -> clap::Command {
        parser("create")
            .arg(Arg::new("sequential").short('s').action(ArgAction::SetTrue))
            .arg(Arg::new("ephemeral").short('e').action(ArgAction::SetTrue))
            .arg(Arg::new("path").required(true))
            .arg(Arg::new("data").allow_hyphen_values(true))
    }
}

impl Command for CreateCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = Self::parser().try_get_matches_from(args)?;

        let mut mode = CreateMode::empty();
        if matches.get_flag("sequential") {
            mode |= CreateMode::SEQUENTIAL;
        }
        if matches.get_flag("ephemeral") {
            mode |= CreateMode::EPHEMERAL;
        }

        let path = matches
            .get_one::<String>("path")
            .cloned()
            .unwrap_or_default();
        validate_path(&path, mode.contains(CreateMode::SEQUENTIAL))?;
        let data = matches
            .get_one::<String>("data")
            .map(|data| data.as_bytes().to_vec())
            .unwrap_or_default();

        self.options = Some(CreateOptions { path, data, mode });
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let options = self.options.as_ref().ok_or_else(|| not_parsed("create"))?;
        let client = self.base.client()?;

        let created = client.create(&options.path, &options.data, options.mode)?;
        self.base.write_out(&format!("Created {}\n", created))?;
        Ok(true)
    }
}
