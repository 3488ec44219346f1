//! Print the data of a node.

use clap::{Arg, ArgAction};

use crate::cli::command::{Command, CommandBase, Streams};
use crate::error::CliResult;

use super::{format_stat, not_parsed, parser, validate_path};

struct GetOptions {
    path: String,
    with_stat: bool,
}

pub struct GetCommand {
    base: CommandBase,
    options: Option<GetOptions>,
}

impl GetCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("get", "[-s] path", streams),
            options: None,
        }
    }

    fn parser() -> clap::Command {
        parser("get")
            .arg(Arg::new("stat").short('s').action(ArgAction::SetTrue))
            .arg(Arg::new("path").required(true))
    }
}

impl Command for GetCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = Self::parser().try_get_matches_from(args)?;
        let path = matches
            .get_one::<String>("path")
            .cloned()
            .unwrap_or_default();
        validate_path(&path, false)?;

        self.options = Some(GetOptions {
            path,
            with_stat: matches.get_flag("stat"),
        });
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let options = self.options.as_ref().ok_or_else(|| not_parsed("get"))?;
        let client = self.base.client()?;

        let (data, stat) = client.get_data(&options.path)?;
        let mut output = String::from_utf8_lossy(&data).into_owned();
        output.push('\n');
        if options.with_stat {
            output.push_str(&format_stat(&stat));
        }

        self.base.write_out(&output)?;
        Ok(true)
    }
}
