//! Replace the data of a node.

use clap::{Arg, ArgAction};

use crate::cli::command::{Command, CommandBase, Streams};
use crate::error::CliResult;

use super::{format_stat, not_parsed, parser, validate_path};

struct SetOptions {
    path: String,
    data: Vec<u8>,
    version: Option<i32>,
    with_stat: bool,
}

pub struct SetCommand {
    base: CommandBase,
    options: Option<SetOptions>,
}

impl SetCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("set", "[-s] [-v version] path data", streams),
            options: None,
        }
    }

    fn parser() -> clap::Command {
        parser("set")
            .arg(Arg::new("stat").short('s').action(ArgAction::SetTrue))
            .arg(
                Arg::new("version")
                    .short('v')
                    .value_parser(clap::value_parser!(i32))
                    .allow_negative_numbers(true),
            )
            .arg(Arg::new("path").required(true))
            .arg(Arg::new("data").required(true).allow_hyphen_values(true))
    }
}

impl Command for SetCommand {
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

        self.options = Some(SetOptions {
            path,
            data: matches
                .get_one::<String>("data")
                .map(|data| data.as_bytes().to_vec())
                .unwrap_or_default(),
            version: matches.get_one::<i32>("version").copied(),
            with_stat: matches.get_flag("stat"),
        });
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let options = self.options.as_ref().ok_or_else(|| not_parsed("set"))?;
        let client = self.base.client()?;

        let stat = client.set_data(&options.path, &options.data, options.version)?;
        if options.with_stat {
            self.base.write_out(&format_stat(&stat))?;
        }
        Ok(true)
    }
}
