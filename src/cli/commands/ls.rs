//! List the children of a node.

use clap::{Arg, ArgAction};

use crate::cli::command::{Command, CommandBase, Streams};
use crate::client::Client;
use crate::error::CliResult;

use super::{child_path, format_children, format_stat, not_parsed, parser, validate_path};

struct LsOptions {
    path: String,
    with_stat: bool,
    recursive: bool,
}

pub struct LsCommand {
    base: CommandBase,
    options: Option<LsOptions>,
}

impl LsCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("ls", "[-s] [-R] path", streams),
            options: None,
        }
    }

    fn parser() -> clap::Command {
        parser("ls")
            .arg(Arg::new("stat").short('s').action(ArgAction::SetTrue))
            .arg(Arg::new("recursive").short('R').action(ArgAction::SetTrue))
            .arg(Arg::new("path").required(true))
    }
}

/// Depth-first listing of `path` and everything below it.
fn list_recursive(client: &dyn Client, path: &str, output: &mut String) -> CliResult<()> {
    output.push_str(path);
    output.push('\n');
    for child in client.get_children(path)? {
        list_recursive(client, &child_path(path, &child), output)?;
    }
    Ok(())
}

impl Command for LsCommand {
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

        self.options = Some(LsOptions {
            path,
            with_stat: matches.get_flag("stat"),
            recursive: matches.get_flag("recursive"),
        });
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let options = self.options.as_ref().ok_or_else(|| not_parsed("ls"))?;
        let client = self.base.client()?;

        let mut output = String::new();
        if options.recursive {
            list_recursive(client.as_ref(), &options.path, &mut output)?;
        } else {
            let children = client.get_children(&options.path)?;
            output.push_str(&format_children(&children));
            output.push('\n');
        }
        if options.with_stat {
            let (_, stat) = client.get_data(&options.path)?;
            output.push_str(&format_stat(&stat));
        }

        self.base.write_out(&output)?;
        Ok(true)
    }
}
