//! Node removal commands.

use clap::Arg;

use crate::cli::command::{Command, CommandBase, Streams};
use crate::client::Client;
use crate::error::CliResult;

use super::{child_path, not_parsed, parser, validate_path};

struct DeleteOptions {
    path: String,
    version: Option<i32>,
}

/// Delete a single node.
pub struct DeleteCommand {
    base: CommandBase,
    options: Option<DeleteOptions>,
}

impl DeleteCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("delete", "[-v version] path", streams),
            options: None,
        }
    }

    fn parser() -> clap::Command {
        parser("delete")
            .arg(
                Arg::new("version")
                    .short('v')
                    .value_parser(clap::value_parser!(i32))
                    .allow_negative_numbers(true),
            )
            .arg(Arg::new("path").required(true))
    }
}

impl Command for DeleteCommand {
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

        self.options = Some(DeleteOptions {
            path,
            version: matches.get_one::<i32>("version").copied(),
        });
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let options = self.options.as_ref().ok_or_else(|| not_parsed("delete"))?;
        let client = self.base.client()?;

        client.delete(&options.path, options.version)?;
        Ok(true)
    }
}

/// Delete a node and everything below it.
pub struct DeleteAllCommand {
    base: CommandBase,
    path: Option<String>,
}

impl DeleteAllCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("deleteall", "path", streams),
            path: None,
        }
    }
}

/// Paths of the subtree rooted at `path`, parents before children.
fn collect_subtree(client: &dyn Client, path: &str) -> CliResult<Vec<String>> {
    let mut tree = vec![path.to_string()];
    let mut cursor = 0;
    while cursor < tree.len() {
        let parent = tree[cursor].clone();
        for child in client.get_children(&parent)? {
            tree.push(child_path(&parent, &child));
        }
        cursor += 1;
    }
    Ok(tree)
}

impl Command for DeleteAllCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = parser("deleteall")
            .arg(Arg::new("path").required(true))
            .try_get_matches_from(args)?;
        let path = matches
            .get_one::<String>("path")
            .cloned()
            .unwrap_or_default();
        validate_path(&path, false)?;

        self.path = Some(path);
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        let path = self.path.as_deref().ok_or_else(|| not_parsed("deleteall"))?;
        let client = self.base.client()?;

        let tree = collect_subtree(client.as_ref(), path)?;
        // The root itself cannot be removed, only emptied.
        for node in tree.iter().rev().filter(|node| node.as_str() != "/") {
            client.delete(node, None)?;
        }
        debug!("deleteall {} removed {} nodes", path, tree.len());
        Ok(true)
    }
}
