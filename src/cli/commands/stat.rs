//! Print the metadata of a node.

use clap::Arg;

use crate::cli::command::{Command, CommandBase, Streams};
use crate::error::{CliResult, ServiceError, ServiceErrorCode};

use super::{format_stat, not_parsed, parser, validate_path};

pub struct StatCommand {
    base: CommandBase,
    path: Option<String>,
}

impl StatCommand {
    pub fn new(streams: &Streams) -> Self {
        Self {
            base: CommandBase::new("stat", "path", streams),
            path: None,
        }
    }
}

impl Command for StatCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = parser("stat")
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
        let path = self.path.as_deref().ok_or_else(|| not_parsed("stat"))?;
        let client = self.base.client()?;

        let stat = client
            .exists(path)?
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        self.base.write_out(&format_stat(&stat))?;
        Ok(true)
    }
}
