//! Command history management and history command.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use clap::Arg;

use crate::cli::command::{Command, CommandBase, Streams};
use crate::error::CliResult;

use super::parser;

/// Default number of history entries to keep.
pub const DEFAULT_HISTORY_SIZE: usize = 32;

/// History shared between the dispatcher and the `history` command.
pub type SharedHistory = Rc<RefCell<CommandHistory>>;

/// Command history buffer.
pub struct CommandHistory {
    /// Stored (number, line) pairs, newest at back.
    entries: VecDeque<(usize, String)>,
    /// Number given to the next line pushed.
    next_number: usize,
    capacity: usize,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_number: 1,
            capacity: capacity.max(1),
        }
    }

    pub fn into_shared(self) -> SharedHistory {
        Rc::new(RefCell::new(self))
    }

    /// Add a line to history.
    pub fn push(&mut self, line: &str) {
        // Don't add empty lines or repeats of the last line
        if line.is_empty() {
            return;
        }
        if let Some((_, last)) = self.entries.back() {
            if last == line {
                return;
            }
        }

        self.entries.push_back((self.next_number, line.to_string()));
        self.next_number += 1;

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Get all history entries (oldest first) with their line numbers.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(n, line)| (*n, line.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

/// History command implementation.
pub struct HistoryCommand {
    base: CommandBase,
    history: SharedHistory,
    clear: bool,
}

impl HistoryCommand {
    pub fn new(streams: &Streams, history: SharedHistory) -> Self {
        Self {
            base: CommandBase::new("history", "[clear]", streams),
            history,
            clear: false,
        }
    }
}

impl Command for HistoryCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command> {
        let matches = parser("history")
            .arg(Arg::new("action").value_parser(["clear"]))
            .try_get_matches_from(args)?;
        self.clear = matches.get_one::<String>("action").is_some();
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        if self.clear {
            self.history.borrow_mut().clear();
            self.base.write_out("History cleared.\n")?;
            return Ok(true);
        }

        let history = self.history.borrow();
        let mut output = String::new();
        for (number, line) in history.entries() {
            output.push_str(&format!("  {:3}  {}\n", number, line));
        }
        drop(history);

        self.base.write_out(&output)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_skips_empty_and_repeats() {
        let mut history = CommandHistory::new(8);
        history.push("ls /");
        history.push("ls /");
        history.push("");
        history.push("get /a");
        let lines: Vec<_> = history.entries().collect();
        assert_eq!(lines, vec![(1, "ls /"), (2, "get /a")]);
    }

    #[test]
    fn test_capacity_evicts_oldest_but_keeps_numbers() {
        let mut history = CommandHistory::new(2);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.len(), 2);
        let lines: Vec<_> = history.entries().collect();
        assert_eq!(lines, vec![(2, "b"), (3, "c")]);

        history.clear();
        assert!(history.is_empty());
        history.push("d");
        assert_eq!(history.entries().next(), Some((4, "d")));
    }
}
