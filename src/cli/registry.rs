//! Command registry - token to command lookup.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::cli::command::Command;
use crate::client::ClientHandle;

/// Usage text of every registered command, keyed by token. Kept current by
/// the registry it came from.
pub type SharedUsage = Rc<RefCell<BTreeMap<String, String>>>;

/// Owns every registered command, keyed by invocation token.
///
/// Ordered by token so help listings are stable; lookups do not depend on it.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn Command>>,
    usage: SharedUsage,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command` under its token. The last registration wins; the
    /// displaced command is returned.
    pub fn insert(&mut self, command: Box<dyn Command>) -> Option<Box<dyn Command>> {
        let token = command.invocation_token().to_string();
        self.usage
            .borrow_mut()
            .insert(token.clone(), command.usage_text());
        let previous = self.commands.insert(token, command);
        if let Some(previous) = &previous {
            debug!("command '{}' re-registered", previous.invocation_token());
        }
        previous
    }

    /// Find a command by token.
    pub fn get(&self, token: &str) -> Option<&(dyn Command + 'static)> {
        self.commands.get(token).map(|command| command.as_ref())
    }

    pub fn get_mut(&mut self, token: &str) -> Option<&mut (dyn Command + 'static)> {
        self.commands.get_mut(token).map(|command| command.as_mut())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.commands.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over all registered commands, ordered by token.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Command + 'static)> + '_ {
        self.commands.values().map(|command| command.as_ref())
    }

    /// Point every command at `client`, or unbind them all with `None`.
    pub fn bind_client(&mut self, client: Option<&ClientHandle>) {
        for command in self.commands.values_mut() {
            command.bind_client(client);
        }
    }

    /// Usage text of every command, ordered by token.
    pub fn usage_lines(&self) -> Vec<String> {
        self.usage.borrow().values().cloned().collect()
    }

    /// Live view of the usage lines, updated on every registration.
    pub fn shared_usage(&self) -> SharedUsage {
        self.usage.clone()
    }
}
