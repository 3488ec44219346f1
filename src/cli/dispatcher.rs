//! Line-oriented dispatcher.
//!
//! Reads lines, records them in history, looks up the command by its first
//! token and drives `parse` then `execute`. Every failure a command surfaces
//! is printed and the loop keeps going; only a command returning `false`
//! (or end of input) stops it.

use std::io::BufRead;

use crate::cli::command::Streams;
use crate::cli::commands::{self, SharedHistory};
use crate::cli::registry::CommandRegistry;
use crate::client::SharedSession;
use crate::error::{CliResult, ErrorKind};

/// Split a line into tokens.
///
/// Tokens are separated by whitespace. A token opening with `"` or `'` runs
/// to the matching quote, which lets data contain spaces; the quotes are
/// dropped. An unterminated quote runs to the end of the line.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if c == '"' || c == '\'' {
            chars.next();
            for nc in chars.by_ref() {
                if nc == c {
                    break;
                }
                token.push(nc);
            }
        } else {
            while let Some(&nc) = chars.peek() {
                if nc.is_whitespace() {
                    break;
                }
                token.push(nc);
                chars.next();
            }
        }
        tokens.push(token);
    }

    tokens
}

/// The interactive shell.
pub struct Shell {
    registry: CommandRegistry,
    session: SharedSession,
    history: SharedHistory,
    streams: Streams,
    bound_generation: Option<u64>,
    dispatched: u64,
}

impl Shell {
    pub fn new(
        registry: CommandRegistry,
        session: SharedSession,
        history: SharedHistory,
        streams: Streams,
    ) -> Self {
        let mut shell = Self {
            registry,
            session,
            history,
            streams,
            bound_generation: None,
            dispatched: 0,
        };
        shell.rebind_if_changed();
        shell
    }

    /// Shell with every built-in command registered.
    pub fn with_default_commands(
        session: SharedSession,
        history: SharedHistory,
        streams: Streams,
    ) -> Self {
        let registry = commands::default_registry(&streams, &session, &history);
        Self::new(registry, session, history, streams)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Handle one input line. Returns `false` when the shell should stop.
    pub fn process_line(&mut self, line: &str) -> bool {
        let tokens = tokenize(line);
        let Some((token, args)) = tokens.split_first() else {
            return true;
        };
        self.history.borrow_mut().push(line.trim());
        self.dispatched += 1;

        let keep_running = match self.registry.get_mut(token) {
            Some(command) => {
                debug!("dispatching {} {:?}", token, args);
                match command.parse(args).and_then(|parsed| parsed.execute()) {
                    Ok(keep_running) => keep_running,
                    Err(e) if e.kind() == ErrorKind::MalformedArguments => {
                        let _ = command
                            .base()
                            .write_err(&format!("{}\n{}\n", e, command.usage_text()));
                        true
                    }
                    Err(e) => {
                        warn!("{} failed: {}", token, e);
                        let _ = command.base().write_err(&format!("{}\n", e));
                        true
                    }
                }
            }
            None => {
                let _ = self.write_err(&format!(
                    "Unknown command: {}\nType 'help' to see available commands.\n",
                    token
                ));
                true
            }
        };

        self.rebind_if_changed();
        keep_running
    }

    /// Run until end of input or a command asks to stop, then close the
    /// session.
    ///
    /// Input that is not valid UTF-8 is decoded lossily; the offending line
    /// still goes to its command.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> CliResult<()> {
        let looped = self.read_loop(&mut input);
        let closed = self.session.borrow_mut().close();
        looped.and(closed)
    }

    fn read_loop<R: BufRead>(&mut self, input: &mut R) -> CliResult<()> {
        let mut buf = Vec::new();
        loop {
            self.write_prompt()?;
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            if !self.process_line(line.trim_end_matches(['\n', '\r'])) {
                return Ok(());
            }
        }
    }

    /// `[zkcli: <server>(<STATE>) <n>] `
    pub fn prompt(&self) -> String {
        let session = self.session.borrow();
        format!(
            "[zkcli: {}({}) {}] ",
            session.server(),
            session.state(),
            self.dispatched
        )
    }

    fn write_prompt(&self) -> CliResult<()> {
        let prompt = self.prompt();
        let mut out = self.streams.out.borrow_mut();
        out.write_all(prompt.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn write_err(&self, text: &str) -> CliResult<()> {
        let mut err = self.streams.err.borrow_mut();
        err.write_all(text.as_bytes())?;
        err.flush()?;
        Ok(())
    }

    /// Point every command at the session's current client when the
    /// session has been (re)connected or closed since the last binding.
    fn rebind_if_changed(&mut self) {
        let session = self.session.borrow();
        if self.bound_generation == Some(session.generation()) {
            return;
        }
        debug!(
            "binding {} commands to {} ({})",
            self.registry.len(),
            session.server(),
            session.state()
        );
        self.registry.bind_client(session.client());
        self.bound_generation = Some(session.generation());
    }
}
