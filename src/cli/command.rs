//! Command trait and the bookkeeping every command shares.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::{Arc, Weak};

use crate::cli::registry::CommandRegistry;
use crate::client::{Client, ClientHandle};
use crate::error::{CliError, CliResult};

/// Destination for command output.
pub type Sink = Rc<RefCell<dyn Write>>;

/// Output and error sinks handed to commands at construction.
#[derive(Clone)]
pub struct Streams {
    pub out: Sink,
    pub err: Sink,
}

impl Streams {
    pub fn new(out: Sink, err: Sink) -> Self {
        Self { out, err }
    }

    /// Process stdout/stderr. Only the outermost composition point calls this.
    pub fn stdio() -> Self {
        Self::new(
            Rc::new(RefCell::new(io::stdout())),
            Rc::new(RefCell::new(io::stderr())),
        )
    }
}

/// State shared by all commands: the invocation token, the option syntax,
/// the bound client and the output sinks.
pub struct CommandBase {
    token: &'static str,
    option_syntax: &'static str,
    client: Option<Weak<dyn Client>>,
    out: Sink,
    err: Sink,
}

impl CommandBase {
    pub fn new(token: &'static str, option_syntax: &'static str, streams: &Streams) -> Self {
        debug_assert!(!token.is_empty(), "invocation token must not be empty");
        debug_assert!(!option_syntax.is_empty(), "option syntax must not be empty");
        Self {
            token,
            option_syntax,
            client: None,
            out: streams.out.clone(),
            err: streams.err.clone(),
        }
    }

    pub fn token(&self) -> &'static str {
        self.token
    }

    pub fn option_syntax(&self) -> &'static str {
        self.option_syntax
    }

    /// Replace the client reference. `None` unbinds.
    pub fn bind_client(&mut self, client: Option<&ClientHandle>) {
        self.client = client.map(Arc::downgrade);
    }

    pub fn is_bound(&self) -> bool {
        self.client
            .as_ref()
            .is_some_and(|client| client.strong_count() > 0)
    }

    /// Snapshot of the bound client for one execution.
    ///
    /// Fails with `NotConnected` when nothing is bound or the session that
    /// owned the handle has gone away.
    pub fn client(&self) -> CliResult<ClientHandle> {
        self.client
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(CliError::NotConnected)
    }

    pub fn set_out(&mut self, sink: Sink) {
        self.out = sink;
    }

    pub fn set_err(&mut self, sink: Sink) {
        self.err = sink;
    }

    /// Write to the output sink in one piece.
    pub fn write_out(&self, text: &str) -> CliResult<()> {
        let mut out = self.out.borrow_mut();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Write to the error sink in one piece.
    pub fn write_err(&self, text: &str) -> CliResult<()> {
        let mut err = self.err.borrow_mut();
        err.write_all(text.as_bytes())?;
        err.flush()?;
        Ok(())
    }
}

/// Trait for implementing commands.
///
/// A command is constructed once, registered under its invocation token and
/// then driven as `parse(args)?.execute()` for every line that names it.
/// Instances are meant for one caller at a time.
pub trait Command {
    fn base(&self) -> &CommandBase;

    fn base_mut(&mut self) -> &mut CommandBase;

    /// Validate `args` (the tokens after the invocation token) and keep
    /// whatever `execute` needs.
    ///
    /// On `MalformedArguments` the state from the previous successful parse
    /// is left untouched.
    fn parse(&mut self, args: &[String]) -> CliResult<&mut dyn Command>;

    /// Run the command. `Ok(false)` asks the shell to stop.
    fn execute(&mut self) -> CliResult<bool>;

    /// Token the command is registered under.
    fn invocation_token(&self) -> &str {
        self.base().token()
    }

    /// Human-readable option description.
    fn option_syntax(&self) -> &str {
        self.base().option_syntax()
    }

    /// `"<token> <option syntax>"`, used by help output.
    fn usage_text(&self) -> String {
        format!("{} {}", self.invocation_token(), self.option_syntax())
    }

    fn bind_client(&mut self, client: Option<&ClientHandle>) {
        self.base_mut().bind_client(client);
    }

    fn set_output_sink(&mut self, sink: Sink) {
        self.base_mut().set_out(sink);
    }

    fn set_error_sink(&mut self, sink: Sink) {
        self.base_mut().set_err(sink);
    }

    /// Insert into `registry` under the invocation token. A previous entry
    /// under the same token is replaced.
    fn register_into(self: Box<Self>, registry: &mut CommandRegistry)
    where
        Self: Sized + 'static,
    {
        registry.insert(self);
    }
}
