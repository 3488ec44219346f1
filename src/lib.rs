//! zkcli - interactive shell for a coordination service.
//!
//! Each shell command is a self-contained `Command` that knows its invocation
//! token, its option syntax, how to parse its arguments and how to run
//! against the bound client. A `Shell` holds them in a `CommandRegistry` and
//! dispatches input lines to them.

#[macro_use]
extern crate log;

pub mod cli;
pub mod client;
pub mod config;
pub mod error;

pub use cli::{Command, CommandBase, CommandRegistry, Shell, Sink, Streams};
pub use client::{Client, ClientHandle, Session};
pub use config::ShellConfig;
pub use error::{CliError, CliResult, ErrorKind};
