//! Shell command system - modular command architecture.
//!
//! This module provides a framework for defining and executing shell
//! commands against a coordination service client.
//!
//! # Architecture
//!
//! - `command.rs` - Defines the `Command` trait and the shared `CommandBase`
//! - `registry.rs` - Command registration and lookup by invocation token
//! - `dispatcher.rs` - The `Shell` loop driving parse/execute per line
//! - `commands/` - Individual command implementations
//!
//! # Adding a New Command
//!
//! 1. Create a new file in `commands/` (e.g., `commands/mycommand.rs`)
//! 2. Define a struct holding a `CommandBase` and implement the `Command` trait
//! 3. Add to `commands/mod.rs`: `pub mod mycommand;` and re-export the type
//! 4. Register it in `commands::default_registry`

pub mod command;
pub mod commands;
pub mod dispatcher;
pub mod registry;

pub use command::{Command, CommandBase, Sink, Streams};
pub use dispatcher::{Shell, tokenize};
pub use registry::{CommandRegistry, SharedUsage};
