//! Client capability consumed by commands.
//!
//! Commands never see how the coordination service is reached. They get a
//! `ClientHandle` exposing the node operations below; the `Session` owns the
//! handle and the commands only keep a non-owning reference to it.

use std::fmt;
use std::sync::Arc;

use crate::error::CliResult;

pub mod memory;
pub mod session;

pub use memory::{MemoryClient, MemoryConnector};
pub use session::{Connector, Session, SharedSession};

/// Shared reference to a connected client.
pub type ClientHandle = Arc<dyn Client>;

bitflags::bitflags! {
    /// How a node is created.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CreateMode: u8 {
        /// Removed when the owning session closes.
        const EPHEMERAL = 1 << 0;
        /// A monotonically increasing suffix is appended to the name.
        const SEQUENTIAL = 1 << 1;
    }
}

/// Connection state as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected => f.write_str("CONNECTED"),
            ConnectionState::Closed => f.write_str("CLOSED"),
        }
    }
}

/// Node metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub czxid: i64,
    pub mzxid: i64,
    pub pzxid: i64,
    /// Creation time, milliseconds since the epoch.
    pub ctime: i64,
    /// Last modification time, milliseconds since the epoch.
    pub mtime: i64,
    pub version: i32,
    pub cversion: i32,
    pub aversion: i32,
    /// Session id of the owner for ephemeral nodes, 0 otherwise.
    pub ephemeral_owner: i64,
    pub data_length: i32,
    pub num_children: i32,
}

/// Remote operations available to commands.
///
/// Every call blocks until the service answers. Failures come back as
/// `CliError::Service`, `CliError::Io` or `CliError::Interrupted`.
pub trait Client: Send + Sync {
    /// Session id assigned by the service.
    fn session_id(&self) -> i64;

    fn state(&self) -> ConnectionState;

    /// Create a node, returning the actual path (differs for sequential nodes).
    fn create(&self, path: &str, data: &[u8], mode: CreateMode) -> CliResult<String>;

    /// Delete a node. `None` skips the version check.
    fn delete(&self, path: &str, version: Option<i32>) -> CliResult<()>;

    fn exists(&self, path: &str) -> CliResult<Option<Stat>>;

    fn get_data(&self, path: &str) -> CliResult<(Vec<u8>, Stat)>;

    /// Replace node data. `None` skips the version check.
    fn set_data(&self, path: &str, data: &[u8], version: Option<i32>) -> CliResult<Stat>;

    /// Child names in lexicographic order.
    fn get_children(&self, path: &str) -> CliResult<Vec<String>>;

    /// End the session. Ephemeral nodes it owns go away.
    fn close(&self) -> CliResult<()>;
}
