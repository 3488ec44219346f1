//! The live connection the shell works against.

use std::cell::RefCell;
use std::rc::Rc;

use crate::client::{ClientHandle, ConnectionState};
use crate::error::CliResult;

/// Opens sessions against a connection string such as `host:port`.
pub trait Connector {
    fn connect(&self, server: &str) -> CliResult<ClientHandle>;
}

/// Session shared between the shell and the commands that reconnect it.
pub type SharedSession = Rc<RefCell<Session>>;

/// Owns the current client handle.
///
/// `generation` moves forward every time the handle is replaced or dropped,
/// which is how the dispatcher notices it has to rebind its commands.
pub struct Session {
    connector: Box<dyn Connector>,
    server: String,
    client: Option<ClientHandle>,
    generation: u64,
}

impl Session {
    /// Create an unconnected session that will target `server`.
    pub fn new(connector: Box<dyn Connector>, server: impl Into<String>) -> Self {
        Self {
            connector,
            server: server.into(),
            client: None,
            generation: 0,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Rc::new(RefCell::new(self))
    }

    /// Close the current session (if any) and open a new one to `server`.
    pub fn connect(&mut self, server: &str) -> CliResult<()> {
        self.close()?;
        let client = self.connector.connect(server)?;
        debug!("session 0x{:x} bound to {}", client.session_id(), server);
        self.server = server.to_string();
        self.client = Some(client);
        self.generation += 1;
        Ok(())
    }

    /// Reconnect to the last server.
    pub fn reconnect(&mut self) -> CliResult<()> {
        let server = self.server.clone();
        self.connect(&server)
    }

    pub fn close(&mut self) -> CliResult<()> {
        if let Some(client) = self.client.take() {
            self.generation += 1;
            client.close()?;
        }
        Ok(())
    }

    pub fn client(&self) -> Option<&ClientHandle> {
        self.client.as_ref()
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ConnectionState {
        self.client
            .as_ref()
            .map_or(ConnectionState::Closed, |client| client.state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MemoryConnector;

    #[test]
    fn test_connect_and_close_advance_generation() {
        let mut session = Session::new(Box::new(MemoryConnector::new()), "localhost:2181");
        assert_eq!(session.state(), ConnectionState::Closed);
        assert_eq!(session.generation(), 0);

        session.reconnect().unwrap();
        assert_eq!(session.state(), ConnectionState::Connected);
        assert_eq!(session.generation(), 1);
        let first = session.client().unwrap().session_id();

        session.connect("otherhost:2182").unwrap();
        assert_eq!(session.server(), "otherhost:2182");
        assert_ne!(session.client().unwrap().session_id(), first);
        // close of the old handle plus the new connect
        assert_eq!(session.generation(), 3);

        session.close().unwrap();
        assert!(session.client().is_none());
        assert_eq!(session.generation(), 4);

        session.close().unwrap();
        assert_eq!(session.generation(), 4);
    }

    #[test]
    fn test_closing_drops_the_only_strong_handle() {
        let mut session = Session::new(Box::new(MemoryConnector::new()), "localhost:2181");
        session.reconnect().unwrap();
        let weak = std::sync::Arc::downgrade(session.client().unwrap());
        assert!(weak.upgrade().is_some());
        session.close().unwrap();
        assert!(weak.upgrade().is_none());
    }
}
