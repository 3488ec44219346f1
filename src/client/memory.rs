//! In-process coordination backend.
//!
//! A `MemoryConnector` owns one data tree; every session it hands out is a
//! `MemoryClient` operating on that tree, so nodes survive reconnects while
//! ephemeral nodes die with the session that created them.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::client::{Client, ClientHandle, ConnectionState, Connector, CreateMode, Stat};
use crate::error::{CliError, CliResult, ServiceError, ServiceErrorCode};

struct Node {
    data: Vec<u8>,
    stat: Stat,
    children: BTreeSet<String>,
}

impl Node {
    fn new(data: Vec<u8>, stat: Stat) -> Self {
        Self {
            data,
            stat,
            children: BTreeSet::new(),
        }
    }
}

/// Hierarchical node store shared by all sessions of a connector.
pub struct DataTree {
    nodes: HashMap<String, Node>,
    last_zxid: i64,
}

impl DataTree {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("/".to_string(), Node::new(Vec::new(), Stat::default()));
        Self {
            nodes,
            last_zxid: 0,
        }
    }

    fn next_zxid(&mut self) -> i64 {
        self.last_zxid += 1;
        self.last_zxid
    }

    fn create(
        &mut self,
        path: &str,
        data: &[u8],
        mode: CreateMode,
        owner: i64,
    ) -> CliResult<String> {
        let Some((parent_path, _)) = split_parent(path) else {
            return Err(ServiceError::new(ServiceErrorCode::NodeExists, path).into());
        };
        let parent = self
            .nodes
            .get(parent_path)
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        if parent.stat.ephemeral_owner != 0 {
            return Err(
                ServiceError::new(ServiceErrorCode::NoChildrenForEphemerals, path).into(),
            );
        }

        let actual = if mode.contains(CreateMode::SEQUENTIAL) {
            format!("{}{:010}", path, parent.stat.cversion)
        } else {
            path.to_string()
        };
        if self.nodes.contains_key(&actual) {
            return Err(ServiceError::new(ServiceErrorCode::NodeExists, actual).into());
        }

        let zxid = self.next_zxid();
        let now = chrono::Utc::now().timestamp_millis();
        let stat = Stat {
            czxid: zxid,
            mzxid: zxid,
            pzxid: zxid,
            ctime: now,
            mtime: now,
            ephemeral_owner: if mode.contains(CreateMode::EPHEMERAL) {
                owner
            } else {
                0
            },
            data_length: data.len() as i32,
            ..Stat::default()
        };

        let name = actual[parent_path.len()..].trim_start_matches('/').to_string();
        if let Some(parent) = self.nodes.get_mut(parent_path) {
            parent.children.insert(name);
            parent.stat.cversion += 1;
            parent.stat.pzxid = zxid;
            parent.stat.num_children = parent.children.len() as i32;
        }
        self.nodes.insert(actual.clone(), Node::new(data.to_vec(), stat));
        Ok(actual)
    }

    fn delete(&mut self, path: &str, version: Option<i32>) -> CliResult<()> {
        let Some((parent_path, name)) = split_parent(path) else {
            return Err(ServiceError::new(ServiceErrorCode::BadArguments, path).into());
        };
        let node = self
            .nodes
            .get(path)
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        check_version(node, version, path)?;
        if !node.children.is_empty() {
            return Err(ServiceError::new(ServiceErrorCode::NotEmpty, path).into());
        }

        let zxid = self.next_zxid();
        self.nodes.remove(path);
        if let Some(parent) = self.nodes.get_mut(parent_path) {
            parent.children.remove(name);
            parent.stat.cversion += 1;
            parent.stat.pzxid = zxid;
            parent.stat.num_children = parent.children.len() as i32;
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> Option<Stat> {
        self.nodes.get(path).map(|node| node.stat)
    }

    fn get_data(&self, path: &str) -> CliResult<(Vec<u8>, Stat)> {
        let node = self
            .nodes
            .get(path)
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        Ok((node.data.clone(), node.stat))
    }

    fn set_data(&mut self, path: &str, data: &[u8], version: Option<i32>) -> CliResult<Stat> {
        let node = self
            .nodes
            .get(path)
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        check_version(node, version, path)?;

        let zxid = self.next_zxid();
        let now = chrono::Utc::now().timestamp_millis();
        let node = self
            .nodes
            .get_mut(path)
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        node.data = data.to_vec();
        node.stat.version += 1;
        node.stat.mzxid = zxid;
        node.stat.mtime = now;
        node.stat.data_length = data.len() as i32;
        Ok(node.stat)
    }

    fn get_children(&self, path: &str) -> CliResult<Vec<String>> {
        let node = self
            .nodes
            .get(path)
            .ok_or_else(|| ServiceError::new(ServiceErrorCode::NoNode, path))?;
        Ok(node.children.iter().cloned().collect())
    }

    /// Remove every ephemeral node owned by `session`.
    fn expire_session(&mut self, session: i64) {
        let mut owned: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.stat.ephemeral_owner == session)
            .map(|(path, _)| path.clone())
            .collect();
        owned.sort();
        for path in owned {
            if let Err(e) = self.delete(&path, None) {
                warn!("failed to remove ephemeral {}: {}", path, e);
            }
        }
    }
}

impl Default for DataTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `/a/b` into (`/a`, `b`). The root has no parent.
fn split_parent(path: &str) -> Option<(&str, &str)> {
    if path == "/" {
        return None;
    }
    let idx = path.rfind('/')?;
    let parent = if idx == 0 { "/" } else { &path[..idx] };
    Some((parent, &path[idx + 1..]))
}

fn check_version(node: &Node, version: Option<i32>, path: &str) -> CliResult<()> {
    match version {
        Some(v) if v != node.stat.version => {
            Err(ServiceError::new(ServiceErrorCode::BadVersion, path).into())
        }
        _ => Ok(()),
    }
}

/// One session against a shared `DataTree`.
pub struct MemoryClient {
    session_id: i64,
    tree: Arc<Mutex<DataTree>>,
    closed: AtomicBool,
    interrupted: Arc<AtomicBool>,
}

impl MemoryClient {
    pub fn new(session_id: i64, tree: Arc<Mutex<DataTree>>) -> Self {
        Self {
            session_id,
            tree,
            closed: AtomicBool::new(false),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the next call in flight. It fails with `CliError::Interrupted`.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    /// Flag another thread can set to interrupt this client.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    fn tree(&self) -> CliResult<MutexGuard<'_, DataTree>> {
        if self.interrupted.swap(false, Ordering::SeqCst) {
            return Err(CliError::Interrupted);
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(ServiceError::without_path(ServiceErrorCode::SessionExpired).into());
        }
        self.tree
            .lock()
            .map_err(|_| CliError::Io(io::Error::other("data tree lock poisoned")))
    }
}

impl Client for MemoryClient {
    fn session_id(&self) -> i64 {
        self.session_id
    }

    fn state(&self) -> ConnectionState {
        if self.closed.load(Ordering::SeqCst) {
            ConnectionState::Closed
        } else {
            ConnectionState::Connected
        }
    }

    fn create(&self, path: &str, data: &[u8], mode: CreateMode) -> CliResult<String> {
        self.tree()?.create(path, data, mode, self.session_id)
    }

    fn delete(&self, path: &str, version: Option<i32>) -> CliResult<()> {
        self.tree()?.delete(path, version)
    }

    fn exists(&self, path: &str) -> CliResult<Option<Stat>> {
        Ok(self.tree()?.exists(path))
    }

    fn get_data(&self, path: &str) -> CliResult<(Vec<u8>, Stat)> {
        self.tree()?.get_data(path)
    }

    fn set_data(&self, path: &str, data: &[u8], version: Option<i32>) -> CliResult<Stat> {
        self.tree()?.set_data(path, data, version)
    }

    fn get_children(&self, path: &str) -> CliResult<Vec<String>> {
        self.tree()?.get_children(path)
    }

    fn close(&self) -> CliResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut tree = self
            .tree
            .lock()
            .map_err(|_| CliError::Io(io::Error::other("data tree lock poisoned")))?;
        tree.expire_session(self.session_id);
        info!("Session 0x{:x} closed", self.session_id);
        Ok(())
    }
}

/// Hands out `MemoryClient` sessions over one shared tree.
pub struct MemoryConnector {
    tree: Arc<Mutex<DataTree>>,
    next_session: AtomicI64,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(DataTree::new())),
            next_session: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, server: &str) -> CliResult<ClientHandle> {
        let session_id = self.next_session.fetch_add(1, Ordering::SeqCst);
        info!("Session 0x{:x} established with {}", session_id, server);
        Ok(Arc::new(MemoryClient::new(session_id, self.tree.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn client() -> (MemoryConnector, ClientHandle) {
        let connector = MemoryConnector::new();
        let client = connector.connect("127.0.0.1:2181").unwrap();
        (connector, client)
    }

    fn code(err: CliError) -> ServiceErrorCode {
        err.service_code().expect("service error")
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("/"), None);
        assert_eq!(split_parent("/a"), Some(("/", "a")));
        assert_eq!(split_parent("/a/b"), Some(("/a", "b")));
    }

    #[test]
    fn test_create_and_read_back() {
        let (_c, zk) = client();
        assert_eq!(zk.create("/a", b"one", CreateMode::empty()).unwrap(), "/a");
        let (data, stat) = zk.get_data("/a").unwrap();
        assert_eq!(data, b"one");
        assert_eq!(stat.data_length, 3);
        assert_eq!(stat.version, 0);
        assert_eq!(zk.get_children("/").unwrap(), vec!["a".to_string()]);
        assert_eq!(zk.exists("/a").unwrap().map(|s| s.czxid), Some(stat.czxid));
        assert!(zk.exists("/nope").unwrap().is_none());
    }

    #[test]
    fn test_create_requires_parent_and_rejects_duplicates() {
        let (_c, zk) = client();
        let err = zk.create("/x/y", b"", CreateMode::empty()).unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::NoNode);

        zk.create("/x", b"", CreateMode::empty()).unwrap();
        let err = zk.create("/x", b"", CreateMode::empty()).unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::NodeExists);
        let err = zk.create("/", b"", CreateMode::empty()).unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::NodeExists);
    }

    #[test]
    fn test_sequential_suffix_uses_parent_cversion() {
        let (_c, zk) = client();
        zk.create("/q", b"", CreateMode::empty()).unwrap();
        let first = zk.create("/q/item-", b"", CreateMode::SEQUENTIAL).unwrap();
        let second = zk.create("/q/item-", b"", CreateMode::SEQUENTIAL).unwrap();
        assert_eq!(first, "/q/item-0000000000");
        assert_eq!(second, "/q/item-0000000001");
    }

    #[test]
    fn test_versioned_set_and_delete() {
        let (_c, zk) = client();
        zk.create("/v", b"a", CreateMode::empty()).unwrap();
        let stat = zk.set_data("/v", b"bb", Some(0)).unwrap();
        assert_eq!(stat.version, 1);
        assert_eq!(stat.data_length, 2);

        let err = zk.set_data("/v", b"c", Some(0)).unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::BadVersion);
        let err = zk.delete("/v", Some(7)).unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::BadVersion);

        zk.delete("/v", Some(1)).unwrap();
        assert!(zk.exists("/v").unwrap().is_none());
    }

    #[test]
    fn test_delete_rules() {
        let (_c, zk) = client();
        zk.create("/p", b"", CreateMode::empty()).unwrap();
        zk.create("/p/c", b"", CreateMode::empty()).unwrap();
        assert_eq!(code(zk.delete("/p", None).unwrap_err()), ServiceErrorCode::NotEmpty);
        assert_eq!(code(zk.delete("/", None).unwrap_err()), ServiceErrorCode::BadArguments);
        assert_eq!(code(zk.delete("/zz", None).unwrap_err()), ServiceErrorCode::NoNode);

        let before = zk.exists("/p").unwrap().unwrap();
        zk.delete("/p/c", None).unwrap();
        let after = zk.exists("/p").unwrap().unwrap();
        assert_eq!(after.num_children, 0);
        assert_eq!(after.cversion, before.cversion + 1);
    }

    #[test]
    fn test_ephemerals_die_with_session() {
        let connector = MemoryConnector::new();
        let first = connector.connect("a:1").unwrap();
        let second = connector.connect("a:1").unwrap();
        assert_ne!(first.session_id(), second.session_id());

        first.create("/e", b"", CreateMode::EPHEMERAL).unwrap();
        first.create("/keep", b"", CreateMode::empty()).unwrap();
        let err = first.create("/e/child", b"", CreateMode::empty()).unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::NoChildrenForEphemerals);
        assert_eq!(
            second.exists("/e").unwrap().unwrap().ephemeral_owner,
            first.session_id()
        );

        first.close().unwrap();
        assert_eq!(first.state(), ConnectionState::Closed);
        assert!(second.exists("/e").unwrap().is_none());
        assert!(second.exists("/keep").unwrap().is_some());
    }

    #[test]
    fn test_closed_client_reports_session_expired() {
        let (_c, zk) = client();
        zk.close().unwrap();
        zk.close().unwrap();
        let err = zk.get_children("/").unwrap_err();
        assert_eq!(code(err), ServiceErrorCode::SessionExpired);
    }

    #[test]
    fn test_interrupt_fails_next_call_only() {
        let tree = Arc::new(Mutex::new(DataTree::new()));
        let zk = MemoryClient::new(9, tree);
        zk.interrupt();
        assert_eq!(zk.get_children("/").unwrap_err().kind(), ErrorKind::Interrupted);
        assert!(zk.get_children("/").is_ok());

        zk.interrupt_flag().store(true, Ordering::SeqCst);
        assert!(matches!(zk.exists("/"), Err(CliError::Interrupted)));
    }
}
