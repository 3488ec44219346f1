//! Dispatcher behaviour, end to end through the default command set.

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use zkcli::cli::commands::CommandHistory;
use zkcli::client::{ConnectionState, MemoryConnector};
use zkcli::{CliResult, Command, CommandBase, Session, Shell, Streams};

struct Harness {
    shell: Shell,
    out: Rc<RefCell<Vec<u8>>>,
    err: Rc<RefCell<Vec<u8>>>,
}

impl Harness {
    fn connected() -> Self {
        let mut session = Session::new(Box::new(MemoryConnector::new()), "127.0.0.1:2181");
        session.reconnect().unwrap();
        Self::with_session(session)
    }

    fn with_session(session: Session) -> Self {
        let out = Rc::new(RefCell::new(Vec::new()));
        let err = Rc::new(RefCell::new(Vec::new()));
        let streams = Streams::new(out.clone(), err.clone());
        let shell = Shell::with_default_commands(
            session.into_shared(),
            CommandHistory::new(16).into_shared(),
            streams,
        );
        Self { shell, out, err }
    }

    fn run(&mut self, line: &str) -> bool {
        self.shell.process_line(line)
    }

    fn take_out(&self) -> String {
        String::from_utf8(std::mem::take(&mut *self.out.borrow_mut())).unwrap()
    }

    fn take_err(&self) -> String {
        String::from_utf8(std::mem::take(&mut *self.err.borrow_mut())).unwrap()
    }
}

/// Minimal command registered after the shell is built.
struct SyncCommand {
    base: CommandBase,
}

impl SyncCommand {
    fn boxed(syntax: &'static str) -> Box<Self> {
        Box::new(Self {
            base: CommandBase::new("sync", syntax, &Streams::stdio()),
        })
    }
}

impl Command for SyncCommand {
    fn base(&self) -> &CommandBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CommandBase {
        &mut self.base
    }

    fn parse(&mut self, _args: &[String]) -> CliResult<&mut dyn Command> {
        Ok(self)
    }

    fn execute(&mut self) -> CliResult<bool> {
        Ok(true)
    }
}

#[test]
fn commands_run_against_the_session() {
    let mut h = Harness::connected();
    assert!(h.run("create /app \"hello world\""));
    assert!(h.run("create -e /app/lock"));
    assert!(h.run("get /app"));
    assert!(h.run("ls /app"));
    assert_eq!(
        h.take_out(),
        "Created /app\nCreated /app/lock\nhello world\n[lock]\n"
    );
    assert!(h.take_err().is_empty());
}

#[test]
fn empty_line_is_ignored() {
    let mut h = Harness::connected();
    assert!(h.run("   "));
    assert!(h.take_out().is_empty());
    assert!(h.take_err().is_empty());
}

#[test]
fn unknown_command_reports_and_continues() {
    let mut h = Harness::connected();
    assert!(h.run("rm /a"));
    assert!(h.take_err().starts_with("Unknown command: rm\n"));
}

#[test]
fn malformed_arguments_print_usage() {
    let mut h = Harness::connected();
    assert!(h.run("set /a"));
    let err = h.take_err();
    assert!(err.ends_with("set [-s] [-v version] path data\n"), "{err}");
    assert!(h.take_out().is_empty());
}

#[test]
fn service_errors_print_diagnostic() {
    let mut h = Harness::connected();
    assert!(h.run("get /missing"));
    assert_eq!(h.take_err(), "Node does not exist: /missing\n");

    assert!(h.run("create /a"));
    assert!(h.run("create /a/b"));
    assert!(h.run("delete /a"));
    assert_eq!(h.take_err(), "Node not empty: /a\n");
}

#[test]
fn quit_stops_the_shell() {
    let mut h = Harness::connected();
    assert!(!h.run("quit"));
    assert!(h.run("quit now"));
    assert!(h.take_err().ends_with("quit (no options)\n"));
}

#[test]
fn close_unbinds_and_connect_rebinds() {
    let mut h = Harness::connected();
    assert!(h.run("create -e /eph"));
    assert!(h.run("create /durable"));
    h.take_out();

    assert!(h.run("close"));
    assert_eq!(
        h.shell.session().borrow().state(),
        ConnectionState::Closed
    );
    assert!(h.run("ls /"));
    assert_eq!(h.take_err(), "Not connected\n");

    assert!(h.run("connect otherhost:2182"));
    assert_eq!(h.shell.session().borrow().server(), "otherhost:2182");
    assert!(h.run("ls /"));
    // the ephemeral node went away with the first session
    assert_eq!(h.take_out(), "[durable]\n");
    assert!(h.take_err().is_empty());
}

#[test]
fn bad_connection_string_is_rejected() {
    let mut h = Harness::connected();
    assert!(h.run("connect nowhere"));
    let err = h.take_err();
    assert!(err.starts_with("Invalid connection string: nowhere\n"));
    assert_eq!(h.shell.session().borrow().server(), "127.0.0.1:2181");
}

#[test]
fn unconnected_session_starts_unbound() {
    let session = Session::new(Box::new(MemoryConnector::new()), "127.0.0.1:2181");
    let mut h = Harness::with_session(session);
    assert!(h.run("stat /"));
    assert_eq!(h.take_err(), "Not connected\n");
}

#[test]
fn history_lists_and_clears() {
    let mut h = Harness::connected();
    h.run("ls /");
    h.run("ls /");
    h.run("history");
    assert_eq!(h.take_out(), "[]\n[]\n    1  ls /\n    2  history\n");

    h.run("history clear");
    assert_eq!(h.take_out(), "History cleared.\n");
    h.run("history bogus");
    assert!(h.take_err().ends_with("history [clear]\n"));
}

#[test]
fn help_lists_every_command() {
    let mut h = Harness::connected();
    h.run("help");
    let out = h.take_out();
    assert!(out.starts_with("zkcli -server host:port cmd args\n"));
    for token in [
        "close", "connect", "create", "delete", "deleteall", "get", "help", "history", "ls",
        "quit", "set", "stat",
    ] {
        assert!(out.contains(&format!("\t{} ", token)), "missing {token}");
    }

    h.run("help ls");
    assert_eq!(h.take_out(), "ls [-s] [-R] path\n");
    h.run("help rm");
    assert!(h.take_err().starts_with("Unknown command: rm\n"));
}

#[test]
fn help_follows_later_registrations() {
    let mut h = Harness::connected();
    SyncCommand::boxed("path").register_into(h.shell.registry_mut());
    h.run("help");
    assert!(h.take_out().contains("\tsync path\n"));

    SyncCommand::boxed("[-f] path").register_into(h.shell.registry_mut());
    h.run("help sync");
    assert_eq!(h.take_out(), "sync [-f] path\n");
    assert!(h.take_err().is_empty());
}

#[test]
fn prompt_counts_every_dispatched_line() {
    let mut h = Harness::connected();
    assert_eq!(h.shell.prompt(), "[zkcli: 127.0.0.1:2181(CONNECTED) 0] ");
    h.run("ls /");
    h.run("ls /");
    h.run("history clear");
    h.run("   ");
    assert_eq!(h.shell.prompt(), "[zkcli: 127.0.0.1:2181(CONNECTED) 3] ");
}

#[test]
fn run_reads_until_quit_and_closes_session() {
    let mut h = Harness::connected();
    let input = Cursor::new("create /x 1\nquit\ncreate /y 2\n");
    h.shell.run(input).unwrap();

    let out = h.take_out();
    assert!(out.starts_with("[zkcli: 127.0.0.1:2181(CONNECTED) 0] Created /x\n"));
    assert!(!out.contains("Created /y"));
    assert_eq!(
        h.shell.session().borrow().state(),
        ConnectionState::Closed
    );
}

#[test]
fn run_survives_invalid_utf8_input() {
    let mut h = Harness::connected();
    let input = Cursor::new(&b"create /x 1\nget /\xff\ncreate /y 2\nquit\n"[..]);
    h.shell.run(input).unwrap();

    let out = h.take_out();
    assert!(out.contains("Created /x\n"));
    assert!(out.contains("Created /y\n"));
    assert_eq!(h.take_err(), "Node does not exist: /\u{fffd}\n");
    assert_eq!(
        h.shell.session().borrow().state(),
        ConnectionState::Closed
    );
}

#[test]
fn run_closes_session_at_end_of_input() {
    let mut h = Harness::connected();
    h.shell.run(Cursor::new("create /x 1\r\n")).unwrap();
    assert!(h.take_out().contains("Created /x\n"));
    assert_eq!(
        h.shell.session().borrow().state(),
        ConnectionState::Closed
    );
}
