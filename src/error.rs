//! Unified error types for the shell.
//!
//! Every fallible operation in the library returns `CliResult<T>`. The
//! dispatcher only cares about the coarse `ErrorKind`: malformed arguments
//! get the usage line printed, everything else is printed as a diagnostic
//! and the shell keeps going.
//!
//! ## Usage Examples
//!
//! Reporting a missing node:
//! ```ignore
//! return Err(ServiceError::new(ServiceErrorCode::NoNode, path).into());
//! ```
//!
//! Rejecting arguments inside `parse`:
//! ```ignore
//! return Err(CliError::MalformedArguments(format!("Invalid path: {path}")));
//! ```

use std::io;

/// Structured failure codes reported by the coordination service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorCode {
    NoNode,
    NodeExists,
    BadVersion,
    NotEmpty,
    NoChildrenForEphemerals,
    BadArguments,
    SessionExpired,
    ConnectionLoss,
}

impl ServiceErrorCode {
    /// Human-readable message printed in front of the offending path.
    pub fn message(self) -> &'static str {
        match self {
            Self::NoNode => "Node does not exist",
            Self::NodeExists => "Node already exists",
            Self::BadVersion => "version No is not valid",
            Self::NotEmpty => "Node not empty",
            Self::NoChildrenForEphemerals => "Ephemerals cannot have children",
            Self::BadArguments => "Bad arguments",
            Self::SessionExpired => "Session expired",
            Self::ConnectionLoss => "Connection loss",
        }
    }
}

/// A failure reported by a remote call, optionally tied to a node path.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{}", .code.message(), path_suffix(.path))]
pub struct ServiceError {
    pub code: ServiceErrorCode,
    pub path: Option<String>,
}

impl ServiceError {
    pub fn new(code: ServiceErrorCode, path: impl Into<String>) -> Self {
        Self {
            code,
            path: Some(path.into()),
        }
    }

    pub fn without_path(code: ServiceErrorCode) -> Self {
        Self { code, path: None }
    }
}

fn path_suffix(path: &Option<String>) -> String {
    path.as_ref().map(|path| format!(": {path}")).unwrap_or_default()
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    MalformedArguments(String),
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("Not connected")]
    NotConnected,
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("Interrupted while waiting for the coordination service")]
    Interrupted,
}

/// Coarse classification the dispatcher routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedArguments,
    Service,
    Io,
    Interrupted,
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedArguments(_) => ErrorKind::MalformedArguments,
            Self::Service(_) | Self::NotConnected => ErrorKind::Service,
            Self::Io(_) => ErrorKind::Io,
            Self::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// The service code, if this is a structured remote failure.
    pub fn service_code(&self) -> Option<ServiceErrorCode> {
        match self {
            Self::Service(e) => Some(e.code),
            _ => None,
        }
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        // clap renders a multi-line report; the first line carries the reason.
        let rendered = err.to_string();
        let reason = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_owned();
        CliError::MalformedArguments(reason)
    }
}

/// Result type alias used throughout the crate.
pub type CliResult<T> = Result<T, CliError>;
