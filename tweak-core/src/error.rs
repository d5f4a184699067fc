//! Error types for the document store, the sync channel and the form controller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading, editing or saving a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("top level of {path:?} is not a JSON object")]
    NotAnObject { path: PathBuf },
    #[error("no field named `{0}`")]
    UnknownField(String),
    #[error("field `{key}` holds a {expected} value, got {found}")]
    KindMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("cannot write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures on the IPC connection to the parameter peer.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unsupported endpoint address `{0}` (expected ipc://<path>)")]
    Address(String),
    #[error("cannot connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("handshake rejected: {0}")]
    Handshake(String),
    #[error("malformed frame: {0}")]
    Frame(String),
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("message is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("channel is closed")]
    Closed,
}

/// Failures raised by the form controller.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form is not accepting edits")]
    NotEditing,
    #[error("form was already opened")]
    AlreadyOpen,
    #[error("no control bound to `{0}`")]
    UnknownControl(String),
    #[error("control `{key}` is a {control} and cannot take {input}")]
    InputMismatch {
        key: String,
        control: &'static str,
        input: &'static str,
    },
    #[error("control `{0}` cannot take a non-finite number")]
    NonFinite(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
