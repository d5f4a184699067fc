// tweak-core/src/lib.rs

//! The core logic for the tweak parameter editor.
//! This crate loads and saves the parameter document, talks to the
//! parameter peer over IPC, and decides what every form control does.
//! It is completely headless and contains no GUI code.

pub mod config;
pub mod document;
pub mod error;
pub mod form;
pub mod sync;
pub mod wire;

pub use config::EditorConfig;
pub use document::{Document, Field, FieldKind, FieldValue};
pub use error::{DocumentError, FormError, SyncError};
pub use form::{Control, ControlState, FormController, FormState, Input};
pub use sync::{Publish, SyncChannel};
