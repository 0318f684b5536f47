//! Document model and editing engine for Discord Components v2 messages.
//!
//! The [`types`] module holds the wire schema. [`store::DocumentStore`] owns
//! the document being edited and records every structural change in a
//! bounded [`history::History`]. Around it sit the stateless services:
//! [`validation`], [`batch`] operations, [`export`] to JSON and source code,
//! [`import`], the [`clipboard`], [`search`] and starter [`templates`].
//!
//! With the `io` feature (on by default) the crate also provides the async
//! boundary: a [`shared::SharedStore`] that broadcasts changes over a
//! channel, the system-clipboard trait and the `components_builder` binary.

pub mod batch;
pub mod clipboard;
pub mod config;
pub mod export;
pub mod history;
pub mod import;
pub mod limits;
pub mod search;
pub mod storage;
pub mod store;
pub mod templates;
pub mod types;
pub mod validation;

#[cfg(feature = "io")]
pub mod shared;

pub use crate::config::Config;
pub use crate::export::{export_components, ExportFormat, ExportOptions, ExportResult};
pub use crate::history::{History, HistoryOptions, HistoryStats};
pub use crate::import::{ImportError, ImportOptions, ImportResult};
pub use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, PersistedState, StorageError};
pub use crate::store::{DocumentStore, StoreAction, StoreChange, StoreOptions, Theme};
pub use crate::validation::{validate, ValidationError, ValidationResult};

#[cfg(feature = "io")]
pub use crate::shared::SharedStore;
