//! Connector lifecycle and the `run_sync` harness (spec 4.G).

pub mod error;
pub mod kind;
pub mod registry;
pub mod runtime;
pub mod source;
pub mod sync_point;

pub use error::{ConnectorError, Result};
pub use kind::ConnectorKind;
pub use registry::ConnectorRegistry;
pub use runtime::Connector;
pub use source::{ConnectorSource, SourceItem};
pub use sync_point::{KvSyncPointStore, SyncPointStore};
