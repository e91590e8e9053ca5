//! Key-value store abstraction (spec component 4.A). The single source of
//! truth for connector config, OAuth app config, and per-user credentials.

pub mod encrypted;
pub mod error;
pub mod memory;
pub mod store;

pub use encrypted::EncryptedKvStore;
pub use error::{KvError, Result};
pub use memory::InMemoryKvStore;
pub use store::{KvEvent, KvEventKind, KvStore};
