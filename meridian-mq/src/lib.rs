//! Topic producer/consumer abstraction (spec component 4.B) with
//! at-least-once delivery and per-message handler callbacks.

pub mod broker;
pub mod error;
pub mod message;

pub use broker::{Consumer, Handler, InMemoryBroker, Producer};
pub use error::{MqError, Result};
pub use message::Message;
