//! Event-type dispatch: `<connector>.{init,start,resync,stop}` -> connector
//! lifecycle operations (spec 4.F).

pub mod dispatcher;
pub mod error;

pub use dispatcher::{ConnectorFactory, EventDispatcher};
pub use error::{EventError, Result};
