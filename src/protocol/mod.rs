//! Line protocol implementation: wire types, codec, transport, dispatch.

pub mod codec;
pub mod dispatcher;
pub mod transport;
pub mod types;

pub use dispatcher::Dispatcher;
pub use transport::{LineTransport, Transport};
pub use types::*;
