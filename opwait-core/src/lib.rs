//! Transport-agnostic types for the opwait waiter engine.
//!
//! This crate holds the pieces that cross the engine boundary: projection
//! [`Path`]s, [`Acceptor`]s and their [`Matcher`]s, and the [`Invoke`]
//! collaborator contract together with the [`Response`]/[`ErrorResponse`]
//! values it produces. The polling engine itself lives in the `opwait`
//! crate, which re-exports everything here under `opwait::core`.

pub mod acceptor;
pub use acceptor::{Acceptor, AcceptorState, Matcher};

pub mod invoke;
pub use invoke::{ErrorResponse, Invoke, Response};

pub mod path;
pub use path::Path;
