//! Declarative waiting for long-running remote operations.
//!
//! Remote systems often expose long-running work (stack creation, node state
//! transitions, job completion) only through a status-check operation that
//! must be polled. `opwait` owns that loop: a [`Config`] names the check
//! operation, a fixed inter-attempt delay, an attempt budget, and an ordered
//! list of [`Acceptor`]s deciding, from the shape of each response or the
//! error it raised, whether the wait has succeeded, failed, or should keep
//! going. The remote call itself stays behind the [`Invoke`] trait, so the
//! engine is agnostic to transport and response schema alike.
//!
//! ```
//! use async_trait::async_trait;
//! use opwait::{Acceptor, Config, ErrorResponse, Invoke, Matcher, Outcome, Response, Waiter};
//! use serde_json::{json, Value};
//! use std::time::Duration;
//!
//! /// Client for some remote stack API.
//! struct StackClient;
//!
//! #[async_trait]
//! impl Invoke for StackClient {
//!     async fn invoke(&self, _operation: &str, _request: &Value) -> Result<Response, ErrorResponse> {
//!         // A real implementation sends the request over its transport.
//!         Ok(Response::ok(json!({"Stacks": [{"StackStatus": "CREATE_COMPLETE"}]})))
//!     }
//! }
//!
//! # async fn wrapper() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::builder("DescribeStacks")
//!     .delay(Duration::from_secs(30))
//!     .max_attempts(50)
//!     .acceptor(Acceptor::success(Matcher::path_all(
//!         "Stacks[].StackStatus".parse()?,
//!         "CREATE_COMPLETE",
//!     )))
//!     .acceptor(Acceptor::failure(Matcher::path_any(
//!         "Stacks[].StackStatus".parse()?,
//!         "CREATE_FAILED",
//!     )))
//!     .build()?;
//!
//! let waiter = Waiter::new(StackClient, config);
//! let outcome = waiter.wait(&json!({"StackName": "demo"})).await;
//! assert_eq!(outcome, Outcome::Succeeded);
//! # Ok(())
//! # }
//! ```
//!
//! Configs can equally be deserialized from the JSON waiter-definition format
//! used by generated SDK waiter tables; see [`Config`]. To make a wait
//! abortable, pass a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! to [`Waiter::wait_with_cancel`].

pub mod config;
pub use config::{Config, ConfigError};

pub mod wait;
pub use wait::{Outcome, Waiter};

pub use opwait_core as core;
pub use opwait_core::{Acceptor, AcceptorState, ErrorResponse, Invoke, Matcher, Path, Response};
