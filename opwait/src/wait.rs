//! The waiter engine: polls a remote operation until an acceptor settles it.

use std::fmt;

use serde_json::Value;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use opwait_core::{
    acceptor::{Acceptor, AcceptorState},
    invoke::{ErrorResponse, Invoke, Response},
};

use crate::config::Config;

/// Terminal result of one wait.
///
/// Failed and timed-out waits are reported here rather than as `Err`s; the
/// only errors the engine itself raises are configuration errors, and those
/// are rejected before a [`Config`] can exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A `success` acceptor matched.
    Succeeded,
    /// A `failure` acceptor matched; carries a rendering of that acceptor's
    /// matcher.
    Failed(String),
    /// The attempt budget ran out before any terminal acceptor matched.
    TimedOut(u32),
    /// The caller's cancellation token fired first.
    Cancelled,
}

impl Outcome {
    /// `true` for [`Outcome::Succeeded`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => f.write_str("succeeded"),
            Outcome::Failed(reason) => write!(f, "failed on {reason}"),
            Outcome::TimedOut(attempts) => write!(f, "timed out after {attempts} attempts"),
            Outcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Polls a remote check operation until an acceptor settles the wait.
///
/// A `Waiter` pairs one [`Invoke`] collaborator with one validated
/// [`Config`]. Each call to [`Waiter::wait`] runs an independent sequential
/// poll loop; nothing carries over between calls, so a `Waiter` can be reused
/// or shared, and independent waits may run concurrently without
/// coordination.
///
/// Within one attempt the acceptors are consulted in declared order and the
/// first satisfied one decides: `success` and `failure` end the wait
/// immediately, `retry` schedules another attempt without consulting the
/// rest of the list. An invocation error that no `error` acceptor absorbs is
/// retried like any other inconclusive attempt; declare an `error` acceptor
/// with `failure` state ahead of the others to fail fast instead.
pub struct Waiter<I> {
    invoker: I,
    config: Config,
}

impl<I> Waiter<I> {
    /// Pairs an invoker with a validated config.
    pub fn new(invoker: I, config: Config) -> Self {
        Waiter { invoker, config }
    }

    /// The wait configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<I: Invoke> Waiter<I> {
    /// Polls until a terminal [`Outcome`], sleeping the configured delay
    /// between attempts.
    pub async fn wait(&self, request: &Value) -> Outcome {
        self.run(request, None).await
    }

    /// Like [`Waiter::wait`], but aborts with [`Outcome::Cancelled`] as soon
    /// as `cancel` fires, including during the inter-attempt sleep.
    pub async fn wait_with_cancel(&self, request: &Value, cancel: &CancellationToken) -> Outcome {
        self.run(request, Some(cancel)).await
    }

    async fn run(&self, request: &Value, cancel: Option<&CancellationToken>) -> Outcome {
        let config = &self.config;
        debug!(
            operation = %config.operation(),
            max_attempts = config.max_attempts(),
            delay = ?config.delay(),
            "starting wait"
        );
        for attempt in 1..=config.max_attempts() {
            if cancel.is_some_and(|token| token.is_cancelled()) {
                debug!(attempt, "wait cancelled before invocation");
                return Outcome::Cancelled;
            }
            let result = self.invoker.invoke(config.operation(), request).await;
            match first_match(config.acceptors(), &result) {
                Some(acceptor) => match acceptor.state {
                    AcceptorState::Success => {
                        debug!(attempt, matcher = %acceptor.matcher, "success acceptor matched");
                        return Outcome::Succeeded;
                    }
                    AcceptorState::Failure => {
                        debug!(attempt, matcher = %acceptor.matcher, "failure acceptor matched");
                        return Outcome::Failed(acceptor.matcher.to_string());
                    }
                    AcceptorState::Retry => {
                        trace!(attempt, matcher = %acceptor.matcher, "retry acceptor matched");
                    }
                },
                None => {
                    if let Err(err) = &result {
                        debug!(attempt, error = %err, "unmatched operation error, retrying");
                    } else {
                        trace!(attempt, "no acceptor matched");
                    }
                }
            }
            if attempt == config.max_attempts() {
                break;
            }
            tokio::select! {
                () = cancel_or_pending(cancel) => {
                    debug!(attempt, "wait cancelled during sleep");
                    return Outcome::Cancelled;
                }
                () = sleep(config.delay()) => {}
            }
        }
        debug!(
            operation = %config.operation(),
            attempts = config.max_attempts(),
            "attempt budget exhausted"
        );
        Outcome::TimedOut(config.max_attempts())
    }
}

/// First acceptor in declared order satisfied by `result`.
fn first_match<'a>(
    acceptors: &'a [Acceptor],
    result: &Result<Response, ErrorResponse>,
) -> Option<&'a Acceptor> {
    acceptors.iter().find(|acceptor| acceptor.matcher.matches(result))
}

/// Awaits cancellation if a token was provided, otherwise pends forever.
async fn cancel_or_pending(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
