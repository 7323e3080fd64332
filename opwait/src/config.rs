//! Waiter configuration: which operation to poll, how often, how many times,
//! and the acceptors that interpret each poll result.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use opwait_core::Acceptor;

/// Configuration mistakes, rejected before any attempt runs.
///
/// Malformed projection paths are caught even earlier, when the [`Path`]
/// inside an acceptor is parsed.
///
/// [`Path`]: opwait_core::Path
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The attempt budget must allow at least one invocation.
    #[error("max_attempts must be at least 1")]
    ZeroMaxAttempts,

    /// The operation name is forwarded to the invoker and must be non-empty.
    #[error("operation name is empty")]
    EmptyOperation,
}

/// Immutable configuration for one kind of wait.
///
/// The only ways to obtain a `Config` are the fluent [`Config::builder`] and
/// deserializing a JSON waiter definition; both run the same validation, so
/// a `Config` in hand is always well-formed.
///
/// Acceptors are evaluated in declared order on every attempt and the first
/// satisfied one wins, which lets a narrow rule be ordered ahead of a broader
/// one to express precedence. A config with no acceptors is accepted but can
/// only ever time out.
///
/// # JSON waiter definitions
///
/// The serde wire shape is the one used by generated SDK waiter tables, with
/// `delay` in whole seconds:
///
/// ```
/// use opwait::Config;
/// use std::time::Duration;
///
/// let config: Config = serde_json::from_value(serde_json::json!({
///     "operation": "DescribeStacks",
///     "delay": 30,
///     "maxAttempts": 25,
///     "acceptors": [
///         {"state": "success", "matcher": "pathAll",
///          "argument": "Stacks[].StackStatus", "expected": "DELETE_COMPLETE"},
///         {"state": "success", "matcher": "error", "expected": "ValidationError"},
///         {"state": "failure", "matcher": "pathAny",
///          "argument": "Stacks[].StackStatus", "expected": "DELETE_FAILED"}
///     ]
/// }))?;
/// assert_eq!(config.delay(), Duration::from_secs(30));
/// assert_eq!(config.max_attempts(), 25);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "RawConfig")]
pub struct Config {
    operation: String,
    delay: Duration,
    max_attempts: u32,
    acceptors: Vec<Acceptor>,
}

impl Config {
    /// Starts building a config for the given check operation.
    pub fn builder(operation: impl Into<String>) -> Builder {
        Builder {
            operation: operation.into(),
            delay: Duration::ZERO,
            max_attempts: 0,
            acceptors: Vec::new(),
        }
    }

    /// Identifier of the remote check operation, forwarded to the invoker.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Fixed sleep between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on invocations.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Acceptors in evaluation order.
    #[must_use]
    pub fn acceptors(&self) -> &[Acceptor] {
        &self.acceptors
    }
}

/// Fluent builder for [`Config`].
///
/// `delay` defaults to zero; `max_attempts` has no default and must be set.
#[derive(Clone, Debug)]
pub struct Builder {
    operation: String,
    delay: Duration,
    max_attempts: u32,
    acceptors: Vec<Acceptor>,
}

impl Builder {
    /// Fixed sleep between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Upper bound on invocations; must be at least 1.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Appends an acceptor. Acceptors are evaluated in insertion order.
    #[must_use]
    pub fn acceptor(mut self, acceptor: Acceptor) -> Self {
        self.acceptors.push(acceptor);
        self
    }

    /// Appends several acceptors, preserving their order.
    #[must_use]
    pub fn acceptors(mut self, acceptors: impl IntoIterator<Item = Acceptor>) -> Self {
        self.acceptors.extend(acceptors);
        self
    }

    /// Validates and builds the config.
    pub fn build(self) -> Result<Config, ConfigError> {
        if self.operation.is_empty() {
            return Err(ConfigError::EmptyOperation);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(Config {
            operation: self.operation,
            delay: self.delay,
            max_attempts: self.max_attempts,
            acceptors: self.acceptors,
        })
    }
}

/// Wire shape of a JSON waiter definition; `delay` is in whole seconds.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    operation: String,
    #[serde(default)]
    delay: u64,
    max_attempts: u32,
    #[serde(default)]
    acceptors: Vec<Acceptor>,
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Config::builder(raw.operation)
            .delay(Duration::from_secs(raw.delay))
            .max_attempts(raw.max_attempts)
            .acceptors(raw.acceptors)
            .build()
    }
}
