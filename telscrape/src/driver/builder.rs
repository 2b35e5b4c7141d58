//! Builder for configuring an [`Executor`].

use std::sync::Arc;
use std::time::Duration;

use super::connection::ConnectionManager;
use super::executor::Executor;
use super::runner::CommandRunner;
use super::scope::SessionScope;
use crate::channel::DEFAULT_SEARCH_DEPTH;
use crate::config::SessionOptions;
use crate::platform::PlatformRegistry;
use crate::retry::RetryPolicy;
use crate::transport::{Connector, TcpConnector};

/// Builder for constructing executors.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use telscrape::{ExecutorBuilder, RetryPolicy};
///
/// let executor = ExecutorBuilder::new()
///     .command_timeout(Duration::from_secs(60))
///     .retry_policy(RetryPolicy::none())
///     .build();
/// ```
pub struct ExecutorBuilder<C = TcpConnector> {
    connector: C,
    registry: Arc<PlatformRegistry>,
    retry: RetryPolicy,
    options: SessionOptions,
    search_depth: usize,
}

impl ExecutorBuilder {
    /// Create a builder with the built-in platforms over plain TCP.
    pub fn new() -> Self {
        Self {
            connector: TcpConnector,
            registry: Arc::new(PlatformRegistry::builtin()),
            retry: RetryPolicy::default(),
            options: SessionOptions::default(),
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }
}

impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> ExecutorBuilder<C> {
    /// Use a different stream source (proxies, jump hosts, tests).
    pub fn connector<D: Connector>(self, connector: D) -> ExecutorBuilder<D> {
        ExecutorBuilder {
            connector,
            registry: self.registry,
            retry: self.retry,
            options: self.options,
            search_depth: self.search_depth,
        }
    }

    /// Set the platform registry shared by every session.
    pub fn registry(mut self, registry: Arc<PlatformRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace all session timings at once.
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the per-read timeout while a command runs.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.options.command_timeout = timeout;
        self
    }

    /// Set the pause before answering a pagination marker.
    pub fn pagination_delay(mut self, delay: Duration) -> Self {
        self.options.pagination_delay = delay;
        self
    }

    /// Set the keystroke sent to get the next page (default: space).
    pub fn continuation_key(mut self, key: impl Into<String>) -> Self {
        self.options.continuation_key = key.into();
        self
    }

    /// Set the pause between the logout command and its confirmation.
    pub fn logout_delay(mut self, delay: Duration) -> Self {
        self.options.logout_delay = delay;
        self
    }

    /// Set how many trailing bytes are searched for prompts.
    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    /// Build the executor.
    ///
    /// Nothing connects until [`Executor::execute`] is called.
    pub fn build(self) -> Executor<C> {
        let manager =
            ConnectionManager::new(self.connector, self.registry, self.retry, self.search_depth);
        let scope = SessionScope::new(manager, self.options.clone());
        Executor::from_parts(scope, CommandRunner::new(self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformProfile;

    #[test]
    fn test_builder_defaults() {
        let builder = ExecutorBuilder::new();
        assert_eq!(builder.options.command_timeout, Duration::from_secs(30));
        assert_eq!(builder.options.continuation_key, " ");
        assert_eq!(builder.retry.max_retries(), 2);
        assert_eq!(builder.search_depth, DEFAULT_SEARCH_DEPTH);
        assert_eq!(builder.registry.default_name(), "HUAWEI");
    }

    #[test]
    fn test_builder_overrides() {
        let lab = PlatformProfile::new("LAB", r"\$").unwrap();
        let registry = PlatformRegistry::builder().register(lab).build();

        let builder = ExecutorBuilder::new()
            .registry(Arc::new(registry))
            .continuation_key("\n")
            .pagination_delay(Duration::from_millis(10))
            .logout_delay(Duration::from_millis(500))
            .search_depth(4096)
            .retry_policy(RetryPolicy::none());

        assert!(builder.registry.contains("lab"));
        assert_eq!(builder.options.continuation_key, "\n");
        assert_eq!(builder.options.pagination_delay, Duration::from_millis(10));
        assert_eq!(builder.options.logout_delay, Duration::from_millis(500));
        assert_eq!(builder.search_depth, 4096);
        assert_eq!(builder.retry.max_retries(), 0);
    }
}
