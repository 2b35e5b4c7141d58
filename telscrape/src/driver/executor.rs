//! Public entry point: run a command list against one device.

use log::info;

use super::builder::ExecutorBuilder;
use super::runner::{CommandRequest, CommandResult, CommandRunner};
use super::scope::SessionScope;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::transport::{Connector, TcpConnector};

/// Runs ordered command lists on devices, one session per call.
///
/// An executor holds no per-device state, so one instance can serve any
/// number of concurrent calls for different hosts.
///
/// # Example
///
/// ```rust,no_run
/// use telscrape::{ConnectionConfig, Executor};
///
/// # async fn example() -> Result<(), telscrape::Error> {
/// let executor = Executor::new();
/// let config = ConnectionConfig::new("10.0.0.1", "admin", "secret")
///     .with_platform("HUAWEI");
///
/// let output = executor
///     .execute(&config, &["display version"], &[])
///     .await?;
/// println!("{}", output);
/// # Ok(())
/// # }
/// ```
pub struct Executor<C = TcpConnector> {
    scope: SessionScope<C>,
    runner: CommandRunner,
}

impl Executor {
    /// Executor with the built-in platforms and default timings over TCP.
    pub fn new() -> Self {
        ExecutorBuilder::new().build()
    }

    pub fn builder() -> ExecutorBuilder {
        ExecutorBuilder::new()
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> Executor<C> {
    pub(crate) fn from_parts(scope: SessionScope<C>, runner: CommandRunner) -> Self {
        Self { scope, runner }
    }

    /// Run `commands` in order and return their concatenated output.
    ///
    /// The first failing command aborts the rest; its error is returned and
    /// no partial output is. The session is logged out in every case.
    pub async fn execute<S: AsRef<str>>(
        &self,
        config: &ConnectionConfig,
        commands: &[S],
        error_markers: &[String],
    ) -> Result<String> {
        let results = self.execute_each(config, commands, error_markers).await?;
        Ok(results.into_iter().map(|r| r.output).collect())
    }

    /// Like [`execute`](Self::execute), keeping one result per command.
    pub async fn execute_each<S: AsRef<str>>(
        &self,
        config: &ConnectionConfig,
        commands: &[S],
        error_markers: &[String],
    ) -> Result<Vec<CommandResult>> {
        let runner = &self.runner;
        let results = self
            .scope
            .with_session(config, async |session| -> Result<Vec<CommandResult>> {
                let mut results = Vec::with_capacity(commands.len());
                for command in commands {
                    let request = CommandRequest::new(command.as_ref(), error_markers);
                    results.push(runner.run(session, request).await?);
                }
                Ok(results)
            })
            .await?;

        info!("{}: {} command(s) completed", config.host, results.len());
        Ok(results)
    }
}

/// Run `commands` on the device described by `config` with default settings.
///
/// Shorthand for [`Executor::new`] followed by [`Executor::execute`].
pub async fn run_commands<S: AsRef<str>>(
    config: &ConnectionConfig,
    commands: &[S],
    error_markers: &[String],
) -> Result<String> {
    Executor::new().execute(config, commands, error_markers).await
}
