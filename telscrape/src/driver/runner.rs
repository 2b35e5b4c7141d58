//! Single-command execution with pagination and error-marker detection.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use tokio::io::{AsyncRead, AsyncWrite};

use super::session::Session;
use crate::config::SessionOptions;
use crate::error::{CommandError, TransportError};
use crate::platform::PlatformProfile;
use crate::transport::TelnetTransport;

/// Matcher index of the pagination marker in each command read.
const MORE: usize = 1;

/// One command to run, with the markers that make it fail.
#[derive(Debug, Clone, Copy)]
pub struct CommandRequest<'a> {
    /// Command text, without the line break.
    pub text: &'a str,

    /// Literal substrings that mark the output as failed. Empty disables
    /// detection.
    pub error_markers: &'a [String],
}

impl<'a> CommandRequest<'a> {
    pub fn new(text: &'a str, error_markers: &'a [String]) -> Self {
        Self {
            text,
            error_markers,
        }
    }
}

/// Output of a command that completed without matching an error marker.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The command that was executed.
    pub command: String,

    /// The command output (pagination markers, command echo and trailing
    /// prompt removed).
    pub output: String,

    /// Number of pagination continuations sent.
    pub pages: usize,

    /// Time taken to execute the command.
    pub elapsed: Duration,
}

impl CommandResult {
    /// Get the output lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }

    /// Check if the output contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.output.contains(pattern)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.output)
    }
}

/// Runs commands on a session, paging through "more" prompts.
///
/// Commands are never retried; a device command is not assumed to be
/// idempotent.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    options: SessionOptions,
}

impl CommandRunner {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Send one command and collect its complete output.
    ///
    /// Error markers are checked after the first read and again after every
    /// continuation, so a match stops paging immediately.
    pub async fn run<S>(
        &self,
        session: &mut Session<S>,
        request: CommandRequest<'_>,
    ) -> Result<CommandResult, CommandError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let command = request.text;
        let failed = |source: TransportError| CommandError::ExecutionFailed {
            command: command.to_string(),
            source,
        };

        let start = Instant::now();
        let (profile, transport) = session.parts().map_err(failed)?;

        debug!("sending command {:?}", command);
        transport
            .send(&format!("{}\n", command))
            .await
            .map_err(failed)?;

        let mut accumulated = String::new();
        let mut matched = self
            .read_fragment(profile, transport, &mut accumulated)
            .await
            .map_err(failed)?;
        check_markers(&request, &accumulated)?;

        let mut pages = 0;
        while matched == MORE {
            tokio::time::sleep(self.options.pagination_delay).await;
            transport
                .send(&self.options.continuation_key)
                .await
                .map_err(failed)?;
            pages += 1;
            trace!("{:?}: continuation {}", command, pages);

            matched = self
                .read_fragment(profile, transport, &mut accumulated)
                .await
                .map_err(failed)?;
            check_markers(&request, &accumulated)?;
        }

        let elapsed = start.elapsed();
        debug!(
            "{:?} finished in {:?} ({} continuation(s))",
            command, elapsed, pages
        );

        Ok(CommandResult {
            command: command.to_string(),
            output: normalize_output(&accumulated, command),
            pages,
            elapsed,
        })
    }

    /// Read up to the shell prompt or a trailing pagination marker and
    /// append the marker-free text.
    async fn read_fragment<S>(
        &self,
        profile: &PlatformProfile,
        transport: &mut TelnetTransport<S>,
        accumulated: &mut String,
    ) -> Result<usize, TransportError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let read = transport
            .read_until(
                &[&profile.shell_prompt, &profile.pagination_marker.trailing()],
                self.options.command_timeout,
            )
            .await?;
        accumulated.push_str(&profile.pagination_marker.strip_all(&read.as_str()));
        Ok(read.matched)
    }
}

fn check_markers(request: &CommandRequest<'_>, output: &str) -> Result<(), CommandError> {
    match request
        .error_markers
        .iter()
        .find(|marker| output.contains(marker.as_str()))
    {
        Some(marker) => {
            warn!("{:?} output matched error marker {:?}", request.text, marker);
            Err(CommandError::PatternMatched {
                command: request.text.to_string(),
                marker: marker.clone(),
                output: output.to_string(),
            })
        }
        None => Ok(()),
    }
}

/// Strip the echoed command and the trailing prompt line.
///
/// The result keeps its final line break so outputs of consecutive
/// commands concatenate line by line.
pub fn normalize_output(raw: &str, command: &str) -> String {
    let output = raw
        .strip_prefix(command)
        .unwrap_or(raw)
        .trim_start_matches(['\r', '\n']);

    match output.rfind('\n') {
        Some(pos) => output[..=pos].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio_test::io::Builder;

    use super::*;
    use crate::platform::vendors::{huawei, zte};

    const HUAWEI_MORE: &str = "---- More ( Press 'Q' to break ) ----";

    fn session(
        mock: tokio_test::io::Mock,
        profile: PlatformProfile,
    ) -> Session<tokio_test::io::Mock> {
        Session::new(TelnetTransport::new(mock), Arc::new(profile), "10.0.0.1")
    }

    fn runner() -> CommandRunner {
        CommandRunner::new(SessionOptions {
            pagination_delay: Duration::from_millis(1),
            command_timeout: Duration::from_secs(1),
            ..SessionOptions::default()
        })
    }

    #[test]
    fn test_normalize_output() {
        let raw = "display version\n\nVERSION : MA5600V800R018C10\nPATCH : SPH210\nMA5608T>";
        assert_eq!(
            normalize_output(raw, "display version"),
            "VERSION : MA5600V800R018C10\nPATCH : SPH210\n"
        );
    }

    #[test]
    fn test_normalize_output_without_echo() {
        assert_eq!(normalize_output("line\nOLT#", "show clock"), "line\n");
        assert_eq!(normalize_output("OLT#", "show clock"), "");
    }

    #[tokio::test]
    async fn test_run_single_page() {
        let mock = Builder::new()
            .write(b"display version\n")
            .read(b"display version\r\n\r\nVERSION : MA5600V800R018C10\r\n\r\nMA5608T>")
            .build();
        let mut session = session(mock, huawei::profile());

        let result = runner()
            .run(&mut session, CommandRequest::new("display version", &[]))
            .await
            .unwrap();
        assert_eq!(result.output, "VERSION : MA5600V800R018C10\n\n");
        assert_eq!(result.pages, 0);
        assert_eq!(result.command, "display version");
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_run_pages_through_more_prompts() {
        let erase = format!("\x1b[37D{}\x1b[37D", " ".repeat(37));
        let mock = Builder::new()
            .write(b"display board 0\n")
            .read(format!("display board 0\r\nslot 0  H805GPFD\r\n{}", HUAWEI_MORE).as_bytes())
            .write(b" ")
            .read(format!("{}slot 1  H802SCUN\r\n{}", erase, HUAWEI_MORE).as_bytes())
            .write(b" ")
            .read(format!("{}slot 2  H801X2CS\r\n\r\nMA5608T#", erase).as_bytes())
            .build();
        let mut session = session(mock, huawei::profile());

        let result = runner()
            .run(&mut session, CommandRequest::new("display board 0", &[]))
            .await
            .unwrap();
        assert_eq!(result.pages, 2);
        assert_eq!(
            result.output,
            "slot 0  H805GPFD\nslot 1  H802SCUN\nslot 2  H801X2CS\n\n"
        );
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_section_separator_at_read_boundary() {
        let mock = Builder::new()
            .write(b"display current-configuration\n")
            .read(b"display current-configuration\r\n[MA5600V800R018: 1]\r\n#\r\n")
            .read(b" sysname MA5608T\r\n#\r\nreturn\r\nMA5608T#")
            .write(b"display time\n")
            .read(b"display time\r\n2026-10-16 09:00:00+08:00\r\nMA5608T#")
            .build();
        let mut session = session(mock, huawei::profile());
        let runner = runner();

        let config = runner
            .run(&mut session, CommandRequest::new("display current-configuration", &[]))
            .await
            .unwrap();
        assert_eq!(
            config.output,
            "[MA5600V800R018: 1]\n#\n sysname MA5608T\n#\nreturn\n"
        );

        let time = runner
            .run(&mut session, CommandRequest::new("display time", &[]))
            .await
            .unwrap();
        assert_eq!(time.output, "2026-10-16 09:00:00+08:00\n");
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_empty_pagination_marker_disables_paging() {
        let mock = Builder::new()
            .write(b"display version\n")
            .read(b"display version\r\nVERSION : MA5600V800R018C10\r\nMA5608T>")
            .build();
        let mut session = session(mock, huawei::profile().with_pagination_marker(""));

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            runner().run(&mut session, CommandRequest::new("display version", &[])),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(result.output, "VERSION : MA5600V800R018C10\n");
        assert_eq!(result.pages, 0);
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_marker_followed_by_text_is_not_a_page_break() {
        let mock = Builder::new()
            .write(b"show run\n")
            .read(b"show run\r\n--More--\r\nline 2\r\n")
            .read(b"ZXAN#")
            .build();
        let mut session = session(mock, zte::profile());

        let result = runner()
            .run(&mut session, CommandRequest::new("show run", &[]))
            .await
            .unwrap();
        assert_eq!(result.pages, 0);
        assert_eq!(result.output, "line 2\n");
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_markers_in_one_read_are_stripped() {
        let mock = Builder::new()
            .write(b"show card\n")
            .read(b"show card\r\nA--More--B--More--C\r\nZXAN#")
            .build();
        let mut session = session(mock, zte::profile());

        let result = runner()
            .run(&mut session, CommandRequest::new("show card", &[]))
            .await
            .unwrap();
        assert_eq!(result.output, "ABC\n");
        assert_eq!(result.pages, 0);
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_error_marker_stops_paging() {
        let mock = Builder::new()
            .write(b"configure bad-syntax\n")
            .read(b"configure bad-syntax\r\n% Invalid command\r\n--More--")
            .build();
        let mut session = session(mock, zte::profile());
        let markers = vec!["% Invalid".to_string()];

        let err = runner()
            .run(&mut session, CommandRequest::new("configure bad-syntax", &markers))
            .await
            .unwrap_err();
        match err {
            CommandError::PatternMatched {
                command,
                marker,
                output,
            } => {
                assert_eq!(command, "configure bad-syntax");
                assert_eq!(marker, "% Invalid");
                assert!(output.contains("% Invalid command"));
                assert!(!output.contains("--More--"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_error_marker_found_on_later_page() {
        let mock = Builder::new()
            .write(b"show run\n")
            .read(b"show run\r\nline 1\r\n--More--")
            .write(b" ")
            .read(b"ERROR: bad command\r\n--More--")
            .build();
        let mut session = session(mock, zte::profile());
        let markers = vec!["ERROR:".to_string()];

        let err = runner()
            .run(&mut session, CommandRequest::new("show run", &markers))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::PatternMatched { .. }));
        drop(session.take_transport());
    }

    #[tokio::test]
    async fn test_disconnect_is_execution_failure() {
        let mock = Builder::new()
            .write(b"display version\n")
            .read(b"display version\r\n")
            .build();
        let mut session = session(mock, huawei::profile());

        let err = runner()
            .run(&mut session, CommandRequest::new("display version", &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::ExecutionFailed {
                source: TransportError::Disconnected,
                ..
            }
        ));
        assert_eq!(err.command(), "display version");
        drop(session.take_transport());
    }
}
