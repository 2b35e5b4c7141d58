//! Platform profile for vendor-specific prompts and markers.

use regex::bytes::Regex;

use crate::channel::{Literal, compile_prompt_pattern};

/// Login failure messages shared by the OLT families we drive.
pub const DEFAULT_FAILED_LOGIN: &str =
    r"Username or password invalid|Reenter times have reached|User account is locked";

/// Hostname, optional `(config...)` mode, then `>` or `#`.
pub const HOSTNAME_PROMPT: &str = r"[\w.\-]+(?:\([^)]*\))?[>#]";

/// Everything needed to drive login, paging and logout on one device family.
///
/// Profiles are built once when the registry is constructed and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    /// Platform key (e.g., "HUAWEI", "ZTE").
    pub name: String,

    /// Shell prompt, anchored to the end of the buffer.
    pub shell_prompt: Regex,

    /// Text the device prints when asking for a username.
    pub login_prompt: Literal,

    /// Text the device prints when asking for a password.
    pub password_prompt: Literal,

    /// Text the device prints when output exceeds one screen.
    pub pagination_marker: Literal,

    /// Matches a rejected login (bad credentials, retry limit, lockout).
    pub failed_login: Regex,

    /// Command that ends the CLI session.
    pub logout_command: String,

    /// Keystroke that confirms the logout question.
    pub logout_confirm: String,
}

impl PlatformProfile {
    /// Create a profile with generic prompts.
    ///
    /// The shell prompt is anchored with [`compile_prompt_pattern`].
    pub fn new(name: impl Into<String>, shell_prompt: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            shell_prompt: compile_prompt_pattern(shell_prompt)?,
            login_prompt: Literal::new("Username:"),
            password_prompt: Literal::new("Password:"),
            pagination_marker: Literal::new("--More--"),
            failed_login: Regex::new(DEFAULT_FAILED_LOGIN)?,
            logout_command: "quit".to_string(),
            logout_confirm: "y".to_string(),
        })
    }

    pub fn with_login_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.login_prompt = Literal::new(prompt);
        self
    }

    pub fn with_password_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.password_prompt = Literal::new(prompt);
        self
    }

    pub fn with_pagination_marker(mut self, marker: impl Into<String>) -> Self {
        self.pagination_marker = Literal::new(marker);
        self
    }

    /// Replace the failed-login pattern.
    pub fn with_failed_login(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.failed_login = Regex::new(pattern)?;
        Ok(self)
    }

    /// Set the logout command and its confirmation keystroke.
    pub fn with_logout(mut self, command: impl Into<String>, confirm: impl Into<String>) -> Self {
        self.logout_command = command.into();
        self.logout_confirm = confirm.into();
        self
    }
}
