//! Huawei OLT platform profile (MA5600T/MA5800 family).
//!
//! The default platform. Users land in `>` mode and move to `#` with
//! `enable`. Either ends a read only when it follows a hostname on the
//! last line, since configuration dumps separate sections with `#` lines.

use crate::platform::{HOSTNAME_PROMPT, PlatformProfile};

/// Key under which the profile is registered.
pub const NAME: &str = "HUAWEI";

/// Create the Huawei platform profile.
pub fn profile() -> PlatformProfile {
    PlatformProfile::new(NAME, HOSTNAME_PROMPT)
        .unwrap()
        .with_login_prompt("User name:")
        .with_password_prompt("User password:")
        .with_pagination_marker("---- More ( Press 'Q' to break ) ----")
        .with_logout("quit", "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PromptMatcher;

    #[test]
    fn test_huawei_profile() {
        let profile = profile();
        assert_eq!(profile.name, "HUAWEI");
        assert_eq!(profile.login_prompt.as_str(), "User name:");
        assert_eq!(profile.password_prompt.as_str(), "User password:");
        assert_eq!(profile.logout_command, "quit");
        assert_eq!(profile.logout_confirm, "y");
    }

    #[test]
    fn test_shell_prompt_match() {
        let profile = profile();
        assert!(profile.shell_prompt.is_match(b"MA5608T>"));
        assert!(profile.shell_prompt.is_match(b"MA5608T# "));
        assert!(profile.shell_prompt.is_match(b"MA5608T(config)#"));
        assert!(profile.shell_prompt.is_match(b"MA5608T(config-if-gpon-0/1)#"));
        assert!(!profile.shell_prompt.is_match(b"User password:"));
    }

    #[test]
    fn test_config_separator_is_not_a_prompt() {
        let profile = profile();
        assert!(!profile.shell_prompt.is_match(b"[MA5600V800R018: 1]\n#\n"));
        assert!(!profile.shell_prompt.is_match(b" sysname MA5608T\n#"));
        assert!(!profile.shell_prompt.is_match(b"MA5608T#\n"));
    }

    #[test]
    fn test_pagination_marker_match() {
        let profile = profile();
        let page = b"  0/1/0  up\n---- More ( Press 'Q' to break ) ----";
        assert!(profile.pagination_marker.is_match(page));
    }

    #[test]
    fn test_failed_login_match() {
        let profile = profile();
        assert!(profile.failed_login.is_match(b"Username or password invalid."));
        assert!(profile.failed_login.is_match(b"Reenter times have reached the upper limit."));
        assert!(profile.failed_login.is_match(b"User account is locked"));
        assert!(!profile.failed_login.is_match(b"MA5608T>"));
    }
}
