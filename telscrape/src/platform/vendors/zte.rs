//! ZTE OLT platform profile (C300/C320 family).

use crate::platform::{HOSTNAME_PROMPT, PlatformProfile};

/// Key under which the profile is registered.
pub const NAME: &str = "ZTE";

/// Create the ZTE platform profile.
pub fn profile() -> PlatformProfile {
    PlatformProfile::new(NAME, HOSTNAME_PROMPT)
        .unwrap()
        .with_login_prompt("Username:")
        .with_password_prompt("Password:")
        .with_pagination_marker("--More--")
        .with_logout("exit", "y")
}
