//! Platform registry for looking up platform profiles.

use std::sync::Arc;

use indexmap::IndexMap;
use log::warn;

use super::profile::PlatformProfile;
use super::vendors;

/// Immutable mapping from platform key to profile.
///
/// Built once at startup and shared by reference (usually through an
/// `Arc`). Keys are case-insensitive. The default profile is always
/// present, so [`lookup`](Self::lookup) cannot fail.
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: IndexMap<String, Arc<PlatformProfile>>,
    default: String,
}

impl PlatformRegistry {
    /// Registry holding the built-in profiles, with Huawei as default.
    pub fn builtin() -> Self {
        Self::builder().build()
    }

    /// Start from the built-in profiles and add or replace entries.
    pub fn builder() -> RegistryBuilder {
        let mut platforms = IndexMap::new();
        for profile in [vendors::huawei::profile(), vendors::zte::profile()] {
            platforms.insert(normalize_key(&profile.name), Arc::new(profile));
        }
        RegistryBuilder {
            platforms,
            default: vendors::huawei::NAME.to_string(),
        }
    }

    /// Resolve a platform key, falling back to the default profile when
    /// the key is absent or unknown.
    pub fn lookup(&self, key: Option<&str>) -> Arc<PlatformProfile> {
        key.and_then(|name| self.get(name))
            .unwrap_or_else(|| self.default_profile())
            .clone()
    }

    /// Get a profile by key.
    pub fn get(&self, name: &str) -> Option<&Arc<PlatformProfile>> {
        self.platforms.get(&normalize_key(name))
    }

    /// Check if a platform is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.platforms.contains_key(&normalize_key(name))
    }

    /// List registered platform keys in registration order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.platforms.keys()
    }

    /// Key of the default profile.
    pub fn default_name(&self) -> &str {
        &self.default
    }

    fn default_profile(&self) -> &Arc<PlatformProfile> {
        // The builder guarantees the default key is present
        &self.platforms[&self.default]
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Builder for a [`PlatformRegistry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    platforms: IndexMap<String, Arc<PlatformProfile>>,
    default: String,
}

impl RegistryBuilder {
    /// Register a profile under its name, replacing any existing entry.
    pub fn register(mut self, profile: PlatformProfile) -> Self {
        self.platforms
            .insert(normalize_key(&profile.name), Arc::new(profile));
        self
    }

    /// Choose the profile used when no key is supplied.
    pub fn default_platform(mut self, name: impl AsRef<str>) -> Self {
        self.default = normalize_key(name.as_ref());
        self
    }

    pub fn build(self) -> PlatformRegistry {
        let default = if self.platforms.contains_key(&self.default) {
            self.default
        } else {
            warn!(
                "default platform {:?} is not registered, using {}",
                self.default,
                vendors::huawei::NAME
            );
            vendors::huawei::NAME.to_string()
        };

        PlatformRegistry {
            platforms: self.platforms,
            default,
        }
    }
}

fn normalize_key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_platforms() {
        let registry = PlatformRegistry::builtin();
        assert!(registry.contains("HUAWEI"));
        assert!(registry.contains("zte"));
        assert_eq!(registry.default_name(), "HUAWEI");
        assert_eq!(registry.names().count(), 2);
    }

    #[test]
    fn test_lookup_falls_back_to_default() {
        let registry = PlatformRegistry::builtin();
        assert_eq!(registry.lookup(None).name, "HUAWEI");
        assert_eq!(registry.lookup(Some("nokia")).name, "HUAWEI");
        assert_eq!(registry.lookup(Some("zte")).name, "ZTE");
    }

    #[test]
    fn test_register_replaces_and_sets_default() {
        let lab = PlatformProfile::new("lab", r"\$")
            .unwrap()
            .with_login_prompt("login:");
        let registry = PlatformRegistry::builder()
            .register(lab)
            .default_platform("Lab")
            .build();

        assert_eq!(registry.lookup(None).login_prompt.as_str(), "login:");
        assert_eq!(registry.names().count(), 3);
    }

    #[test]
    fn test_unknown_default_keeps_huawei() {
        let registry = PlatformRegistry::builder()
            .default_platform("missing")
            .build();
        assert_eq!(registry.default_name(), "HUAWEI");
    }
}
