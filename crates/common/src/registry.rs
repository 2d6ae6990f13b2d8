//! Logical page registry
//!
//! Maps stable page names (`register_student_page`, `landing_page`, ...) to
//! the locations configured for the active environment. The registry is
//! built once from configuration and exposes no way to change it afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};

/// A configured location: either a path relative to the base URL or a full URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Location(String);

impl Location {
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the location carries its own scheme and host
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    /// Join this location onto `base_url`.
    ///
    /// Absolute locations are returned untouched. Relative ones are appended
    /// with exactly one `/` between base and path.
    pub fn join(&self, base_url: &str) -> String {
        if self.is_absolute() {
            return self.0.clone();
        }
        let base = base_url.trim_end_matches('/');
        let path = self.0.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable mapping from logical page name to location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRegistry {
    base_url: String,
    pages: BTreeMap<String, Location>,
}

impl PageRegistry {
    /// Build a registry for `base_url`.
    pub fn new(base_url: impl Into<String>, pages: BTreeMap<String, Location>) -> Result<Self> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidConfig(format!(
                "base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if let Some(name) = pages.keys().find(|k| k.trim().is_empty()) {
            return Err(ConfigError::InvalidConfig(format!(
                "page names must not be blank (got '{}')",
                name
            )));
        }
        Ok(Self { base_url, pages })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up the location registered under `name`
    pub fn resolve(&self, name: &str) -> Result<&Location> {
        self.pages.get(name).ok_or_else(|| ConfigError::UnknownPage {
            name: name.to_string(),
        })
    }

    /// Resolve `name` and join it onto the base URL
    pub fn url_for(&self, name: &str) -> Result<String> {
        Ok(self.resolve(name)?.join(&self.base_url))
    }

    /// Join a literal location (not a registry key) onto the base URL
    pub fn url_for_location(&self, location: &str) -> String {
        Location::new(location).join(&self.base_url)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pages.contains_key(name)
    }

    /// Registered pages, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Location)> {
        self.pages.iter().map(|(name, loc)| (name.as_str(), loc))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn registry() -> PageRegistry {
        let mut pages = BTreeMap::new();
        pages.insert("landing_page".to_string(), Location::new("/landing"));
        pages.insert("register_student_page".to_string(), Location::new("register/student"));
        pages.insert("docs".to_string(), Location::new("https://docs.example.org/start"));
        PageRegistry::new("http://localhost:3000/", pages).unwrap()
    }

    #[test]
    fn test_resolve_known_page() {
        let reg = registry();
        assert_eq!(reg.resolve("landing_page").unwrap().as_str(), "/landing");
    }

    #[test]
    fn test_resolve_unknown_page_is_error() {
        let err = registry().resolve("missing_page").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPage { ref name } if name == "missing_page"));
    }

    #[test_case("landing_page", "http://localhost:3000/landing" ; "leading slash")]
    #[test_case("register_student_page", "http://localhost:3000/register/student" ; "no leading slash")]
    #[test_case("docs", "https://docs.example.org/start" ; "absolute passes through")]
    fn test_url_for(name: &str, expected: &str) {
        assert_eq!(registry().url_for(name).unwrap(), expected);
    }

    #[test]
    fn test_join_root_location() {
        assert_eq!(Location::new("/").join("http://app.test"), "http://app.test/");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = PageRegistry::new("localhost:3000", BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn test_iter_is_sorted() {
        let registry = registry();
        let names: Vec<&str> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["docs", "landing_page", "register_student_page"]);
    }
}
