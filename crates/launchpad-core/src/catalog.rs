//! The package catalog: a read-only index of domains, versions, and
//! dependencies. Treated as an injected data source — the production
//! implementation (file-backed, synced from a distribution mirror) lives
//! outside this crate's scope; this module only defines the interface and
//! a deterministic in-memory fixture for tests.

use std::collections::HashMap;

/// Catalog metadata for a single domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub latest_version: Option<String>,
    pub dependencies: Vec<String>,
    pub programs: Vec<String>,
    pub companions: Vec<String>,
}

/// A read-only source of package versions and metadata. Lookups never
/// fail: unknown domains return empty/`None` rather than an error, since
/// "is this package known" is itself a meaningful answer the resolver
/// needs to keep going.
pub trait Catalog {
    /// Versions for `domain`, sorted newest first. Empty for unknown
    /// domains.
    fn versions(&self, domain: &str) -> Vec<String>;

    /// Metadata for `domain`, or `None` if the domain is unknown.
    fn info(&self, domain: &str) -> Option<PackageInfo>;

    /// Resolve a well-known shorthand to its canonical domain.
    fn resolve_alias(&self, alias: &str) -> String {
        crate::spec::resolve_alias(alias)
    }
}

/// A hand-built, deterministic catalog used by resolver/installer tests so
/// they never depend on network access.
#[derive(Debug, Clone, Default)]
pub struct FixtureCatalog {
    entries: HashMap<String, (Vec<String>, PackageInfo)>,
}

impl FixtureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain with versions (newest first) and its dependency
    /// metadata.
    pub fn with_package(
        mut self,
        domain: impl Into<String>,
        versions: impl IntoIterator<Item = impl Into<String>>,
        dependencies: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let versions: Vec<String> = versions.into_iter().map(Into::into).collect();
        let info = PackageInfo {
            latest_version: versions.first().cloned(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            programs: Vec::new(),
            companions: Vec::new(),
        };
        self.entries.insert(domain.into(), (versions, info));
        self
    }
}

impl Catalog for FixtureCatalog {
    fn versions(&self, domain: &str) -> Vec<String> {
        self.entries
            .get(domain)
            .map(|(versions, _)| versions.clone())
            .unwrap_or_default()
    }

    fn info(&self, domain: &str) -> Option<PackageInfo> {
        self.entries.get(domain).map(|(_, info)| info.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_domain_returns_empty_not_error() {
        let catalog = FixtureCatalog::new();
        assert!(catalog.versions("nowhere.example").is_empty());
        assert!(catalog.info("nowhere.example").is_none());
    }

    #[test]
    fn fixture_roundtrips_registered_package() {
        let catalog =
            FixtureCatalog::new().with_package("pcre.org/v2", ["10.40", "10.30"], Vec::<String>::new());
        assert_eq!(catalog.versions("pcre.org/v2"), vec!["10.40", "10.30"]);
        assert_eq!(
            catalog.info("pcre.org/v2").unwrap().latest_version.as_deref(),
            Some("10.40")
        );
    }
}
