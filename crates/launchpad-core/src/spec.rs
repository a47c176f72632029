//! Package specifier parsing: `name[<op>constraint]` strings.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::CoreError;

/// An operator recognized in front of a version constraint, in the order
/// they are tried against the input (earlier entries win when several
/// would match at the same position).
const OPERATORS: [&str; 6] = [">=", "<=", ">", "<", "^", "~"];

/// A parsed package specifier: a domain name plus an optional, still-raw
/// constraint string. The constraint is not interpreted here; that's the
/// resolver's job (see `launchpad_core::resolve::VersionConstraint`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub constraint: Option<String>,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, constraint: Option<String>) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }
}

/// Parse a specifier such as `pcre.org/v2>=10.30` or `@scoped/pkg@1.0.0`.
///
/// Operators are tried in priority order `>=, <=, >, <, ^, ~`; whichever is
/// found first (leftmost occurrence of the highest-priority operator) splits
/// the string, and everything from that operator onward — including the
/// operator itself — becomes the constraint. Only if none of those match do
/// we fall back to splitting on the last `@`, which is a pure separator (it
/// is not kept in the constraint) so that a leading `@` stays part of a
/// scoped name and an `@` inside a domain (`org@domain.com/pkg`) doesn't get
/// mistaken for the separator.
pub fn parse(spec: &str) -> Result<PackageSpec, CoreError> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidSpec(spec.to_string()));
    }

    for op in OPERATORS {
        if let Some(idx) = trimmed.find(op) {
            let name = &trimmed[..idx];
            let constraint = &trimmed[idx..];
            return Ok(PackageSpec::new(name, Some(constraint.to_string())));
        }
    }

    if let Some(last_at) = trimmed.rfind('@') {
        if last_at > 0 {
            let name = &trimmed[..last_at];
            let constraint = &trimmed[last_at + 1..];
            let constraint = if constraint.is_empty() {
                None
            } else {
                Some(constraint.to_string())
            };
            return Ok(PackageSpec::new(name, constraint));
        }
    }

    Ok(PackageSpec::new(trimmed, None))
}

static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("node", "nodejs.org"),
        ("postgres", "postgresql.org"),
        ("postgresql", "postgresql.org"),
        ("go", "go.dev"),
        ("golang", "go.dev"),
        ("python", "python.org"),
        ("ripgrep", "github.com/BurntSushi/ripgrep"),
        ("rg", "github.com/BurntSushi/ripgrep"),
        ("wget", "gnu.org/wget"),
    ])
});

/// Resolve a well-known shorthand name to its catalog domain. Case
/// insensitive; names with no known alias pass through unchanged.
pub fn resolve_alias(name: &str) -> String {
    ALIASES
        .get(name.to_lowercase().as_str())
        .map(|domain| domain.to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gte_constraint() {
        let spec = parse("pcre.org/v2>=10.30").unwrap();
        assert_eq!(spec.name, "pcre.org/v2");
        assert_eq!(spec.constraint.as_deref(), Some(">=10.30"));
    }

    #[test]
    fn scoped_name_keeps_leading_at_and_splits_on_last_at() {
        let spec = parse("@scoped/pkg@1.0.0").unwrap();
        assert_eq!(spec.name, "@scoped/pkg");
        assert_eq!(spec.constraint.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn domain_with_embedded_at_splits_on_last_occurrence() {
        let spec = parse("org@domain.com/pkg@1.0.0").unwrap();
        assert_eq!(spec.name, "org@domain.com/pkg");
        assert_eq!(spec.constraint.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn bare_name_has_no_constraint() {
        let spec = parse("nodejs.org").unwrap();
        assert_eq!(spec.name, "nodejs.org");
        assert_eq!(spec.constraint, None);
    }

    #[test]
    fn malformed_operator_is_kept_verbatim() {
        let spec = parse("package>=").unwrap();
        assert_eq!(spec.name, "package");
        assert_eq!(spec.constraint.as_deref(), Some(">="));
    }

    #[test]
    fn multi_operator_constraint_preserved_as_one_string() {
        let spec = parse("openssl.org>=1.1.0<1.1.43").unwrap();
        assert_eq!(spec.name, "openssl.org");
        assert_eq!(spec.constraint.as_deref(), Some(">=1.1.0<1.1.43"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(parse("   ").is_err());
    }

    #[test]
    fn alias_lookup_is_case_insensitive() {
        assert_eq!(resolve_alias("Node"), "nodejs.org");
        assert_eq!(resolve_alias("RG"), "github.com/BurntSushi/ripgrep");
        assert_eq!(resolve_alias("unknown-thing"), "unknown-thing");
    }
}
