//! Constraint resolution and transitive closure computation (spec §4.3).

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::error::ResolverWarning;
use crate::model::ResolvedPackage;
use crate::spec::PackageSpec;
use crate::version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Gte,
    Lte,
    Gt,
    Lt,
}

/// A tagged version constraint, parsed from the raw string a `PackageSpec`
/// carries. `v` is a dotted numeric with an optional non-numeric suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Latest,
    Exact(String),
    Caret(String),
    Tilde(String),
    /// One or more `op value` clauses, ANDed together (e.g.
    /// `>=1.1.0<1.1.43`).
    Conjunction(Vec<(String, String)>),
    Range(String, String),
    Pattern(String),
}

const CLAUSE_OPS: [(&str, Op); 4] = [(">=", Op::Gte), ("<=", Op::Lte), (">", Op::Gt), ("<", Op::Lt)];

fn tokenize_clauses(s: &str) -> Vec<(Op, &str)> {
    let mut clauses = Vec::new();
    let mut rest = s;
    while !rest.is_empty() {
        let Some((op, after_op)) = CLAUSE_OPS
            .iter()
            .find_map(|(tok, op)| rest.strip_prefix(tok).map(|after| (*op, after)))
        else {
            break;
        };
        let next_op_idx = CLAUSE_OPS
            .iter()
            .filter_map(|(tok, _)| after_op.find(tok))
            .min();
        let (value, remainder) = match next_op_idx {
            Some(idx) => (&after_op[..idx], &after_op[idx..]),
            None => (after_op, ""),
        };
        clauses.push((op, value));
        rest = remainder;
    }
    clauses
}

fn looks_like_pattern(s: &str) -> bool {
    s.split('.').any(|part| part.eq_ignore_ascii_case("x"))
}

impl VersionConstraint {
    pub fn parse(constraint: Option<&str>) -> VersionConstraint {
        let Some(raw) = constraint.map(str::trim) else {
            return VersionConstraint::Latest;
        };
        if raw.is_empty() || raw.eq_ignore_ascii_case("latest") || raw == "*" {
            return VersionConstraint::Latest;
        }
        if let Some((lo, hi)) = raw.split_once(" - ") {
            return VersionConstraint::Range(lo.trim().to_string(), hi.trim().to_string());
        }
        if let Some(rest) = raw.strip_prefix('^') {
            return VersionConstraint::Caret(rest.to_string());
        }
        if let Some(rest) = raw.strip_prefix('~') {
            return VersionConstraint::Tilde(rest.to_string());
        }
        if raw.starts_with(">=") || raw.starts_with("<=") || raw.starts_with('>') || raw.starts_with('<')
        {
            let clauses: Vec<(String, String)> = tokenize_clauses(raw)
                .into_iter()
                .map(|(op, v)| (op_str(op).to_string(), v.to_string()))
                .collect();
            if clauses.is_empty() {
                // malformed, e.g. a bare ">=" with nothing after it
                return VersionConstraint::Conjunction(vec![(raw.to_string(), String::new())]);
            }
            return VersionConstraint::Conjunction(clauses);
        }
        if looks_like_pattern(raw) {
            return VersionConstraint::Pattern(raw.to_string());
        }
        VersionConstraint::Exact(raw.to_string())
    }
}

fn op_str(op: Op) -> &'static str {
    match op {
        Op::Gte => ">=",
        Op::Lte => "<=",
        Op::Gt => ">",
        Op::Lt => "<",
    }
}

fn satisfies_clause(v: &str, op: &str, bound: &str) -> bool {
    let ord = version::compare(v, bound);
    match op {
        ">=" => ord != Ordering::Less,
        "<=" => ord != Ordering::Greater,
        ">" => ord == Ordering::Greater,
        "<" => ord == Ordering::Less,
        _ => false,
    }
}

fn newest_matching<'a>(
    versions: &'a [String],
    pred: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    versions
        .iter()
        .map(String::as_str)
        .filter(|v| pred(v))
        .max_by(|a, b| version::compare(a, b))
}

/// Resolve a single constraint against a (newest-first) version list,
/// per the table in spec §4.3.
pub fn resolve(constraint: &VersionConstraint, versions: &[String]) -> Option<String> {
    if versions.is_empty() {
        return None;
    }
    match constraint {
        VersionConstraint::Latest => versions.first().cloned(),
        VersionConstraint::Exact(v) => versions
            .iter()
            .find(|candidate| *candidate == v)
            .cloned()
            .or_else(|| newest_matching(versions, |c| c.starts_with(v.as_str())).map(String::from)),
        VersionConstraint::Caret(v) => {
            let parts: Vec<&str> = v.split('.').collect();
            let major: u64 = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
            let min_minor: Option<u64> = parts.get(1).and_then(|p| p.parse().ok());
            let min_patch: Option<u64> = parts.get(2).and_then(|p| p.parse().ok());
            newest_matching(versions, |c| {
                if version::numeric_prefix(c, 0) != major {
                    return false;
                }
                if let Some(min_minor) = min_minor {
                    if version::numeric_prefix(c, 1) < min_minor {
                        return false;
                    }
                }
                if let Some(min_patch) = min_patch {
                    if version::numeric_prefix(c, 2) < min_patch {
                        return false;
                    }
                }
                true
            })
            .map(String::from)
        },
        VersionConstraint::Tilde(v) => {
            let parts: Vec<&str> = v.split('.').collect();
            let major: u64 = parts.first().and_then(|p| p.parse().ok()).unwrap_or(0);
            let minor: u64 = parts.get(1).and_then(|p| p.parse().ok()).unwrap_or(0);
            let min_patch: Option<u64> = parts.get(2).and_then(|p| p.parse().ok());
            newest_matching(versions, |c| {
                if version::numeric_prefix(c, 0) != major || version::numeric_prefix(c, 1) != minor {
                    return false;
                }
                if let Some(min_patch) = min_patch {
                    if version::numeric_prefix(c, 2) < min_patch {
                        return false;
                    }
                }
                true
            })
            .map(String::from)
        },
        VersionConstraint::Conjunction(clauses) => newest_matching(versions, |c| {
            clauses.iter().all(|(op, bound)| satisfies_clause(c, op, bound))
        })
        .map(String::from),
        VersionConstraint::Range(lo, hi) => newest_matching(versions, |c| {
            version::compare(c, lo) != Ordering::Less && version::compare(c, hi) != Ordering::Greater
        })
        .map(String::from),
        VersionConstraint::Pattern(pattern) => {
            let pat_parts: Vec<&str> = pattern.split('.').collect();
            newest_matching(versions, |c| {
                let c_parts: Vec<&str> = c.split('.').collect();
                if c_parts.len() < pat_parts.len() {
                    return false;
                }
                pat_parts
                    .iter()
                    .zip(c_parts.iter())
                    .all(|(p, c)| p.eq_ignore_ascii_case("x") || p == c)
            })
            .map(String::from)
        },
    }
}

/// Resolve the full transitive closure of `specs` against `catalog`,
/// deduplicating by domain (newer resolved version wins) and recording a
/// warning (rather than aborting) for every package that can't be
/// resolved.
pub fn resolve_closure(
    specs: &[PackageSpec],
    catalog: &dyn Catalog,
) -> (Vec<ResolvedPackage>, Vec<ResolverWarning>) {
    let mut worklist: Vec<PackageSpec> = specs.to_vec();
    let mut emitted: HashSet<(String, String)> = HashSet::new();
    let mut warnings = Vec::new();
    let mut resolved: Vec<ResolvedPackage> = Vec::new();

    while let Some(spec) = worklist.pop() {
        let domain = catalog.resolve_alias(&spec.name);
        let versions = catalog.versions(&domain);
        let constraint = VersionConstraint::parse(spec.constraint.as_deref());
        let Some(version) = resolve(&constraint, &versions) else {
            warnings.push(ResolverWarning {
                name: spec.name.clone(),
                reason: format!(
                    "no version of {domain} satisfies {:?}",
                    spec.constraint.unwrap_or_else(|| "latest".to_string())
                ),
            });
            continue;
        };

        let key = (domain.clone(), version.clone());
        if !emitted.insert(key) {
            continue;
        }

        resolved.push(ResolvedPackage {
            domain: domain.clone(),
            version: version.clone(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            dependencies: Vec::new(),
            is_global: false,
        });

        if let Some(info) = catalog.info(&domain) {
            for dep in info.dependencies {
                worklist.push(PackageSpec::new(dep, None));
            }
        }
    }

    (dedupe_by_domain(resolved), warnings)
}

/// After closure, keep only the newest resolved version per domain.
fn dedupe_by_domain(mut packages: Vec<ResolvedPackage>) -> Vec<ResolvedPackage> {
    packages.sort_by(|a, b| a.domain.cmp(&b.domain).then(version::compare(&a.version, &b.version)));
    let mut out: Vec<ResolvedPackage> = Vec::with_capacity(packages.len());
    for pkg in packages {
        if let Some(last) = out.last_mut() {
            if last.domain == pkg.domain {
                if version::compare(&pkg.version, &last.version) == Ordering::Greater {
                    *last = pkg;
                }
                continue;
            }
        }
        out.push(pkg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FixtureCatalog;

    fn versions(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn none_latest_or_star_returns_newest() {
        let vs = versions(&["3.1.0", "3.0.0"]);
        for c in [None, Some("latest"), Some("*")] {
            assert_eq!(
                resolve(&VersionConstraint::parse(c), &vs),
                Some("3.1.0".to_string())
            );
        }
    }

    #[test]
    fn caret_resolves_newest_in_major() {
        let vs = versions(&["77.1.0", "74.2.0", "73.2.0", "71.1.0"]);
        let constraint = VersionConstraint::parse(Some("^73"));
        assert_eq!(resolve(&constraint, &vs), Some("73.2.0".to_string()));
    }

    #[test]
    fn caret_never_crosses_major_or_minor_floor() {
        let vs = versions(&["2.0.0", "1.5.0", "1.4.0"]);
        let constraint = VersionConstraint::parse(Some("^1.5"));
        let resolved = resolve(&constraint, &vs).unwrap();
        assert!(version::numeric_prefix(&resolved, 0) == 1);
        assert!(version::numeric_prefix(&resolved, 1) >= 5);
    }

    #[test]
    fn caret_matches_nonsemver_suffixed_versions() {
        let vs = versions(&["3.5.0", "1.1.1w", "1.1.1u"]);
        let constraint = VersionConstraint::parse(Some("^1.1"));
        let resolved = resolve(&constraint, &vs).unwrap();
        assert!(resolved.starts_with("1.1."));
    }

    #[test]
    fn tilde_pins_major_and_minor() {
        let vs = versions(&["1.3.0", "1.2.9", "1.2.5"]);
        let constraint = VersionConstraint::parse(Some("~1.2.5"));
        assert_eq!(resolve(&constraint, &vs), Some("1.2.9".to_string()));
    }

    #[test]
    fn gte_none_above_bound_is_none() {
        let vs = versions(&["2.0.0", "1.0.0"]);
        let constraint = VersionConstraint::parse(Some(">999.0.0"));
        assert_eq!(resolve(&constraint, &vs), None);
    }

    #[test]
    fn conjunction_applies_both_bounds() {
        let vs = versions(&["1.1.50", "1.1.43", "1.1.20", "1.1.0"]);
        let constraint = VersionConstraint::parse(Some(">=1.1.0<1.1.43"));
        assert_eq!(resolve(&constraint, &vs), Some("1.1.20".to_string()));
    }

    #[test]
    fn resolved_version_is_always_a_catalog_member() {
        let vs = versions(&["1.1.50", "1.1.43", "1.1.20", "1.1.0"]);
        for raw in ["^1", "~1.1", ">=1.1.0", "1.1.x", "1.1.0 - 1.1.43", "latest"] {
            let constraint = VersionConstraint::parse(Some(raw));
            if let Some(v) = resolve(&constraint, &vs) {
                assert!(vs.contains(&v));
            }
        }
    }

    #[test]
    fn pattern_matches_x_components() {
        let vs = versions(&["1.2.9", "1.1.9", "1.1.5"]);
        let constraint = VersionConstraint::parse(Some("1.1.x"));
        assert_eq!(resolve(&constraint, &vs), Some("1.1.9".to_string()));
    }

    #[test]
    fn closure_dedupes_by_domain_keeping_newest() {
        let catalog = FixtureCatalog::new()
            .with_package("app.example", ["1.0.0"], ["lib.example"])
            .with_package("lib.example", ["2.0.0", "1.0.0"], Vec::<String>::new());
        let specs = vec![
            PackageSpec::new("app.example", None),
            PackageSpec::new("lib.example", Some("^1".to_string())),
        ];
        let (resolved, warnings) = resolve_closure(&specs, &catalog);
        assert!(warnings.is_empty());
        let lib = resolved.iter().find(|p| p.domain == "lib.example").unwrap();
        assert_eq!(lib.version, "1.0.0");
    }

    #[test]
    fn unresolvable_package_warns_and_continues() {
        let catalog = FixtureCatalog::new().with_package("ok.example", ["1.0.0"], Vec::<String>::new());
        let specs = vec![
            PackageSpec::new("ok.example", None),
            PackageSpec::new("missing.example", None),
        ];
        let (resolved, warnings) = resolve_closure(&specs, &catalog);
        assert_eq!(resolved.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].name, "missing.example");
    }

    #[test]
    fn cycle_does_not_infinite_loop() {
        let catalog = FixtureCatalog::new()
            .with_package("a.example", ["1.0.0"], ["b.example"])
            .with_package("b.example", ["1.0.0"], ["a.example"]);
        let specs = vec![PackageSpec::new("a.example", None)];
        let (resolved, warnings) = resolve_closure(&specs, &catalog);
        assert_eq!(resolved.len(), 2);
        assert!(warnings.is_empty());
    }
}
