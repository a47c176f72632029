//! Dotted version ordering, shared by the resolver and any user-facing sort.
//!
//! Centralized here rather than scattered across call sites, per the
//! version-ordering design note: components compare by numeric prefix
//! first, then by their trailing non-numeric suffix.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Component {
    num: u64,
    suffix: String,
}

fn split_component(raw: &str) -> Component {
    let digit_len = raw.chars().take_while(|c| c.is_ascii_digit()).count();
    let num = raw[..digit_len].parse().unwrap_or(0);
    let suffix = raw[digit_len..].to_string();
    Component { num, suffix }
}

fn components(version: &str) -> Vec<Component> {
    version.split('.').map(split_component).collect()
}

/// Compare two dotted version strings. Unparseable components compare as
/// zero; a missing trailing component compares as if it were `0`.
pub fn compare(a: &str, b: &str) -> Ordering {
    let ca = components(a);
    let cb = components(b);
    let len = ca.len().max(cb.len());
    let zero = Component {
        num: 0,
        suffix: String::new(),
    };
    for i in 0..len {
        let x = ca.get(i).unwrap_or(&zero);
        let y = cb.get(i).unwrap_or(&zero);
        match x.num.cmp(&y.num) {
            Ordering::Equal => match x.suffix.cmp(&y.suffix) {
                Ordering::Equal => continue,
                other => return other,
            },
            other => return other,
        }
    }
    Ordering::Equal
}

pub fn max<'a>(versions: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    versions
        .into_iter()
        .max_by(|a, b| compare(a, b))
}

/// The leading numeric-prefix components of a version, e.g. `(1, Some(1),
/// Some(1))` for `"1.1.1w"`. Used by caret/tilde matching which only cares
/// about the numeric major/minor/patch, not trailing suffixes.
pub fn numeric_prefix(version: &str, index: usize) -> u64 {
    components(version)
        .get(index)
        .map(|c| c.num)
        .unwrap_or(0)
}
