//! Shell-string primitives shared by the activation snippet generator and
//! the service command wrapper. Kept POSIX where possible, with zsh/bash
//! specifics behind variable guards at the call site rather than here.

use std::borrow::Cow;

/// Quote `value` for safe inclusion in a POSIX shell single-quoted string.
pub fn quote(value: &str) -> Cow<'_, str> {
    shell_escape::escape(Cow::Borrowed(value))
}

/// `export NAME='value'`
pub fn export(name: &str, value: &str) -> String {
    format!("export {name}={}", quote(value))
}

/// `NAME='value'` without exporting — used for variables the script only
/// reads internally.
pub fn set_local(name: &str, value: &str) -> String {
    format!("{name}={}", quote(value))
}

/// `unset NAME`
pub fn unset(name: &str) -> String {
    format!("unset {name}")
}

/// Prepend `dirs` (in order) to the `:`-joined value of `var`, guarding
/// against an unset original value.
pub fn prepend_path(var: &str, dirs: &[String]) -> String {
    if dirs.is_empty() {
        return String::new();
    }
    let joined = dirs.join(":");
    format!(r#"export {var}="{joined}:${{{var}:-}}""#)
}

/// Wrap a guard so the enclosed lines only run under the named shell
/// (`ZSH_VERSION` / `BASH_VERSION`), matching the way the teacher's
/// generated `chpwd` hooks branch on shell-specific variables.
pub fn guarded_by_version_var(var: &str, body: &str) -> String {
    format!("if [ -n \"${{{var}:-}}\" ]; then\n{body}\nfi")
}
