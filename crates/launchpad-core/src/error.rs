use thiserror::Error;

/// Errors produced while parsing specifiers and resolving the dependency graph.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid package specifier: {0:?}")]
    InvalidSpec(String),

    #[error("unknown package domain: {0}")]
    UnknownPackage(String),

    #[error("no version of {domain} satisfies {constraint:?}")]
    UnsatisfiableConstraint { domain: String, constraint: String },
}

/// A recoverable warning raised while resolving one package in a larger
/// closure. Resolution continues after a warning is recorded; it never
/// aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverWarning {
    pub name: String,
    pub reason: String,
}

impl std::fmt::Display for ResolverWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}
