//! Maps a project path to a stable environment id (spec §4.8).
//!
//! Grounded on the teacher's `CanonicalPath` newtype: canonicalization is
//! cheap enough that we do it once at the boundary rather than scattering
//! `fs::canonicalize` calls through the codebase.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Deref, derive_more::AsRef)]
#[deref(forward)]
#[as_ref(forward)]
pub struct CanonicalPath(PathBuf);

#[derive(Debug, Error)]
#[error("couldn't canonicalize path {path:?}: {err}")]
pub struct CanonicalizeError {
    pub path: PathBuf,
    #[source]
    pub err: std::io::Error,
}

impl CanonicalPath {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CanonicalizeError> {
        let canonicalized = std::fs::canonicalize(&path).map_err(|err| CanonicalizeError {
            path: path.as_ref().to_path_buf(),
            err,
        })?;
        Ok(Self(canonicalized))
    }

    /// For paths known not to exist (e.g. a project directory that hasn't
    /// been created yet): used as-is, without touching the filesystem.
    pub fn new_unchecked(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_path_buf())
    }

    pub fn into_inner(self) -> PathBuf {
        self.0
    }
}

/// `{basename}_{hash8}` where `hash8` is the first 8 hex characters of the
/// MD5 digest of the canonical path's UTF-8 bytes. Two distinct canonical
/// paths producing the same id would require an MD5 collision restricted
/// to its first 32 bits — acceptable for this domain, and empirically
/// unique across nested and similarly-named project directories.
pub fn id(project_path: &Path) -> String {
    let canonical = CanonicalPath::new(project_path)
        .map(CanonicalPath::into_inner)
        .unwrap_or_else(|_| project_path.to_path_buf());

    let basename = canonical
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "env".to_string());

    let digest = Md5::digest(canonical.to_string_lossy().as_bytes());
    let hash8: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();

    format!("{basename}_{hash8}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_is_a_valid_path_component() {
        let generated = id(Path::new("/tmp/does/not/exist/my-project"));
        assert!(!generated.contains('/'));
        assert!(!generated.contains('+'));
        assert!(!generated.contains('='));
    }

    #[test]
    fn id_is_stable_across_invocations() {
        let path = Path::new("/tmp/stable-project");
        assert_eq!(id(path), id(path));
    }

    #[test]
    fn similarly_named_paths_produce_distinct_ids() {
        let mut seen = HashSet::new();
        for name in ["project", "project-1", "project_1", "Project"] {
            let generated = id(Path::new(&format!("/tmp/{name}")));
            assert!(seen.insert(generated), "collision for {name}");
        }
    }

    #[test]
    fn nested_paths_produce_distinct_ids() {
        let mut seen = HashSet::new();
        for i in 0..200 {
            let generated = id(Path::new(&format!("/tmp/fixtures/level/{i}/project")));
            assert!(seen.insert(generated), "collision at index {i}");
        }
    }

    proptest::proptest! {
        /// Two distinct (non-canonicalizable, so `new_unchecked`-equivalent)
        /// paths under a common basename should not collide. Distinctness
        /// of the input is ensured by embedding the generated suffix in the
        /// path itself.
        #[test]
        fn distinct_unchecked_paths_do_not_collide(suffix_a in "[a-z]{4,12}", suffix_b in "[a-z]{4,12}") {
            proptest::prop_assume!(suffix_a != suffix_b);
            let a = id(Path::new(&format!("/tmp/fuzz-{suffix_a}/project")));
            let b = id(Path::new(&format!("/tmp/fuzz-{suffix_b}/project")));
            assert_ne!(a, b);
        }
    }
}
