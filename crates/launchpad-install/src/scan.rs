//! Environment path scanning (spec §4.10): deriving `PATH`/`LD_LIBRARY_PATH`
//! entries and readiness checks from what's actually on disk, rather than
//! trusting the manifest's idea of what should be installed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Direct children of a package's install directory that never contain
/// libraries worth adding to the search path.
const NON_LIBRARY_DIRS: &[&str] = &[
    "bin", "sbin", "lib", "lib64", "share", "include", "etc", "pkgs", ".tmp", ".cache",
];

/// A file counts as "library-sized" once past this threshold; anything
/// smaller is assumed to be a stub or symlink placeholder, not worth adding
/// a whole directory to the search path for.
const MIN_LIBRARY_BYTES: u64 = 100;

const LIBRARY_EXTENSIONS: &[&str] = &["so", "dylib", "a"];

fn looks_like_library(name: &str) -> bool {
    // accepts unversioned (`libfoo.so`) and versioned (`libfoo.so.1.2.3`)
    // names alike: any dotted component after the stem matching a known
    // extension counts.
    name.split('.').skip(1).any(|part| LIBRARY_EXTENSIONS.contains(&part))
}

fn dir_has_library_file(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !looks_like_library(&name) {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            if meta.len() > MIN_LIBRARY_BYTES {
                return true;
            }
        }
    }
    false
}

/// Walk every installed package's directory tree for directories that
/// contain at least one library-sized file, returning de-duplicated,
/// first-occurrence-ordered paths.
pub fn scan_library_paths(env_root: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    let Ok(domains) = std::fs::read_dir(env_root) else {
        return paths;
    };
    for domain_entry in domains.flatten() {
        let domain_path = domain_entry.path();
        if !domain_path.is_dir() {
            continue;
        }
        let Ok(versions) = std::fs::read_dir(&domain_path) else {
            continue;
        };
        for version_entry in versions.flatten() {
            let version_path = version_entry.path();
            if !version_path.is_dir() {
                continue;
            }

            // php keeps extension libraries alongside its interpreter
            // rather than under lib/, so bin/ is always included when a
            // php install is present, regardless of file size.
            let bin_dir = version_path.join("bin");
            if bin_dir.join("php").is_file() && seen.insert(bin_dir.clone()) {
                paths.push(bin_dir);
            }

            for lib_name in ["lib", "lib64"] {
                let lib_dir = version_path.join(lib_name);
                if lib_dir.is_dir() && dir_has_library_file(&lib_dir) && seen.insert(lib_dir.clone()) {
                    paths.push(lib_dir);
                }
            }

            // nested package-local lib dirs (e.g. a bundled dependency
            // vendored under share/<tool>/lib) are included too, as long as
            // they aren't one of the well-known non-package direct children.
            let Ok(children) = std::fs::read_dir(&version_path) else {
                continue;
            };
            for child in children.flatten() {
                let name = child.file_name();
                let name = name.to_string_lossy();
                if NON_LIBRARY_DIRS.contains(&name.as_ref()) {
                    continue;
                }
                let nested_lib = child.path().join("lib");
                if nested_lib.is_dir() && dir_has_library_file(&nested_lib) && seen.insert(nested_lib.clone()) {
                    paths.push(nested_lib);
                }
            }
        }
    }
    paths
}

/// Walk the global install root, keeping only the lexicographically-greatest
/// `v...` directory per package domain (global installs don't coexist by
/// version the way project-local ones do).
pub fn scan_global_paths(global_root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let Ok(domains) = std::fs::read_dir(global_root) else {
        return paths;
    };
    for domain_entry in domains.flatten() {
        let domain_path = domain_entry.path();
        if !domain_path.is_dir() {
            continue;
        }
        let Ok(versions) = std::fs::read_dir(&domain_path) else {
            continue;
        };
        let mut version_dirs: Vec<PathBuf> = versions.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect();
        version_dirs.sort();
        if let Some(newest) = version_dirs.pop() {
            paths.push(newest);
        }
    }
    paths
}

/// Cheap readiness probe used before activation to decide whether a fast
/// path (skip re-resolving/installing) is available.
pub fn check_environment_ready(env_root: &Path) -> (bool, bool, bool) {
    let bin_exists = env_root.join("bin").is_dir();
    let has_libraries = !scan_library_paths(env_root).is_empty();
    let ready = bin_exists || has_libraries;
    (ready, bin_exists, has_libraries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_dir(path: &Path) {
        std::fs::create_dir_all(path).unwrap();
    }

    fn write_fake_library(dir: &Path, name: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), vec![0u8; 200]).unwrap();
    }

    #[test]
    fn finds_lib_dirs_for_each_installed_version() {
        let dir = tempfile::tempdir().unwrap();
        write_fake_library(&dir.path().join("nodejs.org/v20.0.0/lib"), "libnode.so");
        write_fake_library(&dir.path().join("openssl.org/v3.0.0/lib64"), "libssl.so.3");

        let mut paths = scan_library_paths(dir.path());
        paths.sort();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn skips_non_library_direct_children() {
        let dir = tempfile::tempdir().unwrap();
        touch_dir(&dir.path().join("nodejs.org/v20.0.0/bin"));
        write_fake_library(&dir.path().join("nodejs.org/v20.0.0/share/lib"), "libextra.so");

        let paths = scan_library_paths(dir.path());
        assert!(paths.is_empty());
    }

    #[test]
    fn lib_dir_with_only_tiny_files_is_not_included() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("nodejs.org/v20.0.0/lib");
        std::fs::create_dir_all(&lib).unwrap();
        std::fs::write(lib.join("libnode.so"), b"x").unwrap();

        assert!(scan_library_paths(dir.path()).is_empty());
    }

    #[test]
    fn php_bin_dir_is_included_when_php_present() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("php.net/v8.3.0/bin");
        touch_dir(&bin);
        std::fs::write(bin.join("php"), b"").unwrap();

        let paths = scan_library_paths(dir.path());
        assert_eq!(paths, vec![bin]);
    }

    #[test]
    fn global_scan_keeps_only_newest_version() {
        let dir = tempfile::tempdir().unwrap();
        touch_dir(&dir.path().join("nodejs.org/v18.0.0"));
        touch_dir(&dir.path().join("nodejs.org/v20.0.0"));

        let paths = scan_global_paths(dir.path());
        assert_eq!(paths, vec![dir.path().join("nodejs.org/v20.0.0")]);
    }

    #[test]
    fn readiness_is_false_for_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(check_environment_ready(dir.path()), (false, false, false));
    }
}
