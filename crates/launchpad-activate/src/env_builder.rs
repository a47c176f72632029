//! Materializing an `Environment` into a `bin` directory of shims plus an
//! activation snippet (spec §4.9).

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use is_executable::IsExecutable;
use launchpad_core::model::Environment;
use launchpad_install::scan::{check_environment_ready, scan_library_paths};

use crate::shims::render_shim;
use crate::snippet::render_activation_snippet;

/// Populate `env.bin_dir` with one shim per executable found across every
/// installed package's `bin`/`sbin`, then return the activation snippet
/// ready to print to stdout.
pub fn build(env: &Environment, project_root: &str) -> io::Result<String> {
    std::fs::create_dir_all(&env.bin_dir)?;

    let lib_dirs: Vec<String> = scan_library_paths(&env.root)
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let bin_dir_str = env.bin_dir.to_string_lossy().into_owned();

    for installed in env.packages.values() {
        for subdir in ["bin", "sbin"] {
            let source_dir = installed.install_path.join(subdir);
            let Ok(entries) = std::fs::read_dir(&source_dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() || !path.is_executable() {
                    continue;
                }
                let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                    continue;
                };
                write_shim(&env.bin_dir.join(&name), &path.to_string_lossy(), &bin_dir_str, &lib_dirs)?;
            }
        }
    }

    Ok(render_activation_snippet(project_root, &bin_dir_str, &bin_dir_str, &lib_dirs))
}

fn write_shim(shim_path: &Path, real_binary: &str, bin_dir: &str, lib_dirs: &[String]) -> io::Result<()> {
    let script = render_shim(real_binary, bin_dir, lib_dirs);
    std::fs::write(shim_path, script)?;
    let mut perms = std::fs::metadata(shim_path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(shim_path, perms)?;
    Ok(())
}

/// Fast-path check: if the environment already looks populated, the caller
/// can skip resolution/installation and just re-emit the activation
/// snippet for the existing layout.
pub fn fast_path_available(env_root: &Path) -> bool {
    check_environment_ready(env_root).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_is_unavailable_for_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!fast_path_available(dir.path()));
    }

    #[test]
    fn fast_path_is_available_once_bin_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        assert!(fast_path_available(dir.path()));
    }
}
