//! Per-binary shim scripts (spec §4.9): a thin wrapper that scopes
//! `PATH`/library-path variables to the real binary's invocation and
//! restores the caller's originals on exit, regardless of how the binary
//! itself exits.

use launchpad_shell::{export, quote};

const LIBRARY_PATH_VARS: &[&str] = &["LD_LIBRARY_PATH", "DYLD_LIBRARY_PATH", "DYLD_FALLBACK_LIBRARY_PATH"];

/// Render the shim script placed at `envRoot/bin/{name}`, execing
/// `real_binary` with `bin_dir` and `lib_dirs` prepended to the path
/// variables for the duration of the call only.
pub fn render_shim(real_binary: &str, bin_dir: &str, lib_dirs: &[String]) -> String {
    let mut script = String::new();
    script.push_str("#!/bin/sh\n");
    script.push_str("# generated by launchpad — do not edit\n\n");

    script.push_str("_ORIG_PATH=\"${PATH:-}\"\n");
    for var in LIBRARY_PATH_VARS {
        script.push_str(&format!("_ORIG_{var}=\"${{{var}:-}}\"\n"));
    }
    script.push('\n');

    script.push_str("_launchpad_restore() {\n");
    script.push_str(&format!("\t{}\n", export("PATH", "$_ORIG_PATH")));
    for var in LIBRARY_PATH_VARS {
        script.push_str(&format!("\texport {var}=\"$_ORIG_{var}\"\n"));
    }
    script.push_str("}\n");
    script.push_str("trap _launchpad_restore EXIT\n\n");

    script.push_str(&format!("export PATH=\"{bin_dir}:$PATH\"\n"));
    if !lib_dirs.is_empty() {
        let joined = lib_dirs.join(":");
        for var in LIBRARY_PATH_VARS {
            script.push_str(&format!("export {var}=\"{joined}:${{{var}:-}}\"\n"));
        }
    }
    script.push('\n');

    script.push_str(&format!("exec {} \"$@\"\n", quote(real_binary)));
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shim_exports_bin_dir_and_execs_real_binary() {
        let script = render_shim("/envs/x/node.js/v20.0.0/bin/node", "/envs/x/bin", &["/envs/x/node.js/v20.0.0/lib".to_string()]);
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("export PATH=\"/envs/x/bin:$PATH\"\n"));
        assert!(script.contains("trap _launchpad_restore EXIT"));
        assert!(script.contains("exec /envs/x/node.js/v20.0.0/bin/node \"$@\"\n"));
    }

    #[test]
    fn shim_without_library_dirs_skips_library_exports() {
        let script = render_shim("/envs/x/bin/tool", "/envs/x/bin", &[]);
        assert!(!script.contains("export LD_LIBRARY_PATH=\""));
    }
}
