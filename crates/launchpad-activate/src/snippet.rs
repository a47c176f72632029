//! Shell activation snippet and directory-change integration preamble
//! (spec §4.9).

use launchpad_shell::{export, guarded_by_version_var, prepend_path, unset};

const LIBRARY_PATH_VARS: &[&str] = &["DYLD_LIBRARY_PATH", "DYLD_FALLBACK_LIBRARY_PATH", "LD_LIBRARY_PATH"];

/// Recognized manifest filenames (mirrors `launchpad_manifest::RECOGNIZED_FILENAMES`)
/// plus well-known project markers, walked by `__launchpad_find_deps_file`
/// when deciding whether a directory is a launchpad project root.
pub const PROJECT_MARKERS: &[&str] = &[
    "deps.yaml",
    "deps.yml",
    "dependencies.yaml",
    "dependencies.yml",
    "pkgx.yaml",
    "pkgx.yml",
    "launchpad.yaml",
    "launchpad.yml",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
    "Gemfile",
    "package.json",
];

/// Render the activation snippet emitted on stdout by the `dev` command.
pub fn render_activation_snippet(project_root: &str, env_bin_path: &str, bin_dir: &str, lib_dirs: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&export("LAUNCHPAD_ENV_BIN_PATH", env_bin_path));
    out.push('\n');
    out.push_str(&export("LAUNCHPAD_CURRENT_PROJECT", project_root));
    out.push('\n');

    // idempotent: only capture the original PATH the first time this
    // snippet is sourced for a given shell.
    out.push_str("if [ -z \"${LAUNCHPAD_ORIGINAL_PATH:-}\" ]; then\n");
    out.push_str("\texport LAUNCHPAD_ORIGINAL_PATH=\"$PATH\"\n");
    for var in LIBRARY_PATH_VARS {
        out.push_str(&format!("\texport LAUNCHPAD_ORIGINAL_{var}=\"${{{var}:-}}\"\n"));
    }
    out.push_str("fi\n\n");

    let mut search_dirs = vec![bin_dir.to_string()];
    search_dirs.extend(lib_dirs.iter().cloned());
    out.push_str(&prepend_path("PATH", &[bin_dir.to_string()]));
    out.push('\n');
    if !lib_dirs.is_empty() {
        for var in LIBRARY_PATH_VARS {
            out.push_str(&prepend_path(var, lib_dirs));
            out.push('\n');
        }
    }
    out.push('\n');

    out.push_str("_launchpad_dev_try_bye() {\n");
    out.push_str(&format!("\tcase \"$PWD\" in\n\t\t{project_root}*) return ;;\n\tesac\n"));
    out.push_str("\texport PATH=\"$LAUNCHPAD_ORIGINAL_PATH\"\n");
    for var in LIBRARY_PATH_VARS {
        out.push_str(&format!("\texport {var}=\"$LAUNCHPAD_ORIGINAL_{var}\"\n"));
    }
    out.push_str(&format!("\t{}\n", unset("LAUNCHPAD_ORIGINAL_PATH")));
    for var in LIBRARY_PATH_VARS {
        out.push_str(&format!("\t{}\n", unset(&format!("LAUNCHPAD_ORIGINAL_{var}"))));
    }
    out.push_str("}\n");

    out
}

/// Render the shell integration preamble (the `dev:shellcode` subcommand):
/// a `chpwd`-style hook that finds and activates/deactivates a project on
/// directory change, guarded so zsh- and bash-specific hook registration
/// never run in the wrong shell.
pub fn render_integration_preamble() -> String {
    let markers = PROJECT_MARKERS.iter().map(|m| format!("\"{m}\"")).collect::<Vec<_>>().join(" ");

    let mut out = String::new();
    out.push_str("__launchpad_find_deps_file() {\n");
    out.push_str("\tdir=\"$PWD\"\n");
    out.push_str("\twhile [ \"$dir\" != \"/\" ]; do\n");
    out.push_str(&format!("\t\tfor marker in {markers}; do\n"));
    out.push_str("\t\t\tif [ -f \"$dir/$marker\" ]; then echo \"$dir\"; return 0; fi\n");
    out.push_str("\t\tdone\n");
    out.push_str("\t\tdir=$(dirname \"$dir\")\n");
    out.push_str("\tdone\n");
    out.push_str("\treturn 1\n");
    out.push_str("}\n\n");

    out.push_str("__launchpad_chpwd() {\n");
    out.push_str("\tif command -v _launchpad_dev_try_bye >/dev/null 2>&1; then _launchpad_dev_try_bye; fi\n");
    out.push_str("\tproject_dir=$(__launchpad_find_deps_file) || return 0\n");
    out.push_str("\teval \"$(launchpad dev --shell)\"\n");
    out.push_str("}\n\n");

    out.push_str(&guarded_by_version_var(
        "ZSH_VERSION",
        "\tautoload -U add-zsh-hook\n\tadd-zsh-hook chpwd __launchpad_chpwd",
    ));
    out.push('\n');
    out.push_str(&guarded_by_version_var(
        "BASH_VERSION",
        "\tPROMPT_COMMAND=\"__launchpad_chpwd; ${PROMPT_COMMAND:-}\"",
    ));
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_snippet_exports_env_bin_path_and_project() {
        let snippet = render_activation_snippet("/home/me/proj", "/envs/x/bin", "/envs/x/bin", &["/envs/x/lib".to_string()]);
        assert!(snippet.contains("export LAUNCHPAD_ENV_BIN_PATH=/envs/x/bin"));
        assert!(snippet.contains("export LAUNCHPAD_CURRENT_PROJECT=/home/me/proj"));
        assert!(snippet.contains("_launchpad_dev_try_bye"));
    }

    #[test]
    fn activation_snippet_is_idempotent_about_original_path() {
        let snippet = render_activation_snippet("/p", "/envs/x/bin", "/envs/x/bin", &[]);
        assert!(snippet.contains("if [ -z \"${LAUNCHPAD_ORIGINAL_PATH:-}\" ]; then"));
    }

    #[test]
    fn integration_preamble_walks_recognized_markers() {
        let preamble = render_integration_preamble();
        assert!(preamble.contains("Cargo.toml"));
        assert!(preamble.contains("launchpad.yaml"));
        assert!(preamble.contains("__launchpad_chpwd"));
        assert!(preamble.contains("ZSH_VERSION"));
        assert!(preamble.contains("BASH_VERSION"));
    }
}
