//! `clean` (spec §6): remove installed package trees, optionally keeping
//! packages declared in a global (`~/.dotfiles`) manifest.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cli::CleanArgs;
use crate::config::Config;

/// Packages declared `global: true` anywhere visible to this invocation —
/// these survive a `--keep-global` clean even though they live in the same
/// environment root as everything else.
fn globally_declared_domains(project_root: &Path) -> HashSet<String> {
    let Some(manifest_path) = launchpad_manifest::find_manifest(project_root) else {
        return HashSet::new();
    };
    let Some(manifest) = launchpad_manifest::load_or_warn(&manifest_path) else {
        return HashSet::new();
    };
    manifest
        .dependencies
        .into_iter()
        .filter(|dep| dep.global)
        .map(|dep| dep.domain)
        .collect()
}

pub async fn run(config: &Config, args: CleanArgs) -> Result<()> {
    let project_root = std::env::current_dir()?;
    let keep = if args.keep_global {
        globally_declared_domains(&project_root)
    } else {
        HashSet::new()
    };

    let Ok(entries) = std::fs::read_dir(&config.prefix) else {
        info!("no environments installed under {}", config.prefix.display());
        return Ok(());
    };

    for entry in entries.flatten() {
        let env_root = entry.path();
        if !env_root.is_dir() {
            continue;
        }

        let Ok(domains) = std::fs::read_dir(env_root.join("pkgs")) else {
            continue;
        };
        for domain_entry in domains.flatten() {
            let Some(domain) = domain_entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if keep.contains(&domain) {
                if args.verbose {
                    println!("keeping {domain} (declared global)");
                }
                continue;
            }

            let package_dir = env_root.join(&domain);
            if args.dry_run {
                println!("would remove {}", package_dir.display());
                continue;
            }
            if args.force || package_dir.exists() {
                let _ = std::fs::remove_dir_all(&package_dir);
                let _ = std::fs::remove_dir_all(domain_entry.path());
                if args.verbose {
                    println!("removed {domain}");
                }
            }
        }
    }

    Ok(())
}
