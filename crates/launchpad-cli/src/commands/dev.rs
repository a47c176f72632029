//! `dev` / `dev:shellcode` (spec §6).

use std::path::Path;

use anyhow::{Context, Result};
use launchpad_activate::{fast_path_available, render_integration_preamble};
use launchpad_core::env_hash;
use launchpad_core::model::Environment;
use launchpad_install::cache::Cache;
use launchpad_install::extract::TarGzExtractor;
use launchpad_install::installer::{Installer, PackageOutcome};
use launchpad_core::resolve::resolve_closure;
use tracing::{info, warn};

use crate::cli::DevArgs;
use crate::config::Config;

const MIRROR_BASE_URL_VAR: &str = "LAUNCHPAD_MIRROR_BASE_URL";
const DEFAULT_MIRROR_BASE_URL: &str = "https://dist.launchpad.dev";

fn mirror_base_url() -> String {
    std::env::var(MIRROR_BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_MIRROR_BASE_URL.to_string())
}

pub async fn run(config: &Config, args: DevArgs) -> Result<()> {
    let project_root = std::env::current_dir().context("determining project directory")?;
    let env_id = env_hash::id(&project_root);
    let env_root = config.prefix.join(&env_id);

    if fast_path_available(&env_root) && !args.dry_run {
        info!(env_root = %env_root.display(), "environment already populated, skipping install");
        print_activation(&env_root, &project_root)?;
        return Ok(());
    }

    let Some(manifest_path) = launchpad_manifest::find_manifest(&project_root) else {
        warn!("no dependency manifest found in this project");
        return Ok(());
    };
    let Some(manifest) = launchpad_manifest::load_or_warn(&manifest_path) else {
        return Ok(());
    };

    let catalog = crate::catalog::load(&crate::catalog::default_catalog_path(&config.data_dir));
    let package_specs: Vec<launchpad_core::PackageSpec> = manifest
        .dependencies
        .iter()
        .map(|dep| launchpad_core::PackageSpec {
            name: dep.domain.clone(),
            constraint: dep.constraint.clone(),
        })
        .collect();

    let (resolved, warnings) = resolve_closure(&package_specs, &catalog);
    for warning in &warnings {
        warn!(name = %warning.name, reason = %warning.reason, "dependency could not be resolved");
    }

    if args.dry_run {
        for package in &resolved {
            println!("would install {}@{}", package.domain, package.version);
        }
        return Ok(());
    }

    let cache = Cache::new(&config.cache_dir);
    let installer = Installer::new(cache, TarGzExtractor, mirror_base_url());

    let report = installer
        .install_all(&resolved, &env_root, |domain, progress| {
            info!(domain, ?progress, "fetch progress");
        })
        .await;

    let mut env = Environment::new(env_id, env_root.clone());
    for outcome in &report.outcomes {
        if let PackageOutcome::Installed(metadata) = outcome {
            env.packages.insert(metadata.domain.clone(), metadata.clone());
        }
    }
    for outcome in &report.outcomes {
        if let PackageOutcome::Failed { domain, reason, hint, .. } = outcome {
            warn!(domain, reason, hint = hint.as_deref().unwrap_or(""), "package install failed");
        }
    }

    if !report.any_succeeded() && !resolved.is_empty() {
        anyhow::bail!("no packages could be installed");
    }

    let snippet = launchpad_activate::build(&env, &project_root.to_string_lossy())?;
    print!("{snippet}");
    Ok(())
}

fn print_activation(env_root: &Path, project_root: &Path) -> Result<()> {
    let env = Environment::new(
        env_root.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
        env_root.to_path_buf(),
    );
    let snippet = launchpad_activate::build(&env, &project_root.to_string_lossy())?;
    print!("{snippet}");
    Ok(())
}

pub fn shellcode() {
    print!("{}", render_integration_preamble());
}
