//! `update`/`upgrade`/`up <names>...` (spec §6): re-resolve and reinstall
//! named packages against the latest catalog versions.

use anyhow::Result;
use launchpad_core::resolve::resolve_closure;
use launchpad_core::PackageSpec;
use launchpad_install::cache::Cache;
use launchpad_install::extract::TarGzExtractor;
use launchpad_install::installer::{Installer, PackageOutcome};
use tracing::{info, warn};

use crate::cli::UpdateArgs;
use crate::config::Config;

pub async fn run(config: &Config, args: UpdateArgs) -> Result<()> {
    let catalog = crate::catalog::load(&crate::catalog::default_catalog_path(&config.data_dir));

    let specs: Vec<PackageSpec> = args
        .names
        .iter()
        .map(|name| PackageSpec {
            name: name.clone(),
            constraint: if args.latest { None } else { Some("latest".to_string()) },
        })
        .collect();

    let (resolved, warnings) = resolve_closure(&specs, &catalog);
    for warning in &warnings {
        warn!(name = %warning.name, reason = %warning.reason, "dependency could not be resolved");
    }

    if args.dry_run {
        for package in &resolved {
            println!("would update {} to {}", package.domain, package.version);
        }
        return Ok(());
    }

    let cache = Cache::new(&config.cache_dir);
    let installer = Installer::new(cache, TarGzExtractor, "https://dist.launchpad.dev");
    let report = installer
        .install_all(&resolved, &config.prefix, |domain, progress| {
            info!(domain, ?progress, "fetch progress");
        })
        .await;

    for outcome in report.outcomes {
        match outcome {
            PackageOutcome::Installed(metadata) => println!("updated {} to {}", metadata.domain, metadata.version),
            PackageOutcome::Skipped { domain, version } => println!("{domain}@{version} already up to date this run"),
            PackageOutcome::Failed { domain, reason, .. } => eprintln!("failed to update {domain}: {reason}"),
        }
    }
    Ok(())
}
