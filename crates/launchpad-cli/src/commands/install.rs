//! `install <spec>...` (spec §6): direct install to a prefix, bypassing the
//! manifest.

use anyhow::Result;
use launchpad_core::resolve::resolve_closure;
use launchpad_core::PackageSpec;
use launchpad_install::cache::Cache;
use launchpad_install::extract::TarGzExtractor;
use launchpad_install::installer::{Installer, PackageOutcome};
use tracing::{info, warn};

use crate::cli::InstallArgs;
use crate::config::Config;

pub async fn run(config: &Config, args: InstallArgs) -> Result<()> {
    let catalog = crate::catalog::load(&crate::catalog::default_catalog_path(&config.data_dir));

    let specs: Vec<PackageSpec> = args
        .specs
        .iter()
        .map(|raw| launchpad_core::parse_spec(raw))
        .collect::<Result<_, _>>()?;

    let (resolved, warnings) = resolve_closure(&specs, &catalog);
    for warning in &warnings {
        warn!(name = %warning.name, reason = %warning.reason, "dependency could not be resolved");
    }

    let cache = Cache::new(&config.cache_dir);
    let installer = Installer::new(cache, TarGzExtractor, "https://dist.launchpad.dev");

    let report = installer
        .install_all(&resolved, &config.prefix, |domain, progress| {
            info!(domain, ?progress, "fetch progress");
        })
        .await;

    let mut any_failed = false;
    for outcome in report.outcomes {
        match outcome {
            PackageOutcome::Installed(metadata) => println!("installed {}@{}", metadata.domain, metadata.version),
            PackageOutcome::Skipped { domain, version } => println!("{domain}@{version} already installed this run"),
            PackageOutcome::Failed { domain, version, reason, hint } => {
                any_failed = true;
                eprintln!("failed to install {domain}@{version}: {reason}");
                if let Some(hint) = hint {
                    eprintln!("  hint: {hint}");
                }
            },
        }
    }

    if any_failed && !report.any_succeeded() {
        anyhow::bail!("no packages could be installed");
    }
    Ok(())
}
