//! `self-upgrade` (spec §4.12, §6).

use anyhow::Result;
use launchpad_upgrade::{network_error_hint, plan_upgrade, UpgradeOptions, UpgradePlan};

use crate::cli::SelfUpgradeArgs;

const RELEASE_ENDPOINT: &str = "https://api.github.com/repos/launchpad-dev/launchpad/releases/latest";
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run(args: SelfUpgradeArgs) -> Result<()> {
    let options = UpgradeOptions {
        force: args.force,
        verbose: args.verbose,
        target: args.target,
        release: args.release,
        dry_run: args.dry_run,
    };

    let client = reqwest::Client::new();
    let plan = match plan_upgrade(&client, RELEASE_ENDPOINT, CURRENT_VERSION, &options).await {
        Ok(plan) => plan,
        Err(_) => {
            println!("{}", network_error_hint("latest"));
            return Ok(());
        },
    };

    match plan {
        UpgradePlan::UpToDate { current } => println!("already up to date (v{current})"),
        UpgradePlan::Install { from, to, command } => {
            if options.dry_run {
                println!("would run: {}", command.join(" "));
            } else {
                println!("upgrading from v{from} to {to}");
                println!("run: {}", command.join(" "));
            }
        },
    }
    Ok(())
}
