use std::process::ExitCode;

use anyhow::Result;
use bpaf::Parser;
use launchpad_services::ServiceSupervisor;

mod catalog;
mod cli;
mod commands;
mod config;
mod logging;

use cli::{launchpad_args, LaunchpadArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let config = config::Config::from_env();
    logging::init_logger(config.verbose);

    let args = launchpad_args().run();

    match run(&config, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(config: &config::Config, args: LaunchpadArgs) -> Result<()> {
    match args {
        LaunchpadArgs::Dev(dev_args) => commands::dev::run(config, dev_args).await,
        LaunchpadArgs::DevShellcode => {
            commands::dev::shellcode();
            Ok(())
        },
        LaunchpadArgs::Install(install_args) => commands::install::run(config, install_args).await,
        LaunchpadArgs::Update(update_args) => commands::update::run(config, update_args).await,
        LaunchpadArgs::SelfUpgrade(self_upgrade_args) => commands::self_upgrade::run(self_upgrade_args).await,
        LaunchpadArgs::Clean(clean_args) => commands::clean::run(config, clean_args).await,
        LaunchpadArgs::Services(services_args) => {
            let supervisor = ServiceSupervisor::new();
            commands::services::run(&supervisor, services_args).await
        },
    }
}
