//! `services <action> <name>` (spec §6, §4.11).

use anyhow::Result;
use launchpad_services::ServiceSupervisor;

use crate::cli::{ServiceAction, ServicesArgs};

pub async fn run(supervisor: &ServiceSupervisor, args: ServicesArgs) -> Result<()> {
    if matches!(args.action, ServiceAction::List) {
        for name in supervisor.list() {
            println!("{name}");
        }
        return Ok(());
    }

    let Some(name) = args.name else {
        anyhow::bail!("service name is required for this action");
    };

    let ok = match args.action {
        ServiceAction::Start => supervisor.start(&name).await,
        ServiceAction::Stop => supervisor.stop(&name).await,
        ServiceAction::Restart => supervisor.restart(&name).await,
        ServiceAction::Enable => supervisor.enable(&name).await,
        ServiceAction::Disable => supervisor.disable(&name).await,
        ServiceAction::Status => {
            match supervisor.status(&name).await {
                Some(service) => {
                    println!("{name}: {:?}", service.status);
                    if let Some(service_file) = &service.service_file {
                        println!("{service_file}");
                    }
                    true
                },
                None => false,
            }
        },
        ServiceAction::List => unreachable!(),
    };

    if !ok {
        anyhow::bail!("unknown service '{name}'");
    }
    Ok(())
}
