//! Converts a [`ServiceDefinition`] into its platform-native service file
//! (spec §4.11 "Service-file generation"): a launchd plist on darwin, a
//! systemd unit everywhere else. `{dataDir}`, `{configFile}`, and the
//! definition's own declared environment keys are substituted into the
//! argument list via [`TemplateContext`] before handing the result to the
//! platform-native writer in `launchpad_unitfile`.

use launchpad_unitfile::launchd::{self, LaunchdPlist};
use launchpad_unitfile::systemd::{self, Install, Service as SystemdService, ServiceType, ServiceUnit, Unit};
use launchpad_unitfile::TemplateContext;
use thiserror::Error;

use crate::registry::ServiceDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Darwin,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Systemd(#[from] systemd::Error),
    #[error(transparent)]
    Launchd(#[from] launchd::Error),
}

/// Render `definition`'s service file for `platform`.
pub fn render(
    definition: &ServiceDefinition,
    data_dir: &str,
    config_file: &str,
    platform: Platform,
) -> Result<String, RenderError> {
    let mut ctx = TemplateContext::new().set("dataDir", data_dir).set("configFile", config_file);
    if let Some(port) = definition.port {
        ctx = ctx.set("port", port.to_string());
    }
    for (key, value) in &definition.env {
        ctx = ctx.set(key.clone(), value.clone());
    }

    let args: Vec<String> = definition.args.iter().map(|arg| ctx.render(arg)).collect();

    match platform {
        Platform::Darwin => {
            let mut program_arguments = vec![definition.executable.to_string()];
            program_arguments.extend(args);
            let plist = LaunchdPlist {
                label: format!("dev.launchpad.{}", definition.name),
                program_arguments,
                run_at_load: true,
                keep_alive: true,
                environment_variables: definition.env.clone(),
            };
            Ok(launchd::render(&plist)?)
        },
        Platform::Linux => {
            let exec_start =
                std::iter::once(definition.executable.to_string()).chain(args).collect::<Vec<_>>().join(" ");
            let unit = ServiceUnit {
                unit: Unit {
                    description: Some(format!("launchpad-managed {}", definition.display_name)),
                    after: Some(vec!["network.target".to_string()]),
                },
                service: SystemdService {
                    type_: Some(ServiceType::Simple),
                    exec_start: Some(exec_start),
                    environment: definition.env.clone(),
                },
                install: Install {
                    wanted_by: Some("multi-user.target".to_string()),
                },
            };
            Ok(systemd::render(&unit)?)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_port_into_redis_args() {
        let def = crate::registry::find("redis").unwrap();
        let rendered = render(&def, "/var/lib/launchpad/redis", "", Platform::Linux).unwrap();
        assert!(rendered.contains("ExecStart=redis-server --port 6379"));
    }

    #[test]
    fn substitutes_data_dir_into_postgres_args() {
        let def = crate::registry::find("postgresql").unwrap();
        let rendered = render(&def, "/var/lib/launchpad/postgresql", "", Platform::Linux).unwrap();
        assert!(rendered.contains("ExecStart=postgres -D /var/lib/launchpad/postgresql"));
    }

    #[test]
    fn darwin_plist_includes_program_arguments_and_config_file() {
        let def = crate::registry::find("nginx").unwrap();
        let rendered = render(&def, "", "/etc/launchpad/nginx.conf", Platform::Darwin).unwrap();
        assert!(rendered.contains("<string>nginx</string>"));
        assert!(rendered.contains("<string>/etc/launchpad/nginx.conf</string>"));
    }

    #[test]
    fn missing_variable_renders_as_empty_segment() {
        let def = ServiceDefinition {
            name: "custom",
            display_name: "Custom",
            package_domain: "example.com",
            executable: "customd",
            args: vec!["--config".to_string(), "{configFile}".to_string()],
            env: Default::default(),
            dependencies: vec![],
            supports_graceful_shutdown: false,
            port: None,
            health_check: None,
        };
        let rendered = render(&def, "", "", Platform::Linux).unwrap();
        assert!(rendered.contains("ExecStart=customd --config "));
    }
}
