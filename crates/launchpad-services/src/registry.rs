//! Static service definitions (spec §4.2 "ServiceRegistry" row, §3 `Service`).

use std::collections::BTreeMap;
use std::time::Duration;

use once_cell::sync::Lazy;

#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub command: Vec<String>,
    pub expected_exit_code: i32,
    pub timeout: Duration,
    pub interval: Duration,
    pub retries: u32,
}

#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub package_domain: &'static str,
    pub executable: &'static str,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub dependencies: Vec<&'static str>,
    pub supports_graceful_shutdown: bool,
    /// `0` means "no fixed port"; the spec constrains real ports to
    /// `(0, 65536)`, i.e. any nonzero `u16`.
    pub port: Option<u16>,
    pub health_check: Option<HealthCheck>,
}

/// The fixed catalog of services launchpad knows how to supervise. Real
/// deployments would likely load additional definitions from the catalog's
/// `companions` field; this registry covers the common long-running
/// services a dev environment typically supervises. Built once and cloned
/// out of `REGISTRY` on each call rather than reconstructed from scratch.
static REGISTRY: Lazy<Vec<ServiceDefinition>> = Lazy::new(|| {
    vec![
        ServiceDefinition {
            name: "redis",
            display_name: "Redis",
            package_domain: "redis.io",
            executable: "redis-server",
            args: vec!["--port".to_string(), "{port}".to_string()],
            env: BTreeMap::new(),
            dependencies: vec![],
            supports_graceful_shutdown: true,
            port: Some(6379),
            health_check: Some(HealthCheck {
                command: vec!["redis-cli".to_string(), "ping".to_string()],
                expected_exit_code: 0,
                timeout: Duration::from_secs(5),
                interval: Duration::from_secs(2),
                retries: 3,
            }),
        },
        ServiceDefinition {
            name: "postgresql",
            display_name: "PostgreSQL",
            package_domain: "postgresql.org",
            executable: "postgres",
            args: vec!["-D".to_string(), "{dataDir}".to_string()],
            env: BTreeMap::new(),
            dependencies: vec![],
            supports_graceful_shutdown: true,
            port: Some(5432),
            health_check: Some(HealthCheck {
                command: vec!["pg_isready".to_string()],
                expected_exit_code: 0,
                timeout: Duration::from_secs(5),
                interval: Duration::from_secs(2),
                retries: 5,
            }),
        },
        ServiceDefinition {
            name: "nginx",
            display_name: "nginx",
            package_domain: "nginx.org",
            executable: "nginx",
            args: vec!["-c".to_string(), "{configFile}".to_string()],
            env: BTreeMap::new(),
            dependencies: vec![],
            supports_graceful_shutdown: true,
            port: Some(8080),
            health_check: None,
        },
    ]
});

pub fn definitions() -> Vec<ServiceDefinition> {
    REGISTRY.clone()
}

pub fn find(name: &str) -> Option<ServiceDefinition> {
    REGISTRY.iter().find(|def| def.name == name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_definition_has_a_unique_name() {
        let defs = definitions();
        let mut names: Vec<&str> = defs.iter().map(|d| d.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), defs.len());
    }

    #[test]
    fn ports_are_in_range() {
        for def in definitions() {
            if let Some(port) = def.port {
                assert!(port > 0);
            }
        }
    }

    #[test]
    fn find_is_case_sensitive_and_exact() {
        assert!(find("redis").is_some());
        assert!(find("Redis").is_none());
        assert!(find("made-up").is_none());
    }
}
