//! Service registry and lifecycle supervisor (spec §4.11).

pub mod registry;
pub mod servicefile;
pub mod supervisor;

pub use registry::{definitions, find, HealthCheck, ServiceDefinition};
pub use servicefile::{Platform, RenderError};
pub use supervisor::{Action, OperationRecord, Service, ServiceStatus, ServiceSupervisor};
