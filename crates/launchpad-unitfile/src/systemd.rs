//! systemd unit file rendering (spec §4.11).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error while formatting unit file: {0}")]
    Fmt(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, Default)]
pub struct Unit {
    pub description: Option<String>,
    pub after: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy)]
pub enum ServiceType {
    Simple,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::Simple => write!(f, "simple"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Service {
    pub type_: Option<ServiceType>,
    pub exec_start: Option<String>,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Install {
    pub wanted_by: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceUnit {
    pub unit: Unit,
    pub service: Service,
    pub install: Install,
}

/// Render a systemd service unit as INI text. Every service unit launchpad
/// generates carries `Type=simple` and a `multi-user.target` install
/// target, per the spec; callers only vary description, exec line, and
/// environment.
pub fn render(unit: &ServiceUnit) -> Result<String, Error> {
    let mut out = String::new();

    writeln!(out, "[Unit]")?;
    if let Some(description) = &unit.unit.description {
        writeln!(out, "Description={description}")?;
    }
    if let Some(after) = &unit.unit.after {
        writeln!(out, "After={}", after.join(" "))?;
    }
    writeln!(out)?;

    writeln!(out, "[Service]")?;
    if let Some(type_) = unit.service.type_ {
        writeln!(out, "Type={type_}")?;
    }
    if let Some(exec_start) = &unit.service.exec_start {
        writeln!(out, "ExecStart={exec_start}")?;
    }
    for (key, value) in &unit.service.environment {
        writeln!(out, "Environment={key}={value}")?;
    }
    writeln!(out)?;

    writeln!(out, "[Install]")?;
    if let Some(wanted_by) = &unit.install.wanted_by {
        writeln!(out, "WantedBy={wanted_by}")?;
    }

    Ok(out)
}
