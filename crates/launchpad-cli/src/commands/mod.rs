pub mod clean;
pub mod dev;
pub mod install;
pub mod services;
pub mod self_upgrade;
pub mod update;
