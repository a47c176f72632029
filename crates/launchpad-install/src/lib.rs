//! Binary archive caching, retrieval, extraction, and installation
//! (spec §4.5–§4.7, §4.10).

pub mod cache;
pub mod extract;
pub mod fetch;
pub mod installer;
pub mod scan;

pub use cache::Cache;
pub use extract::{ExtractError, Extractor, TarGzExtractor};
pub use fetch::{fetch, FetchError, Progress};
pub use installer::{reset_installed_tracker, InstallError, InstallReport, Installer, PackageOutcome};
pub use scan::{check_environment_ready, scan_global_paths, scan_library_paths};
