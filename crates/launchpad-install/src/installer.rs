//! Per-package install orchestration (spec §4.7).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use is_executable::IsExecutable;
use launchpad_core::model::{InstalledPackage, ResolvedPackage};
use once_cell::sync::Lazy;
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::Cache;
use crate::extract::{ExtractError, Extractor};

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to fetch {domain}@{version}: {source}")]
    Fetch {
        domain: String,
        version: String,
        #[source]
        source: crate::fetch::FetchError,
    },

    #[error("failed to extract {domain}@{version}: {source}")]
    Extract {
        domain: String,
        version: String,
        #[source]
        source: ExtractError,
    },

    #[error("failed to write metadata for {domain}@{version}: {source}")]
    Metadata {
        domain: String,
        version: String,
        #[source]
        source: std::io::Error,
    },
}

/// A human-readable suggestion attached to a per-package failure, e.g. an
/// alias hint when a misspelled or legacy domain name is used.
fn failure_hint(domain: &str) -> Option<String> {
    match domain {
        "wget.com" => Some("did you mean 'gnu.org/wget'?".to_string()),
        _ => None,
    }
}

/// One package's outcome within a batch install.
#[derive(Debug)]
pub enum PackageOutcome {
    Installed(InstalledPackage),
    Skipped { domain: String, version: String },
    Failed { domain: String, version: String, reason: String, hint: Option<String> },
}

#[derive(Debug, Default)]
pub struct InstallReport {
    pub outcomes: Vec<PackageOutcome>,
}

impl InstallReport {
    /// "at least one package was installed" — the installer's default
    /// notion of overall success, unless the caller asked for strict mode.
    pub fn any_succeeded(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o, PackageOutcome::Installed(_) | PackageOutcome::Skipped { .. }))
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| !matches!(o, PackageOutcome::Failed { .. }))
    }
}

/// Tracks `{domain}@{version}` pairs installed so far in this process, so
/// a batch never re-installs the same pair twice. Per-process, not
/// persisted; tests call `reset_installed_tracker` to start clean.
static INSTALLED: Lazy<Mutex<HashSet<(String, String)>>> = Lazy::new(|| Mutex::new(HashSet::new()));

pub fn reset_installed_tracker() {
    INSTALLED.lock().unwrap().clear();
}

fn mark_installed(domain: &str, version: &str) -> bool {
    INSTALLED
        .lock()
        .unwrap()
        .insert((domain.to_string(), version.to_string()))
}

/// Domains that get a family of major/minor version-compatibility tags
/// pointing back at the real `v{version}` directory, so consumers that
/// hard-code an older major line keep resolving.
const VERSION_COMPAT_DOMAINS: &[&str] = &["openssl.org"];

pub struct Installer<E: Extractor> {
    cache: Cache,
    extractor: E,
    client: reqwest::Client,
    mirror_base_url: String,
}

impl<E: Extractor> Installer<E> {
    pub fn new(cache: Cache, extractor: E, mirror_base_url: impl Into<String>) -> Self {
        Self {
            cache,
            extractor,
            client: reqwest::Client::new(),
            mirror_base_url: mirror_base_url.into(),
        }
    }

    fn archive_url(&self, domain: &str, version: &str) -> String {
        format!(
            "{}/packages/{domain}/{version}/package.{}",
            self.mirror_base_url.trim_end_matches('/'),
            crate::cache::ARCHIVE_EXT
        )
    }

    /// Install every package in `resolved`, stopping at no point — a
    /// per-package failure is recorded and the batch continues. Returns an
    /// empty-outcome report with nothing left to do for packages already
    /// present in this process's install tracker.
    pub async fn install_all(
        &self,
        resolved: &[ResolvedPackage],
        env_root: &Path,
        mut on_progress: impl FnMut(&str, crate::fetch::Progress),
    ) -> InstallReport {
        let mut report = InstallReport::default();
        for pkg in resolved {
            let outcome = self
                .install_one(pkg, env_root, |p| on_progress(&pkg.domain, p))
                .await;
            report.outcomes.push(outcome);
        }
        report
    }

    async fn install_one(
        &self,
        pkg: &ResolvedPackage,
        env_root: &Path,
        on_progress: impl FnMut(crate::fetch::Progress),
    ) -> PackageOutcome {
        if !mark_installed(&pkg.domain, &pkg.version) {
            return PackageOutcome::Skipped {
                domain: pkg.domain.clone(),
                version: pkg.version.clone(),
            };
        }

        match self.do_install(pkg, env_root, on_progress).await {
            Ok(metadata) => PackageOutcome::Installed(metadata),
            Err(err) => {
                warn!(domain = %pkg.domain, version = %pkg.version, %err, "package install failed");
                PackageOutcome::Failed {
                    domain: pkg.domain.clone(),
                    version: pkg.version.clone(),
                    reason: err.to_string(),
                    hint: failure_hint(&pkg.domain),
                }
            },
        }
    }

    async fn do_install(
        &self,
        pkg: &ResolvedPackage,
        env_root: &Path,
        mut on_progress: impl FnMut(crate::fetch::Progress),
    ) -> Result<InstalledPackage, InstallError> {
        let archive_path = match self.cache.lookup(&pkg.domain, &pkg.version) {
            Some(path) => path,
            None => {
                let staging = self
                    .cache
                    .staging_path(&pkg.domain, &pkg.version)
                    .map_err(|source| InstallError::Metadata {
                        domain: pkg.domain.clone(),
                        version: pkg.version.clone(),
                        source,
                    })?;
                let url = self.archive_url(&pkg.domain, &pkg.version);
                crate::fetch::fetch(&self.client, &url, &staging, &mut on_progress)
                    .await
                    .map_err(|source| InstallError::Fetch {
                        domain: pkg.domain.clone(),
                        version: pkg.version.clone(),
                        source,
                    })?;
                let final_path = self.cache.archive_path(&pkg.domain, &pkg.version);
                std::fs::rename(&staging, &final_path).map_err(|source| InstallError::Metadata {
                    domain: pkg.domain.clone(),
                    version: pkg.version.clone(),
                    source,
                })?;
                final_path
            },
        };

        let install_path = env_root.join(&pkg.domain).join(format!("v{}", pkg.version));
        std::fs::create_dir_all(&install_path).map_err(|source| InstallError::Metadata {
            domain: pkg.domain.clone(),
            version: pkg.version.clone(),
            source,
        })?;

        if let Err(source) = self.extractor.extract(&archive_path, &install_path) {
            // extraction failure means the cached archive was corrupt; evict it
            // so the next attempt re-downloads instead of retrying the same
            // bad bytes.
            let _ = self.cache.evict(&pkg.domain, &pkg.version);
            return Err(InstallError::Extract {
                domain: pkg.domain.clone(),
                version: pkg.version.clone(),
                source,
            });
        }

        let binaries = discover_binaries(&install_path);
        apply_compat_symlinks(&install_path, &pkg.domain, &pkg.version);

        let metadata = InstalledPackage {
            domain: pkg.domain.clone(),
            version: pkg.version.clone(),
            installed_at: now_iso8601(),
            binaries,
            install_path: install_path.clone(),
        };
        write_metadata(env_root, &metadata).map_err(|source| InstallError::Metadata {
            domain: pkg.domain.clone(),
            version: pkg.version.clone(),
            source,
        })?;

        Ok(metadata)
    }
}

fn now_iso8601() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

/// Entries of `bin`/`sbin` that are executable after extraction.
fn discover_binaries(install_path: &Path) -> Vec<String> {
    let mut binaries = Vec::new();
    for subdir in ["bin", "sbin"] {
        let dir = install_path.join(subdir);
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && path.is_executable() {
                if let Some(name) = path.file_name() {
                    binaries.push(name.to_string_lossy().into_owned());
                }
            }
        }
    }
    binaries
}

/// Atomically write `envRoot/pkgs/{domain}/v{version}/metadata.json`: write
/// to a `.tmp` path then rename, so a reader never observes a half-written
/// file.
fn write_metadata(env_root: &Path, metadata: &InstalledPackage) -> std::io::Result<()> {
    let dir = env_root
        .join("pkgs")
        .join(&metadata.domain)
        .join(format!("v{}", metadata.version));
    std::fs::create_dir_all(&dir)?;
    let final_path = dir.join("metadata.json");
    let tmp_path = dir.join("metadata.json.tmp");
    let contents = serde_json::to_vec_pretty(metadata)?;
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

fn symlink(src: &Path, dest: &Path) {
    if dest.exists() {
        return;
    }
    #[cfg(unix)]
    let _ = std::os::unix::fs::symlink(src, dest);
    #[cfg(windows)]
    let _ = std::os::windows::fs::symlink_file(src, dest);
}

/// Library-compatibility symlinks and version-family tags (spec §4.7
/// step 4): consumers that hard-code an unversioned or major-line library
/// name keep resolving after we install a more specific version.
fn apply_compat_symlinks(install_path: &Path, domain: &str, version: &str) {
    let lib_dir = install_path.join("lib");
    if lib_dir.is_dir() {
        if let Ok(entries) = std::fs::read_dir(&lib_dir) {
            for entry in entries.flatten() {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if let Some(target) = compat_link_name(&name) {
                    symlink(Path::new(&*name), &lib_dir.join(target));
                }
            }
        }
    }

    if VERSION_COMPAT_DOMAINS.contains(&domain) {
        let parts: Vec<&str> = version.split('.').collect();
        let parent = install_path.parent().unwrap_or(install_path);
        let real = format!("v{version}");
        for depth in 1..=parts.len().min(2) {
            let tag = format!("v{}", parts[..depth].join("."));
            if tag != real {
                symlink(Path::new(&real), &parent.join(tag));
            }
        }
    }
}

/// `None` if `name` doesn't match one of the known compatibility patterns;
/// otherwise the unversioned/major-versioned filename it should also be
/// reachable as.
fn compat_link_name(name: &str) -> Option<String> {
    if let Some(rest) = name.strip_prefix("libncursesw") {
        return Some(format!("libncurses{rest}"));
    }
    if name.starts_with("libpcre2-8.") || name.starts_with("libpcre2-16.") || name.starts_with("libpcre2-32.")
    {
        let base = name.split('.').next().unwrap();
        let ext = name.rsplit('.').next().unwrap();
        return Some(format!("{base}.{ext}"));
    }
    if name.starts_with("libpng16.") {
        let ext = name.rsplit('.').next().unwrap();
        return Some(format!("libpng.{ext}"));
    }
    None
}
