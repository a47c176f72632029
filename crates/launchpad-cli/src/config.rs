//! Runtime configuration: environment variables read, directories derived
//! (spec §6 "Environment variables read/written").

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub prefix: PathBuf,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
    pub verbose: bool,
    pub shell_integration: bool,
    pub test_mode: bool,
    pub ci: bool,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| v != "0" && !v.is_empty()).unwrap_or(false)
}

impl Config {
    pub fn from_env() -> Self {
        let xdg = xdg::BaseDirectories::with_prefix("launchpad");

        let prefix = std::env::var("LAUNCHPAD_PREFIX").map(PathBuf::from).unwrap_or_else(|_| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("launchpad")
                .join("envs")
        });

        let cache_dir = xdg
            .get_cache_home()
            .unwrap_or_else(|| std::env::temp_dir().join("launchpad-cache"));
        let data_dir = xdg
            .get_data_home()
            .unwrap_or_else(|| std::env::temp_dir().join("launchpad-data"));

        Self {
            prefix,
            cache_dir,
            data_dir,
            verbose: env_flag("LAUNCHPAD_VERBOSE"),
            shell_integration: env_flag("LAUNCHPAD_SHELL_INTEGRATION") && !env_flag("LAUNCHPAD_DISABLE_SHELL_INTEGRATION"),
            test_mode: env_flag("LAUNCHPAD_TEST_MODE"),
            ci: env_flag("CI"),
        }
    }
}
