//! Logger initialization. Simplified relative to a reload-handle-based
//! setup: launchpad's verbosity is fixed for the lifetime of one CLI
//! invocation, so there's no need to re-filter an already-running
//! subscriber.

use tracing_subscriber::EnvFilter;

pub fn init_logger(verbose: bool) {
    let default_filter = if verbose { "launchpad=debug" } else { "launchpad=info" };
    let filter = EnvFilter::try_from_env("LAUNCHPAD_LOG").unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
