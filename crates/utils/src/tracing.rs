//! Tracing setup and the structured events stamp emits.
//!
//! The library crates never render progress themselves: they emit the
//! events below and leave presentation to whichever subscriber the host
//! application installs.

use ::tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a stderr fmt subscriber filtered by `RUST_LOG` (default `info`)
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Progress of a remote source checkout, e.g. `fetching` or `already up to date`
pub fn source_event(name: &str, url: &str, status: &str) {
    info!(
        source = %name,
        url = %url,
        status = %status,
        "remote_source"
    );
}

/// A remote source operation failed and the checkout was left as it was
pub fn source_failed(name: &str, url: &str, error: &dyn std::fmt::Display) {
    warn!(
        source = %name,
        url = %url,
        error = %error,
        "remote_source_failed"
    );
}

/// A tree version was computed
pub fn version_resolved(root: &str, files: usize, version: &str, elapsed_ms: u64) {
    debug!(
        root = %root,
        files = %files,
        version = %version,
        elapsed_ms = %elapsed_ms,
        "version_resolved"
    );
}

/// Result cache lookup outcome for a task scope
pub fn cache_event(scope: &str, version: &str, hit: bool) {
    if hit {
        debug!(scope = %scope, version = %version, "cache_hit");
    } else {
        debug!(scope = %scope, version = %version, "cache_miss");
    }
}
