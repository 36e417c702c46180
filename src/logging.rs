use anyhow::Context;
use std::{fs::File, io, path::PathBuf, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// The environment variable holding the log filter, e.g. `PAGEFX_LOG=pagefx=debug`.
pub const LOG_ENV: &str = "PAGEFX_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Where log lines go.
#[derive(Clone, Debug, PartialEq)]
pub enum LogTarget {
    /// Write to stderr. Never use this while drawing on the terminal.
    Stderr,

    /// Write to a file, truncating it first.
    File(PathBuf),

    /// Don't log at all.
    Disabled,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global log subscriber.
pub fn init(target: LogTarget) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter()).with_target(false);
    let result = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = File::create(&path).with_context(|| format!("creating log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        LogTarget::Disabled => return Ok(()),
    };
    result.map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}
