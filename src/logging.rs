//! tracing subscriber setup.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr and, if a
/// directory is configured, also to a daily rolling file there. Keep the
/// returned guard alive until exit so buffered file output gets flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(&config.level))
    .map_err(|e| eyre!("Invalid log level {:?}: {}", config.level, e))?;

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false);

  match &config.directory {
    Some(dir) => {
      std::fs::create_dir_all(dir)
        .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
      let appender = tracing_appender::rolling::daily(dir, "noi-feed.log");
      let (file, guard) = tracing_appender::non_blocking(appender);
      builder
        .with_ansi(false)
        .with_writer(std::io::stderr.and(file))
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {}", e))?;
      Ok(Some(guard))
    }
    None => {
      builder
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {}", e))?;
      Ok(None)
    }
  }
}
