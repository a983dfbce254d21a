use std::sync::atomic::AtomicBool;

use tracing::Level;

static IS_INIT: AtomicBool = AtomicBool::new(false);

/// Install the global subscriber once. `RUST_LOG` still applies on top of the
/// per-crate targets, so `RUST_LOG=debug` shows every rewrite decision.
pub fn init(verbose: bool) {
  use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};
  if !IS_INIT.swap(true, std::sync::atomic::Ordering::SeqCst) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
      .with(fmt::layer().with_writer(std::io::stderr))
      .with(EnvFilter::from_default_env().add_directive(LevelFilter::from_level(level).into()))
      .with(tracing_subscriber::filter::Targets::new().with_targets(vec![
        ("codemods", Level::TRACE),
        ("codemods_swc_visitors", Level::TRACE),
        ("codemods_cli", Level::TRACE),
      ]))
      .init();
  }
}
