//! Logger setup for the demo binary

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialize the global logger
///
/// `RUST_LOG` wins when set. Otherwise `filter` is used if given, falling
/// back to debug when `verbose` and info when not.
pub fn init(verbose: bool, filter: Option<&str>) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let default = filter.map_or_else(|| level.to_string(), str::to_owned);

    let env = Env::default().default_filter_or(default);
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();

    // Already initialized in tests
    let _ = builder.try_init();
}
