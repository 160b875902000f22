use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Default filters: the loader and front end report at `info`, while the
/// store backends, whose logging is per operation, stay at `warn` unless
/// `RUST_LOG` asks for more.
fn default_builder() -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("bidstore", LevelFilter::Info)
        .filter_module("bidstore::tree", LevelFilter::Warn)
        .filter_module("bidstore::hash", LevelFilter::Warn)
        .format_timestamp_millis();
    builder
}

/// Install the process-wide logger. Safe to call more than once.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = default_builder();
        builder.parse_default_env();

        // Another logger may already be installed, e.g. by a test harness.
        let _ = builder.try_init();
    });
}
