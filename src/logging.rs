//! Browser console logging through the `log` facade.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the console backend once; later calls only adjust the max level.
pub fn init(level: log::Level) {
    INIT.call_once(|| {
        // Another logger may already be registered by the embedding page.
        let _ = console_log::init_with_level(level);
    });
    log::set_max_level(level.to_level_filter());
}
