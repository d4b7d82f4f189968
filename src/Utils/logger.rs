//! Terminal logger initialization for binaries, examples and tests consuming
//! the library. The library itself only emits through the `log` facade.

use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

/// Initializes a terminal logger at the given level. Safe to call more than
/// once; later calls are ignored.
pub fn init_logging(level: LevelFilter) {
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
}
