/// Logger setup.
///
/// The terminal belongs to the renderer while the game runs, so log lines
/// go to a file. `RUST_LOG` overrides the level from `config.toml`.

use std::fs::OpenOptions;

use env_logger::{Builder, Target};

use crate::config::LogConfig;

/// Install the global logger. Failure to open the file is reported and the
/// game keeps running without logs.
pub fn init(cfg: &LogConfig) {
    let file = match OpenOptions::new().create(true).append(true).open(&cfg.file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", cfg.file.display());
            return;
        }
    };

    let result = Builder::new()
        .filter_level(cfg.level)
        .parse_default_env()
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .try_init();

    if let Err(e) = result {
        eprintln!("Warning: logger already initialised: {e}");
    }
}
