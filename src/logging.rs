/// Logger setup: `env_logger` behind the `log` facade.
///
/// The game owns the terminal's alternate screen, so records never go to
/// stderr by default. With `[log] file` set they are appended to that file at
/// the configured level; without it logging stays off unless `RUST_LOG` asks
/// for it (useful with `2> twenty48.log`).

use std::fs::OpenOptions;
use std::io;

use env_logger::{Builder, Env, Target};

use crate::config::LogConfig;

pub fn init(cfg: &LogConfig) -> io::Result<()> {
    let mut builder = match &cfg.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let mut b = Builder::from_env(Env::default().default_filter_or(cfg.level.to_string()));
            b.target(Target::Pipe(Box::new(file)));
            b
        }
        None => Builder::from_env(Env::default().default_filter_or("off")),
    };
    builder
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
