//! Logging via `tracing`, mapped from the CLI verbosity flags.
//!
//! `-v` raises our crate to debug, `-vv` to trace; `-q` drops to warn.
//! `RUST_LOG` overrides everything when set.

use tracing_subscriber::EnvFilter;

pub fn init(verbosity: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,docdeck={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
