//! The `pl0c` driver: CLI parsing, logging setup, and pipeline
//! orchestration wiring `pl0c-lex` -> `pl0c-par` -> `pl0c-gen` together
//! (spec.md §6).

pub mod cli;
pub mod config;
pub mod error;
pub mod session;

pub use cli::Cli;
pub use config::Config;
pub use error::DriverError;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the global `tracing` subscriber, following the teacher's
/// verbose-vs-quiet filter split.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false).with_thread_names(false);

    // A second call within the same process (as in tests that construct
    // multiple `Cli`s) would panic on a bare `init`; `try_init` makes
    // re-initialization a no-op instead.
    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}
