//! Diagnostic logging on stderr.
//!
//! Quiet by default (`warn`); `--debug` raises the level to `debug`.
//! `RUST_LOG` takes precedence over both:
//! ```bash
//! RUST_LOG=logq=trace logq 'source logs | limit 5'
//! ```

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Install the subscriber. Only the first call takes effect.
pub fn init(debug: bool) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if debug {
            EnvFilter::new("warn,logq=debug")
        } else {
            EnvFilter::new("warn")
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}
