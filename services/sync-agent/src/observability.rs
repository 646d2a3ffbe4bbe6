//! Tracing Subscriber Setup
//!
//! Structured logging with env-filter control and optional JSON output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// Honors `RUST_LOG` when set and defaults to `info` otherwise. JSON output
/// is meant for log shippers; the text form is for terminals.
pub fn init(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}
