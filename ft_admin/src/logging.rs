//! Structured logging for the operator CLI.
//!
//! Library crates log through the `log` facade; the subscriber installed
//! here also picks those records up.

use funtan::ReasonCode;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info,sqlx=warn`. Output
/// goes to stderr so `--json` output on stdout stays machine-readable.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Log one dispatched engine operation
///
/// # Arguments
///
/// * `operation` - Command name
/// * `player_id` - Player the command acted on, if any
/// * `reason` - Failure reason, `None` on success
/// * `elapsed` - Time spent in the engine
pub fn log_operation(
    operation: &str,
    player_id: Option<&str>,
    reason: Option<ReasonCode>,
    elapsed: Duration,
) {
    let duration_ms = elapsed.as_millis() as u64;
    match reason {
        None => tracing::info!(
            operation = operation,
            player_id = player_id,
            duration_ms = duration_ms,
            "Operation completed"
        ),
        Some(reason) if reason.is_informational() => tracing::info!(
            operation = operation,
            player_id = player_id,
            reason = reason.as_str(),
            duration_ms = duration_ms,
            "Operation not ready"
        ),
        Some(reason) => tracing::warn!(
            operation = operation,
            player_id = player_id,
            reason = reason.as_str(),
            duration_ms = duration_ms,
            "Operation failed"
        ),
    }

    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Slow operation"
        );
    }
}
