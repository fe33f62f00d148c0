//! Logging bootstrap and the operation observer used by the service facade.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use lectern_kernel::settings::{LogFormat, TelemetrySettings};
use tracing::Instrument;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(
            target: "lectern-telemetry",
            format = ?settings.log_format,
            filter = %settings.log_filter,
            "telemetry initialized"
        );
    }
}

/// Run a facade operation inside its own span, logging before and after.
///
/// Successful operations log at `info`, failures at `warn` with the error's
/// display form. The result is passed through untouched.
pub async fn observe<T, E, F>(operation: &'static str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let span = tracing::info_span!("operation", name = operation);

    async move {
        let started = Instant::now();
        tracing::debug!(operation, "operation started");

        let result = fut.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(operation, elapsed_ms, outcome = "ok", "operation finished"),
            Err(err) => tracing::warn!(
                operation,
                elapsed_ms,
                outcome = "error",
                error = %err,
                "operation failed"
            ),
        }

        result
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn observe_passes_success_through() {
        let value: Result<u32, String> = observe("test.ok", async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn observe_passes_error_through() {
        let value: Result<u32, String> =
            observe("test.err", async { Err("boom".to_string()) }).await;
        assert_eq!(value, Err("boom".to_string()));
    }

    #[test]
    fn init_twice_does_not_panic() {
        let settings = TelemetrySettings::default();
        init(&settings);
        init(&TelemetrySettings {
            log_format: LogFormat::Json,
            ..settings
        });
    }
}
