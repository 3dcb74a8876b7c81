//! Logging for the roster CLI
//!
//! Console output is always on and filtered by `RUST_LOG` (falling back to
//! `info`, or `debug` with `--debug`). With the `telemetry` feature and
//! `--otel`, spans are also exported over OTLP; the exporter reads
//! `OTEL_EXPORTER_OTLP_ENDPOINT` itself.

use anyhow::{anyhow, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    pub debug: bool,
    pub otel: bool,
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: &TracingConfig) -> Result<()> {
    let level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = tracing_subscriber::fmt::layer()
        .with_target(config.debug)
        .compact();

    let registry = tracing_subscriber::registry().with(filter).with(console);

    #[cfg(feature = "telemetry")]
    let registry = registry.with(if config.otel {
        Some(otlp::layer()?)
    } else {
        None
    });

    #[cfg(not(feature = "telemetry"))]
    if config.otel {
        eprintln!("--otel ignored: built without the telemetry feature");
    }

    registry.try_init().map_err(|err| anyhow!(err))
}

#[cfg(feature = "telemetry")]
mod otlp {
    use anyhow::{Context, Result};
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::trace::{Tracer, TracerProvider};
    use opentelemetry_sdk::{runtime, Resource};
    use tracing::Subscriber;
    use tracing_opentelemetry::OpenTelemetryLayer;
    use tracing_subscriber::registry::LookupSpan;

    const SERVICE: &str = "roster";

    pub(super) fn layer<S>() -> Result<OpenTelemetryLayer<S, Tracer>>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .build()
            .context("building OTLP span exporter")?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_resource(Resource::new([KeyValue::new("service.name", SERVICE)]))
            .build();
        let tracer = provider.tracer(SERVICE);

        // The global handle owns the provider until shutdown_otel
        opentelemetry::global::set_tracer_provider(provider);

        Ok(tracing_opentelemetry::layer().with_tracer(tracer))
    }
}

/// Flush pending spans before exit.
pub fn shutdown_otel() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_console_subscriber_once() {
        let config = TracingConfig::default();
        assert!(init(&config).is_ok());
        assert!(init(&config).is_err());
    }
}
