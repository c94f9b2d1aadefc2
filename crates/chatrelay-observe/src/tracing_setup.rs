//! Tracing initialization for the relay binary.
//!
//! Installs a structured `fmt` subscriber and, when requested, bridges spans
//! into OpenTelemetry so the GenAI chat spans can be inspected. The stdout
//! exporter is for local runs; swap it for OTLP when a collector exists.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset: relay crates and the HTTP trace
/// layer at info, everything else at warn.
const DEFAULT_FILTER: &str =
    "warn,chatrelay=info,chatrelay_core=info,chatrelay_infra=info,tower_http=info";

/// Handle returned by [`init_tracing`]. Dropping it flushes buffered spans
/// and shuts down the OpenTelemetry exporter, so keep it alive for the life
/// of the process.
#[must_use]
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("otel shutdown: {e}");
            }
        }
    }
}

/// Install the global subscriber: an `EnvFilter` (honoring `RUST_LOG`, with
/// [`DEFAULT_FILTER`] as the fallback), a `fmt` layer with span close timing,
/// and an OpenTelemetry layer when `enable_otel` is set.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_tracing(enable_otel: bool) -> Result<TracingGuard, Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if !enable_otel {
        registry.try_init()?;
        return Ok(TracingGuard { provider: None });
    }

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
        .build();
    let tracer = provider.tracer("chatrelay");
    opentelemetry::global::set_tracer_provider(provider.clone());

    registry
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    Ok(TracingGuard {
        provider: Some(provider),
    })
}
