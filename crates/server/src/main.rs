//! GramaSathi Server Entry Point

use std::net::SocketAddr;
use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use gramasathi_config::Settings;
use gramasathi_server::{create_router, init_metrics, load_or_default, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("GRAMASATHI_ENV").ok();
    let environment = env.as_deref().unwrap_or("default");
    let (config, load_error) = load_or_default(Path::new("config"), env.as_deref());

    init_tracing(&config);

    if let Some(e) = load_error {
        tracing::error!(
            environment,
            error = %e,
            "Failed to load configuration; running with development defaults and authentication disabled"
        );
    } else {
        tracing::info!(environment, "Loaded configuration from files");
    }

    tracing::info!("Starting GramaSathi Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        provider = ?config.llm.provider,
        model = %config.llm.resolved_model(),
        action_server = config.action_server.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled && init_metrics().is_some() {
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let state = AppState::new(config.clone())?;
    tracing::info!(
        knowledge_entries = state.agent.knowledge_base().len(),
        model = state.agent.llm().model_name(),
        "Initialized application state"
    );

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn env_filter(config: &Settings) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("gramasathi={level},tower_http=debug").into()
    })
}

/// Initialize tracing (with optional OpenTelemetry when feature enabled)
#[cfg(feature = "telemetry")]
fn init_tracing(config: &Settings) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let subscriber = tracing_subscriber::registry().with(env_filter(config));
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    if let Some(otlp_endpoint) = &config.observability.otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_endpoint)
            .build();

        match exporter {
            Ok(exporter) => {
                let provider = opentelemetry_sdk::trace::TracerProvider::builder()
                    .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
                    .with_resource(opentelemetry_sdk::Resource::new(vec![
                        opentelemetry::KeyValue::new("service.name", "gramasathi"),
                        opentelemetry::KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                    ]))
                    .build();
                let tracer = provider.tracer("gramasathi");
                opentelemetry::global::set_tracer_provider(provider);

                let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
                subscriber.with(fmt_layer).with(otel_layer).init();
                tracing::info!(endpoint = %otlp_endpoint, "OpenTelemetry tracing enabled");
                return;
            }
            Err(e) => eprintln!("Failed to initialize OpenTelemetry: {}. Falling back.", e),
        }
    }
    subscriber.with(fmt_layer).init();
}

/// Initialize tracing (console only - telemetry feature disabled)
#[cfg(not(feature = "telemetry"))]
fn init_tracing(config: &Settings) {
    let subscriber = tracing_subscriber::registry().with(env_filter(config));
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
