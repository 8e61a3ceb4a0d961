use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use funnel::config::ServerConfig;
use funnel::registry::StepRegistry;
use funnel::routes::{FunnelRouteState, funnel_routes};
use funnel::service::StepService;
use funnel::store::InMemoryStepStore;
use funnel::validation::Validator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("invalid configuration")?;

    // Keep the guard alive for the whole run so buffered file logs are flushed.
    let _log_guard = init_tracing(&config);

    let registry = match &config.catalog_path {
        Some(path) => StepRegistry::from_json_file(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => StepRegistry::builtin(),
    };

    let registry = Arc::new(registry);
    let validator = Arc::new(Validator::with_builtin_rules());
    let service = StepService::new(
        registry.clone(),
        Arc::new(InMemoryStepStore::new()),
        validator.clone(),
    )
    .context("catalog uses rules the validator cannot interpret")?;

    eprintln!("📝 Funnel v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Steps: {}", registry.len());
    eprintln!("   Rules: {}", validator.rule_names().join(", "));
    eprintln!("   API:   http://{}/api/registration", config.socket_addr());

    let app = funnel_routes(FunnelRouteState {
        service: Arc::new(service),
    })
    .layer(cors_layer(&config));

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;
    tracing::info!(addr = %config.socket_addr(), "Funnel server started");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &ServerConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "funnel.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}

/// Origins were checked when the config was loaded.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let allow = if config.cors_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .cors_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
