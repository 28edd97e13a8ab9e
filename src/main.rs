//! Composition root: wires configuration, adapters and routes, then serves.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fest_registry::adapters::gateway::HttpBookingGateway;
use fest_registry::adapters::http::registration::{registration_routes, RegistrationAppState};
use fest_registry::adapters::http::webhook::{webhook_routes, WebhookAppState};
use fest_registry::adapters::postgres::PostgresRegistrationStore;
use fest_registry::application::reconciliation::ReconciliationEngine;
use fest_registry::config::{AppConfig, TicketCatalog};
use fest_registry::ports::{BookingGateway, RegistrationStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let catalog = Arc::new(TicketCatalog::load(&config.tickets.catalog_path)?);
    info!(
        tickets = catalog.len(),
        path = %config.tickets.catalog_path,
        "ticket catalog loaded"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let store: Arc<dyn RegistrationStore> = Arc::new(PostgresRegistrationStore::new(pool));
    let gateway: Arc<dyn BookingGateway> = Arc::new(HttpBookingGateway::new(&config.gateway)?);
    let engine = Arc::new(ReconciliationEngine::new(store.clone(), gateway.clone()));

    if config.gateway.webhook_token.is_none() {
        warn!("no webhook token configured; all webhook deliveries will be rejected");
    }

    let registration_state = RegistrationAppState {
        store,
        gateway,
        catalog,
        engine: engine.clone(),
        payment_page_base_url: config.gateway.payment_page_base_url.clone(),
    };
    let webhook_state = WebhookAppState {
        engine,
        webhook_token: config.gateway.webhook_token.clone(),
    };

    let origins = config
        .server
        .cors_origins_list()
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .allow_origin(AllowOrigin::list(origins));

    let app = Router::new()
        .nest(
            "/api",
            registration_routes().with_state(registration_state),
        )
        .nest("/api", webhook_routes().with_state(webhook_state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors);

    let addr = config.server.socket_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
