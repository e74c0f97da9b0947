pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use service_core::middleware::tracing::request_id_middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{LedgerEngine, MongoLedgerStore, MongoTenantDirectory};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: LedgerEngine,
}

pub struct Application {
    port: u16,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some("rent-ledger-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let ledger_store = MongoLedgerStore::new(&db);
        // The unique (tenant_id, month, year) index is what makes duplicate
        // blocking race-free; it must exist before we serve traffic.
        ledger_store.init_indexes().await?;

        let tenant_directory = MongoTenantDirectory::new(&db);

        services::metrics::init_metrics();

        let engine = LedgerEngine::new(Arc::new(tenant_directory), Arc::new(ledger_store));

        let state = AppState {
            config: config.clone(),
            engine,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/metrics", get(handlers::metrics))
            .route("/payments", post(handlers::payments::submit_payment))
            .route("/payments", get(handlers::payments::list_payments))
            .route("/payments/:id", get(handlers::payments::get_payment))
            .route("/payments/:id", delete(handlers::payments::delete_payment))
            .route(
                "/payments/:id/amount",
                patch(handlers::payments::correct_amount),
            )
            .route(
                "/payments/:id/status",
                patch(handlers::payments::change_status),
            )
            .route(
                "/payments/:id/method",
                patch(handlers::payments::change_method),
            )
            .route(
                "/payments/:id/repair",
                post(handlers::payments::repair_payment),
            )
            .route(
                "/tenants/:id/payments",
                get(handlers::payments::tenant_payments),
            )
            .layer(CorsLayer::permissive())
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        Ok(Self {
            port: config.server.port,
            router,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
