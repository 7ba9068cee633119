use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::AuthService;
use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::email::{EmailSender, SmtpMailer};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;

/// The Pitchside auth application: config, database, mailer, and router.
pub struct App {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub mailer: Arc<dyn EmailSender>,
}

impl App {
    /// Create a new application from environment configuration, with the
    /// SMTP mailer. Fails fast when the signing secret is missing.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        let mailer = Arc::new(SmtpMailer::new(Arc::new(config.clone())));
        Self::with_config(config, mailer).await
    }

    /// Create a new application with a given config and email collaborator.
    pub async fn with_config(
        config: Config,
        mailer: Arc<dyn EmailSender>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        // Run pending migrations automatically on startup
        tracing::info!("Running pending database migrations...");
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations complete.");

        Ok(App {
            config: Arc::new(config),
            db,
            mailer,
        })
    }

    /// Build the Axum router for the auth API.
    pub fn router(&self) -> Router {
        let is_dev = self.config.is_dev();

        let state = AppState {
            db: self.db.clone(),
            config: self.config.clone(),
            auth: AuthService::new(
                self.db.clone(),
                self.config.clone(),
                self.mailer.clone(),
            ),
        };

        let mut router = Router::new()
            .merge(controllers::auth::routes().with_state(state))
            .merge(Scalar::with_url("/api-docs", ApiDoc::openapi()))
            .layer(axum::Extension(self.config.clone()))
            .layer(CorsLayer::permissive());

        // Only add tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::trace::DefaultMakeSpan;
            use tower_http::trace::DefaultOnRequest;
            use tower_http::trace::DefaultOnResponse;
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        tracing::info!("Pitchside auth server running on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down...");
}
