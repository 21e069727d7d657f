pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod email_templates;
mod error;
mod routes;
pub mod service;
mod state;
pub mod telemetry;

use anyhow::Context;
use axum::{
    http::{HeaderValue, StatusCode},
    response::Response,
    routing::IntoMakeService,
    Router, Server,
};
use configuration::Settings;
use email_client::{MailTransport, SmtpRelay};
use hyper::server::conn::AddrIncoming;
use routes::contact::{ErrorBody, UNEXPECTED_ERROR_MESSAGE};
use service::contact_relay::ContactRelay;
use state::AppState;
use std::{any::Any, net::TcpListener, sync::Arc};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

pub struct App {
    port: u16,
    server: Server<AddrIncoming, IntoMakeService<Router>>,
}

impl App {
    /// Build the app, relaying submissions through the configured SMTP relay.
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let transport = Arc::new(SmtpRelay::new(&settings.email));
        Self::build_with_transport(settings, transport)
    }

    /// Build the app with the given [`MailTransport`] and bind it to the
    /// configured address.
    pub fn build_with_transport(
        settings: Settings,
        transport: Arc<dyn MailTransport>,
    ) -> anyhow::Result<Self> {
        if let Err(e) = settings.email.relay_identity() {
            tracing::warn!(
                error.cause_chain = ?e,
                "Mail relay is not fully configured, submissions will be rejected"
            );
        }

        let address = settings.application.address();
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind to {address}"))?;
        let port = listener.local_addr()?.port();

        let cors = build_cors_layer(&settings.application.allowed_origins)?;
        let app_state = AppState::new(ContactRelay::new(settings.email, transport));
        let router = Self::build_router(app_state, cors);

        let server = Server::from_tcp(listener)?.serve(router.into_make_service());

        Ok(Self { port, server })
    }

    /// The port the app is bound to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests until the server fails.
    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Server running at {}", self.server.local_addr());
        self.server.await?;
        Ok(())
    }

    /// Build the router for the application.
    fn build_router(app_state: AppState, cors: CorsLayer) -> Router {
        use tower::ServiceBuilder;
        use tower_http::{
            catch_panic::CatchPanicLayer,
            trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
        };
        use tracing::Level;

        Router::new()
            .nest("/health", routes::health::create_router())
            .nest("/docs", routes::docs::create_router())
            .nest("/api", routes::contact::create_router())
            .with_state(app_state)
            .layer(
                ServiceBuilder::new()
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                            .on_request(DefaultOnRequest::new().level(Level::INFO))
                            .on_response(DefaultOnResponse::new().level(Level::INFO)),
                    )
                    .layer(cors)
                    .layer(CatchPanicLayer::custom(handle_panic)),
            )
    }
}

/// Allow browsers on the given origins to call the API with any method and
/// header, including credentials.
fn build_cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin == "*" {
                anyhow::bail!("Wildcard origin cannot be combined with credentials");
            }
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic.message = message, "Request handler panicked");

    ErrorBody::response(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR_MESSAGE)
}
