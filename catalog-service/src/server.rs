//! HTTP server with graceful shutdown

use axum::{http::StatusCode, routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    health::{health, readiness},
    middleware::{request_id_layer, request_id_propagation_layer, sensitive_headers_layer},
    products::{self, Product},
    repository::EntityStore,
    state::AppState,
};

/// Assemble the routes and the middleware stack around `state`
///
/// With the `openapi` feature the Swagger UI and its document are mounted too.
pub fn build_app<S>(state: AppState<S>) -> Router
where
    S: EntityStore<Product> + Clone + 'static,
{
    let config = state.config().clone();

    let app = Router::new()
        .route("/health", get(health::<S>))
        .route("/ready", get(readiness::<S>))
        .merge(products::router::<S>())
        .with_state(state);

    #[cfg(feature = "openapi")]
    let app = app.merge(crate::openapi::swagger_ui(crate::openapi::api_docs(&config)));

    apply_middleware(app, &config)
}

/// Wrap `app` in the configured layers
///
/// The last layer added sees the request first.
pub fn apply_middleware(app: Router, config: &Config) -> Router {
    let middleware = &config.middleware;

    let mut app = app;
    if middleware.catch_panic {
        app = app.layer(CatchPanicLayer::new());
    }

    app = app
        .layer(RequestBodyLimitLayer::new(middleware.body_limit_bytes()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.service.timeout(),
        ));

    if middleware.compression {
        app = app.layer(CompressionLayer::new());
    }

    app.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().include_headers(true))
            .on_response(DefaultOnResponse::new().include_headers(true)),
    )
    .layer(request_id_propagation_layer())
    .layer(sensitive_headers_layer())
    .layer(request_id_layer())
    .layer(build_cors_layer(&middleware.cors_mode))
}

/// Build CORS layer based on configuration
fn build_cors_layer(mode: &str) -> CorsLayer {
    match mode {
        "permissive" => {
            tracing::debug!("Enabling permissive CORS");
            CorsLayer::permissive()
        }
        "restrictive" | "disabled" => {
            tracing::debug!("Enabling restrictive CORS (default deny)");
            CorsLayer::new()
        }
        other => {
            tracing::warn!("Unknown CORS mode: {}, defaulting to permissive", other);
            CorsLayer::permissive()
        }
    }
}

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind `0.0.0.0:<service.port>` and serve until SIGINT or SIGTERM
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        let listener = TcpListener::bind(&addr).await?;
        self.serve_with_shutdown(listener, app, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        app: Router,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            service = %self.config.service.name,
            environment = %self.config.service.environment,
            locale = %self.config.service.locale,
            "Server listening on {}",
            addr
        );
        self.log_middleware_config();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    fn log_middleware_config(&self) {
        let middleware = &self.config.middleware;
        tracing::info!(
            body_limit_mb = middleware.body_limit_mb,
            compression = middleware.compression,
            catch_panic = middleware.catch_panic,
            cors_mode = %middleware.cors_mode,
            timeout_secs = self.config.service.timeout_secs,
            "Middleware configured"
        );
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
