use axum::{
    Json, Router,
    extract::Request,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{
    accounts,
    auth::{self, AuthKeys, AuthSettings},
    categories, transactions,
};
use api_types::Status;
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub(crate) auth: Arc<AuthKeys>,
}

impl ServerState {
    pub fn new(engine: Arc<Engine>, settings: &AuthSettings) -> Self {
        Self {
            engine,
            auth: Arc::new(AuthKeys::new(settings)),
        }
    }
}

async fn health() -> Json<Status> {
    Json(Status::ok())
}

/// Builds the full application: `/health` plus the `/api/v1` routes.
pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::patch)
                .delete(accounts::delete),
        )
        .route(
            "/categories",
            get(categories::list).post(categories::create),
        )
        .route(
            "/categories/{id}",
            axum::routing::patch(categories::patch).delete(categories::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/{id}",
            get(transactions::get)
                .patch(transactions::patch)
                .delete(transactions::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::info_span!("request", method = %req.method(), uri = %req.uri())
            }),
        )
        .with_state(state)
}

pub async fn run(engine: Engine, settings: AuthSettings, addr: &str) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(Arc::new(engine), settings, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Arc<Engine>,
    settings: AuthSettings,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState::new(engine, &settings);
    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Arc<Engine>,
    settings: AuthSettings,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, settings, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
