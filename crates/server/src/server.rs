use std::{future::Future, sync::Arc};

use api_types::Health;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
};

use crate::{CorsConfig, cors, debts, groups, transactions, users};
use engine::Engine;

/// Largest accepted request body.
const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub cors: Arc<CorsConfig>,
}

impl ServerState {
    pub fn new(engine: Engine, cors: CorsConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            cors: Arc::new(cors),
        }
    }
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
    })
}

fn api(state: ServerState) -> Router<ServerState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::remove),
        )
        .route("/users/{id}/balance", get(debts::balance))
        .route("/users/{id}/transactions", get(transactions::list_for_user))
        .route("/groups", get(groups::list).post(groups::create))
        .route(
            "/groups/{id}",
            get(groups::get).put(groups::update).delete(groups::remove),
        )
        .route(
            "/groups/{id}/members",
            get(groups::members).post(groups::add_member),
        )
        .route(
            "/groups/{id}/members/{user_id}",
            delete(groups::remove_member),
        )
        .route("/groups/{id}/summary", get(groups::summary))
        .route("/debts", get(debts::list).post(debts::create))
        .route(
            "/debts/{id}",
            get(debts::get).put(debts::update).delete(debts::remove),
        )
        .route("/transactions", post(transactions::create))
        .route("/transactions/{id}", get(transactions::get))
        .layer(middleware::from_fn_with_state(state, cors::cors))
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api(state.clone()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

/// Serve on `listener` until `shutdown` resolves.
pub async fn run_with_listener<F>(
    state: ServerState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
