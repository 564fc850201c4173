use api_types::Envelope;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use cors::CorsConfig;
pub use server::{ServerState, router, run_with_listener, shutdown_signal};

mod cors;
mod debts;
mod groups;
mod server;
mod transactions;
mod users;

pub mod types {
    pub use api_types::{Envelope, Health, ResponseStatus};

    pub mod user {
        pub use api_types::user::{User, UserNew, UserUpdate};
    }

    pub mod group {
        pub use api_types::group::{Group, GroupNew, GroupSummary, GroupUpdate, MemberAdd};
    }

    pub mod debt {
        pub use api_types::debt::{
            BalanceQuery, Debt, DebtNew, DebtQuery, DebtStatus, DebtSummary, DebtUpdate,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{Participant, Transaction, TransactionNew};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Envelope::error(error))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(format!("invalid request body: {}", value.body_text()))
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(format!("invalid path: {}", value.body_text()))
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(format!("invalid query: {}", value.body_text()))
    }
}
