//! Equal split transactions API endpoints.

use api_types::{
    Envelope,
    transaction::{Participant, Transaction, TransactionNew},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{ServerError, server::ServerState};

fn transaction_view(tx: engine::Transaction) -> Transaction {
    Transaction {
        id: tx.id,
        creator_id: tx.creator_id,
        amount: tx.amount_minor,
        description: tx.description,
        created_at: tx.created_at,
        participants: tx
            .participants
            .into_iter()
            .map(|p| Participant {
                user_id: p.user_id,
                amount: p.amount_minor,
            })
            .collect(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionNew>, ServerError>,
) -> Result<(StatusCode, Json<Envelope<Transaction>>), ServerError> {
    let tx = state
        .engine
        .create_transaction(
            payload.creator_id,
            payload.amount,
            &payload.participants,
            &payload.description,
        )
        .await?;
    tracing::info!(
        transaction_id = tx.id,
        participants = tx.participants.len(),
        "transaction created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Transaction created successfully",
            transaction_view(tx),
        )),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<Transaction>>, ServerError> {
    let tx = state.engine.transaction(id).await?;
    Ok(Json(Envelope::success(transaction_view(tx))))
}

/// `GET /users/{id}/transactions`
pub async fn list_for_user(
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<Vec<Transaction>>>, ServerError> {
    let txs = state.engine.transactions_for_user(user_id).await?;
    Ok(Json(Envelope::success(
        txs.into_iter().map(transaction_view).collect(),
    )))
}
