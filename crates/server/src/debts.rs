//! Debts and balances API endpoints.

use api_types::{
    Envelope,
    debt::{BalanceQuery, Debt, DebtNew, DebtQuery, DebtStatus, DebtSummary, DebtUpdate},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{ServerError, server::ServerState};

fn status_view(status: engine::DebtStatus) -> DebtStatus {
    match status {
        engine::DebtStatus::Active => DebtStatus::Active,
        engine::DebtStatus::Settled => DebtStatus::Settled,
        engine::DebtStatus::Cancelled => DebtStatus::Cancelled,
    }
}

fn parse_status(status: Option<&str>) -> Result<Option<engine::DebtStatus>, ServerError> {
    Ok(status.map(engine::DebtStatus::try_from).transpose()?)
}

fn debt_view(debt: engine::Debt) -> Debt {
    Debt {
        id: debt.id,
        group_id: debt.group_id,
        from_user_id: debt.from_user_id,
        to_user_id: debt.to_user_id,
        amount: debt.amount_minor,
        description: debt.description,
        status: status_view(debt.status),
        created_at: debt.created_at,
        updated_at: debt.updated_at,
        settled_at: debt.settled_at,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<DebtQuery>, ServerError>,
) -> Result<Json<Envelope<Vec<Debt>>>, ServerError> {
    let filter = engine::DebtFilter {
        group_id: query.group_id,
        user_id: query.user_id,
        status: parse_status(query.status.as_deref())?,
    };
    let debts = state.engine.debts(&filter).await?;
    Ok(Json(Envelope::success(
        debts.into_iter().map(debt_view).collect(),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<DebtNew>, ServerError>,
) -> Result<(StatusCode, Json<Envelope<Debt>>), ServerError> {
    let debt = state
        .engine
        .new_debt(engine::NewDebt {
            group_id: payload.group_id,
            from_user_id: payload.from_user_id,
            to_user_id: payload.to_user_id,
            amount_minor: payload.amount,
            description: payload.description,
        })
        .await?;
    tracing::info!(debt_id = debt.id, group_id = debt.group_id, "debt created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Debt created successfully",
            debt_view(debt),
        )),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<Debt>>, ServerError> {
    let debt = state.engine.debt(id).await?;
    Ok(Json(Envelope::success(debt_view(debt))))
}

pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<DebtUpdate>, ServerError>,
) -> Result<Json<Envelope<Debt>>, ServerError> {
    let changes = engine::DebtChanges {
        amount_minor: payload.amount,
        description: payload.description,
        status: parse_status(payload.status.as_deref())?,
    };
    let debt = state.engine.update_debt(id, changes).await?;
    tracing::debug!(debt_id = id, status = debt.status.as_str(), "debt updated");

    Ok(Json(Envelope::with_message(
        "Debt updated successfully",
        debt_view(debt),
    )))
}

pub async fn remove(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_debt(id).await?;
    tracing::info!(debt_id = id, "debt deleted");
    Ok(Json(Envelope::message("Debt deleted successfully")))
}

/// `GET /users/{id}/balance`
pub async fn balance(
    State(state): State<ServerState>,
    WithRejection(Path(user_id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Query(query), _): WithRejection<Query<BalanceQuery>, ServerError>,
) -> Result<Json<Envelope<DebtSummary>>, ServerError> {
    let summary = state.engine.debt_summary(user_id, query.group_id).await?;
    Ok(Json(Envelope::success(DebtSummary {
        user_id: summary.user_id,
        user_name: summary.user_name,
        total_owed: summary.total_owed_minor,
        total_owed_to: summary.total_owed_to_minor,
        net_balance: summary.net_balance_minor,
    })))
}
