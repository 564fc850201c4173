//! Users API endpoints.

use api_types::{
    Envelope,
    user::{User, UserNew, UserUpdate},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{ServerError, server::ServerState};

pub(crate) fn user_view(user: engine::User) -> User {
    User {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Envelope<Vec<User>>>, ServerError> {
    let users = state.engine.users().await?;
    Ok(Json(Envelope::success(
        users.into_iter().map(user_view).collect(),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<UserNew>, ServerError>,
) -> Result<(StatusCode, Json<Envelope<User>>), ServerError> {
    let user = state.engine.new_user(&payload.name, &payload.email).await?;
    tracing::info!(user_id = user.id, "user created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("User created successfully", user_view(user))),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<User>>, ServerError> {
    let user = state.engine.user(id).await?;
    Ok(Json(Envelope::success(user_view(user))))
}

pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<UserUpdate>, ServerError>,
) -> Result<Json<Envelope<User>>, ServerError> {
    let user = state
        .engine
        .update_user(id, payload.name.as_deref(), payload.email.as_deref())
        .await?;
    Ok(Json(Envelope::with_message("User updated successfully", user_view(user))))
}

pub async fn remove(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_user(id).await?;
    tracing::info!(user_id = id, "user deleted");
    Ok(Json(Envelope::message("User deleted successfully")))
}
