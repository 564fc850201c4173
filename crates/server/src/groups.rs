//! Groups and memberships API endpoints.

use api_types::{
    Envelope,
    group::{Group, GroupNew, GroupSummary, GroupUpdate, MemberAdd},
    user::User,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{ServerError, server::ServerState, users::user_view};

fn group_view(group: engine::Group, with_members: bool) -> Group {
    Group {
        id: group.id,
        name: group.name,
        description: group.description,
        created_by: group.created_by,
        created_at: group.created_at,
        updated_at: group.updated_at,
        members: with_members.then(|| group.members.into_iter().map(user_view).collect()),
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Envelope<Vec<Group>>>, ServerError> {
    let groups = state.engine.groups().await?;
    Ok(Json(Envelope::success(
        groups.into_iter().map(|g| group_view(g, false)).collect(),
    )))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<GroupNew>, ServerError>,
) -> Result<(StatusCode, Json<Envelope<Group>>), ServerError> {
    let group = state
        .engine
        .new_group(&payload.name, payload.description.as_deref(), payload.created_by)
        .await?;
    tracing::info!(group_id = group.id, created_by = group.created_by, "group created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Group created successfully",
            group_view(group, true),
        )),
    ))
}

pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<Group>>, ServerError> {
    let group = state.engine.group(id).await?;
    Ok(Json(Envelope::success(group_view(group, true))))
}

pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<GroupUpdate>, ServerError>,
) -> Result<Json<Envelope<Group>>, ServerError> {
    let group = state
        .engine
        .update_group(id, payload.name.as_deref(), payload.description.as_deref())
        .await?;
    Ok(Json(Envelope::with_message(
        "Group updated successfully",
        group_view(group, true),
    )))
}

pub async fn remove(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_group(id).await?;
    tracing::info!(group_id = id, "group deleted");
    Ok(Json(Envelope::message("Group deleted successfully")))
}

pub async fn members(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<Vec<User>>>, ServerError> {
    let members = state.engine.group_members(id).await?;
    Ok(Json(Envelope::success(
        members.into_iter().map(user_view).collect(),
    )))
}

pub async fn add_member(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<MemberAdd>, ServerError>,
) -> Result<(StatusCode, Json<Envelope<Vec<User>>>), ServerError> {
    let members = state.engine.add_group_member(id, payload.user_id).await?;
    tracing::debug!(group_id = id, user_id = payload.user_id, "member added");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message(
            "Member added successfully",
            members.into_iter().map(user_view).collect(),
        )),
    ))
}

pub async fn remove_member(
    State(state): State<ServerState>,
    WithRejection(Path((id, user_id)), _): WithRejection<Path<(i32, i32)>, ServerError>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.remove_group_member(id, user_id).await?;
    tracing::debug!(group_id = id, user_id, "member removed");
    Ok(Json(Envelope::message("Member removed successfully")))
}

pub async fn summary(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ServerError>,
) -> Result<Json<Envelope<GroupSummary>>, ServerError> {
    let summary = state.engine.group_summary(id).await?;
    Ok(Json(Envelope::success(GroupSummary {
        group_id: summary.group_id,
        group_name: summary.group_name,
        total_debts: summary.total_debts_minor,
        active_debts: summary.active_debts,
        settled_debts: summary.settled_debts,
        member_count: summary.member_count,
    })))
}
