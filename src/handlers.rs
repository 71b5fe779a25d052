//! API handlers for the feedback service

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::{self, AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::models::{
    AuthorInfo, CreateFeedbackRequest, DisputeRequest, FeedbackResponse, FeedbackView,
    FeedbackWithAuthor, ProfileSummary, ResolutionStatus, ResolveRequest, UserFeedbackResponse,
};
use crate::notify;

/// Shape a joined feedback row for the current viewer.
fn shape(viewer: Option<&AuthUser>, row: FeedbackWithAuthor) -> FeedbackView {
    let FeedbackWithAuthor {
        feedback,
        author_username,
        author_avatar,
    } = row;

    let author = author_username.map(|username| AuthorInfo {
        id: feedback.author_id,
        username,
        avatar: author_avatar,
    });

    FeedbackView {
        can_edit: auth::can_edit(viewer, &feedback),
        can_delete: auth::can_delete(viewer, &feedback),
        can_dispute: auth::can_dispute(viewer, &feedback),
        author,
        feedback,
    }
}

/// GET /deald-feedback/user/:username
///
/// Feedback received by a user, newest first, with aggregate stats and a
/// canLeaveFeedback flag for the current viewer. Readable anonymously.
pub async fn list_user_feedback(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserFeedbackResponse>, ApiError> {
    let user = state
        .identity
        .resolve_username(&username)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let rows = state.feedback_service.list_for_recipient(user.id).await?;
    let stats = state.feedback_service.stats(user.id).await?;
    let can_leave_feedback = auth::can_leave_feedback(viewer.as_ref(), &user);

    let feedbacks = rows
        .into_iter()
        .map(|row| shape(viewer.as_ref(), row))
        .collect();

    Ok(Json(UserFeedbackResponse {
        feedbacks,
        stats,
        can_leave_feedback,
    }))
}

/// GET /deald-feedback/user/:username/summary
///
/// Lightweight stats for compact profile summaries.
pub async fn user_feedback_summary(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ProfileSummary>, ApiError> {
    let user = state
        .identity
        .resolve_username(&username)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let stats = state.feedback_service.stats(user.id).await?;
    Ok(Json(stats.summary()))
}

/// GET /deald-feedback/:id
pub async fn get_feedback(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let row = state
        .feedback_service
        .get_with_author(id)
        .await?
        .ok_or(ApiError::NotFound("feedback"))?;

    Ok(Json(FeedbackResponse {
        feedback: shape(viewer.as_ref(), row),
    }))
}

/// POST /deald-feedback/user/:username
pub async fn create_feedback(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(username): Path<String>,
    Json(request): Json<CreateFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let recipient = state
        .identity
        .resolve_username(&username)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    if recipient.is_admin {
        return Err(ApiError::Forbidden(
            "feedback cannot be left for an administrator".to_string(),
        ));
    }

    let feedback = state
        .feedback_service
        .create(actor.id, recipient.id, &request)
        .await?;

    notify::deliver(
        state.messenger.clone(),
        notify::feedback_received(&actor.username, &recipient.username, &feedback),
    );

    let mut view = shape_bare(Some(&actor), feedback);
    view.author = Some(AuthorInfo {
        id: actor.id,
        username: actor.username.clone(),
        avatar: None,
    });

    Ok(Json(FeedbackResponse { feedback: view }))
}

/// DELETE /deald-feedback/:id
pub async fn delete_feedback(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let feedback = state
        .feedback_service
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("feedback"))?;

    if !auth::can_delete(Some(&actor), &feedback) {
        return Err(ApiError::Forbidden(
            "you cannot delete this feedback".to_string(),
        ));
    }

    state.feedback_service.delete(id).await?;

    Ok(Json(json!({ "success": true })))
}

/// POST /deald-feedback/:id/dispute
pub async fn dispute_feedback(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<DisputeRequest>,
) -> Result<Json<Value>, ApiError> {
    let feedback = state
        .feedback_service
        .get(id)
        .await?
        .ok_or(ApiError::NotFound("feedback"))?;

    if feedback.recipient_id != actor.id {
        return Err(ApiError::Forbidden(
            "only the recipient can dispute feedback".to_string(),
        ));
    }
    // Distinct from the permission failure above: a 422 the client can
    // explain, not a blanket denial.
    if feedback.disputed || feedback.was_disputed {
        return Err(ApiError::AlreadyDisputed);
    }

    let disputed = state.feedback_service.dispute(id, request.reason).await?;

    Ok(Json(json!({ "success": true, "feedback": shape_bare(Some(&actor), disputed) })))
}

/// POST /deald-feedback/:id/resolve
pub async fn resolve_feedback(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<Value>, ApiError> {
    if !actor.is_admin {
        return Err(ApiError::Forbidden(
            "administrator access required".to_string(),
        ));
    }

    // Closed status set, checked before the store is touched.
    let status = ResolutionStatus::parse(&request.status).ok_or_else(|| {
        ApiError::Validation("status must be \"accepted\" or \"rejected\"".to_string())
    })?;

    let feedback = state.feedback_service.resolve(id, actor.id, status).await?;

    if let Some(recipient) = state.identity.get_user(feedback.recipient_id).await? {
        let notice = match status {
            ResolutionStatus::Accepted => notify::dispute_accepted(&recipient.username, &feedback),
            ResolutionStatus::Rejected => notify::dispute_rejected(&recipient.username, &feedback),
        };
        notify::deliver(state.messenger.clone(), notice);
    }

    match status {
        // the record no longer exists
        ResolutionStatus::Accepted => Ok(Json(json!({ "success": true, "deleted": true }))),
        ResolutionStatus::Rejected => Ok(Json(
            json!({ "success": true, "feedback": shape_bare(Some(&actor), feedback) }),
        )),
    }
}

/// Shape a feedback record without joined author info.
fn shape_bare(viewer: Option<&AuthUser>, feedback: crate::models::Feedback) -> FeedbackView {
    FeedbackView {
        can_edit: auth::can_edit(viewer, &feedback),
        can_delete: auth::can_delete(viewer, &feedback),
        can_dispute: auth::can_dispute(viewer, &feedback),
        author: None,
        feedback,
    }
}
