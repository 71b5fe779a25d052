//! Feedback store - entity invariants and atomic state transitions
//!
//! Every transition is a single guarded statement against Postgres, so a
//! lost race shows up as a missed row count instead of a half-applied
//! mutation. Duplicate detection relies on the composite unique index,
//! not an existence pre-check.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    CreateFeedbackRequest, Feedback, FeedbackRole, FeedbackStats, FeedbackWithAuthor,
    ResolutionStatus, StatsRow,
};

/// Postgres unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";

pub struct FeedbackService {
    db_pool: PgPool,
}

impl FeedbackService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Create a feedback record for (author, recipient, ticket).
    ///
    /// Entity constraints are enforced here regardless of what the boundary
    /// already validated; the duplicate constraint comes back from the
    /// unique index as the canonical "duplicate" error.
    pub async fn create(
        &self,
        author_id: Uuid,
        recipient_id: Uuid,
        request: &CreateFeedbackRequest,
    ) -> Result<Feedback, ApiError> {
        validate_new_feedback(author_id, recipient_id, request)?;

        let role = FeedbackRole::parse_lossy(request.role.as_deref());
        let now = Utc::now();

        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedbacks (
                id, author_id, recipient_id, rating, comment, ticket_number,
                role, disputed, was_disputed, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, false, false, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(recipient_id)
        .bind(request.rating)
        .bind(&request.comment)
        .bind(request.ticket_number.trim())
        .bind(role)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) => {
                ApiError::Validation(
                    "feedback for this ticket has already been left for this user".to_string(),
                )
            }
            _ => ApiError::Database(e),
        })?;

        Ok(feedback)
    }

    /// Fetch a single feedback record
    pub async fn get(&self, id: Uuid) -> Result<Option<Feedback>, ApiError> {
        let feedback = sqlx::query_as::<_, Feedback>("SELECT * FROM feedbacks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(feedback)
    }

    /// Fetch a single feedback record with author info joined
    pub async fn get_with_author(&self, id: Uuid) -> Result<Option<FeedbackWithAuthor>, ApiError> {
        let feedback = sqlx::query_as::<_, FeedbackWithAuthor>(
            r#"
            SELECT f.*, u.username AS author_username, u.avatar AS author_avatar
            FROM feedbacks f
            LEFT JOIN users u ON u.id = f.author_id
            WHERE f.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(feedback)
    }

    /// List feedback received by a user, newest first, authors joined
    pub async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> Result<Vec<FeedbackWithAuthor>, ApiError> {
        let feedbacks = sqlx::query_as::<_, FeedbackWithAuthor>(
            r#"
            SELECT f.*, u.username AS author_username, u.avatar AS author_avatar
            FROM feedbacks f
            LEFT JOIN users u ON u.id = f.author_id
            WHERE f.recipient_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(recipient_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(feedbacks)
    }

    /// Aggregate stats over all feedback received by a user
    pub async fn stats(&self, recipient_id: Uuid) -> Result<FeedbackStats, ApiError> {
        let rows = sqlx::query_as::<_, StatsRow>(
            "SELECT rating, disputed, resolution_status FROM feedbacks WHERE recipient_id = $1",
        )
        .bind(recipient_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(FeedbackStats::from_rows(&rows))
    }

    /// Open a dispute. The guard clause makes the transition atomic: a
    /// record that is already disputed, or has consumed its one dispute,
    /// never matches.
    pub async fn dispute(&self, id: Uuid, reason: Option<String>) -> Result<Feedback, ApiError> {
        let now = Utc::now();
        let updated = sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedbacks
            SET disputed = true, dispute_reason = $2, disputed_at = $3, updated_at = $3
            WHERE id = $1 AND NOT disputed AND NOT was_disputed
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(now)
        .fetch_optional(&self.db_pool)
        .await?;

        match updated {
            Some(feedback) => Ok(feedback),
            None => match self.get(id).await? {
                Some(_) => Err(ApiError::AlreadyDisputed),
                None => Err(ApiError::NotFound("feedback")),
            },
        }
    }

    /// Resolve an open dispute. Accepting removes the record; rejecting
    /// finalizes it and permanently blocks further disputes. Resolving a
    /// record that is not under dispute is rejected.
    pub async fn resolve(
        &self,
        id: Uuid,
        admin_id: Uuid,
        status: ResolutionStatus,
    ) -> Result<Feedback, ApiError> {
        let now = Utc::now();
        let resolved = match status {
            ResolutionStatus::Accepted => {
                sqlx::query_as::<_, Feedback>(
                    "DELETE FROM feedbacks WHERE id = $1 AND disputed RETURNING *",
                )
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?
            }
            ResolutionStatus::Rejected => {
                sqlx::query_as::<_, Feedback>(
                    r#"
                    UPDATE feedbacks
                    SET disputed = false, resolved_by_id = $2, resolved_at = $3,
                        resolution_status = 'rejected', was_disputed = true, updated_at = $3
                    WHERE id = $1 AND disputed
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(admin_id)
                .bind(now)
                .fetch_optional(&self.db_pool)
                .await?
            }
        };

        match resolved {
            Some(feedback) => Ok(feedback),
            None => match self.get(id).await? {
                Some(_) => Err(ApiError::Validation(
                    "feedback is not under dispute".to_string(),
                )),
                None => Err(ApiError::NotFound("feedback")),
            },
        }
    }

    /// Remove a record unconditionally. Authorization is the caller's job.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let deleted = sqlx::query_as::<_, (Uuid,)>("DELETE FROM feedbacks WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound("feedback")),
        }
    }
}

/// Entity-level constraints on a new feedback record
fn validate_new_feedback(
    author_id: Uuid,
    recipient_id: Uuid,
    request: &CreateFeedbackRequest,
) -> Result<(), ApiError> {
    if author_id == recipient_id {
        return Err(ApiError::Validation(
            "you cannot leave feedback for yourself".to_string(),
        ));
    }
    if !(1..=5).contains(&request.rating) {
        return Err(ApiError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    if request.ticket_number.trim().is_empty() {
        return Err(ApiError::Validation("ticket number is required".to_string()));
    }
    if let Some(comment) = &request.comment {
        if comment.chars().count() > 1000 {
            return Err(ApiError::Validation(
                "comment must be at most 1000 characters".to_string(),
            ));
        }
    }
    Ok(())
}
