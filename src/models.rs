//! Data models for the Deald feedback service

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

/// Feedback record, one per (author, recipient, ticket)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub author_id: Uuid,
    pub recipient_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub ticket_number: String,
    pub role: FeedbackRole,
    pub disputed: bool,
    pub dispute_reason: Option<String>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub resolved_by_id: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_status: Option<ResolutionStatus>,
    pub was_disputed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The author's role in the underlying transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "feedback_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRole {
    Buyer,
    Seller,
}

impl FeedbackRole {
    /// Unknown role strings are normalized to buyer, never rejected.
    pub fn parse_lossy(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("seller") => FeedbackRole::Seller,
            _ => FeedbackRole::Buyer,
        }
    }
}

/// Admin verdict on a dispute. Accepted never persists: accepting a dispute
/// deletes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resolution_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Accepted,
    Rejected,
}

impl ResolutionStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accepted" => Some(ResolutionStatus::Accepted),
            "rejected" => Some(ResolutionStatus::Rejected),
            _ => None,
        }
    }
}

/// Rating classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingClass {
    Positive,
    Neutral,
    Negative,
}

/// Classify a rating: >=4 positive, =3 neutral, <=2 negative.
pub fn classify(rating: i32) -> RatingClass {
    if rating >= 4 {
        RatingClass::Positive
    } else if rating == 3 {
        RatingClass::Neutral
    } else {
        RatingClass::Negative
    }
}

/// Feedback row joined with author info for presentation
#[derive(Debug, sqlx::FromRow)]
pub struct FeedbackWithAuthor {
    #[sqlx(flatten)]
    pub feedback: Feedback,
    pub author_username: Option<String>,
    pub author_avatar: Option<String>,
}

/// Minimal projection used for stats aggregation
#[derive(Debug, sqlx::FromRow)]
pub struct StatsRow {
    pub rating: i32,
    pub disputed: bool,
    pub resolution_status: Option<ResolutionStatus>,
}

/// Aggregate feedback statistics for a user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    pub average: f64,
    pub open_disputes: i64,
}

impl FeedbackStats {
    pub fn from_rows(rows: &[StatsRow]) -> Self {
        let total = rows.len() as i64;
        let positive = rows
            .iter()
            .filter(|r| classify(r.rating) == RatingClass::Positive)
            .count() as i64;
        let neutral = rows
            .iter()
            .filter(|r| classify(r.rating) == RatingClass::Neutral)
            .count() as i64;
        let negative = rows
            .iter()
            .filter(|r| classify(r.rating) == RatingClass::Negative)
            .count() as i64;
        let average = if rows.is_empty() {
            0.0
        } else {
            let sum: i64 = rows.iter().map(|r| i64::from(r.rating)).sum();
            // mean rounded to one decimal
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        };
        let open_disputes = rows
            .iter()
            .filter(|r| r.disputed && r.resolution_status.is_none())
            .count() as i64;

        Self {
            total,
            positive,
            neutral,
            negative,
            average,
            open_disputes,
        }
    }

    /// Lightweight variant rendered on compact profile summaries.
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            total: self.total,
            positive: self.positive,
            neutral: self.neutral,
            negative: self.negative,
            average: self.average,
        }
    }
}

/// Stats without the open-dispute count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    pub average: f64,
}

// ===== Request payloads =====

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 1000, message = "comment must be at most 1000 characters"))]
    pub comment: Option<String>,
    #[validate(length(min = 1, message = "ticket number is required"))]
    pub ticket_number: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DisputeRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub status: String,
}

// ===== Response payloads =====

/// Author info joined onto a feedback payload
#[derive(Debug, Clone, Serialize)]
pub struct AuthorInfo {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

/// Feedback shaped for the current viewer. The `can*` flags mirror the
/// server-side authorization checks so clients never re-derive them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub author: Option<AuthorInfo>,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_dispute: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedbackResponse {
    pub feedbacks: Vec<FeedbackView>,
    pub stats: FeedbackStats,
    pub can_leave_feedback: bool,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: FeedbackView,
}
