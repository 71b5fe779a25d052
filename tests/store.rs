//! Persisted lifecycle tests for the feedback store
//!
//! Each test runs against a fresh managed database with the migrations
//! applied, so the guarded transition statements themselves are exercised,
//! not just the logic around them. Requires DATABASE_URL to point at a
//! Postgres server.

use sqlx::PgPool;
use uuid::Uuid;

use deald_feedback_server::error::ApiError;
use deald_feedback_server::feedback_service::FeedbackService;
use deald_feedback_server::models::{CreateFeedbackRequest, ResolutionStatus};

fn request(ticket: &str, rating: i32) -> CreateFeedbackRequest {
    CreateFeedbackRequest {
        rating,
        comment: Some("smooth deal".to_string()),
        ticket_number: ticket.to_string(),
        role: None,
    }
}

#[sqlx::test]
async fn create_persists_a_fresh_record(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let author = Uuid::new_v4();
    let recipient = Uuid::new_v4();

    let feedback = service
        .create(author, recipient, &request("T-1", 4))
        .await
        .unwrap();

    assert_eq!(feedback.author_id, author);
    assert_eq!(feedback.recipient_id, recipient);
    assert_eq!(feedback.rating, 4);
    assert!(!feedback.disputed);
    assert!(!feedback.was_disputed);
    assert!(feedback.resolution_status.is_none());

    let stored = service.get(feedback.id).await.unwrap().unwrap();
    assert_eq!(stored.id, feedback.id);
}

#[sqlx::test]
async fn duplicate_triple_is_rejected_by_the_unique_index(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let author = Uuid::new_v4();
    let recipient = Uuid::new_v4();

    service
        .create(author, recipient, &request("T-1", 5))
        .await
        .unwrap();

    let duplicate = service
        .create(author, recipient, &request("T-1", 1))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, ApiError::Validation(ref msg) if msg.contains("already")));

    // a different ticket between the same pair is fine
    service
        .create(author, recipient, &request("T-2", 3))
        .await
        .unwrap();
}

#[sqlx::test]
async fn dispute_marks_the_record_without_consuming_the_flag(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let feedback = service
        .create(Uuid::new_v4(), Uuid::new_v4(), &request("T-1", 2))
        .await
        .unwrap();

    let disputed = service
        .dispute(feedback.id, Some("bad item".to_string()))
        .await
        .unwrap();

    assert!(disputed.disputed);
    assert!(!disputed.was_disputed);
    assert_eq!(disputed.dispute_reason.as_deref(), Some("bad item"));
    assert!(disputed.disputed_at.is_some());
}

#[sqlx::test]
async fn dispute_of_an_open_dispute_reports_already_disputed(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let feedback = service
        .create(Uuid::new_v4(), Uuid::new_v4(), &request("T-1", 1))
        .await
        .unwrap();

    service.dispute(feedback.id, None).await.unwrap();

    let again = service
        .dispute(feedback.id, Some("still bad".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(again, ApiError::AlreadyDisputed));

    let missing = service.dispute(Uuid::new_v4(), None).await.unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));
}

#[sqlx::test]
async fn accepting_a_dispute_deletes_the_record(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let feedback = service
        .create(Uuid::new_v4(), Uuid::new_v4(), &request("T-1", 1))
        .await
        .unwrap();
    service.dispute(feedback.id, None).await.unwrap();

    let resolved = service
        .resolve(feedback.id, Uuid::new_v4(), ResolutionStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(resolved.id, feedback.id);

    assert!(service.get(feedback.id).await.unwrap().is_none());
}

#[sqlx::test]
async fn rejecting_a_dispute_finalizes_and_blocks_redispute(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let admin = Uuid::new_v4();
    let feedback = service
        .create(Uuid::new_v4(), Uuid::new_v4(), &request("T-1", 2))
        .await
        .unwrap();
    service.dispute(feedback.id, None).await.unwrap();

    let resolved = service
        .resolve(feedback.id, admin, ResolutionStatus::Rejected)
        .await
        .unwrap();

    assert!(!resolved.disputed);
    assert!(resolved.was_disputed);
    assert_eq!(resolved.resolution_status, Some(ResolutionStatus::Rejected));
    assert_eq!(resolved.resolved_by_id, Some(admin));
    assert!(resolved.resolved_at.is_some());

    // the one dispute is consumed for good
    let again = service.dispute(feedback.id, None).await.unwrap_err();
    assert!(matches!(again, ApiError::AlreadyDisputed));

    let stored = service.get(feedback.id).await.unwrap().unwrap();
    assert!(!stored.disputed);
    assert!(stored.was_disputed);
}

#[sqlx::test]
async fn resolving_an_undisputed_record_is_rejected(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let feedback = service
        .create(Uuid::new_v4(), Uuid::new_v4(), &request("T-1", 3))
        .await
        .unwrap();

    let error = service
        .resolve(feedback.id, Uuid::new_v4(), ResolutionStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(error, ApiError::Validation(ref msg) if msg.contains("not under dispute")));

    let error = service
        .resolve(feedback.id, Uuid::new_v4(), ResolutionStatus::Accepted)
        .await
        .unwrap_err();
    assert!(matches!(error, ApiError::Validation(_)));

    // the record is untouched either way
    let stored = service.get(feedback.id).await.unwrap().unwrap();
    assert!(!stored.disputed);
    assert!(!stored.was_disputed);
    assert!(stored.resolution_status.is_none());
}

#[sqlx::test]
async fn delete_removes_the_record(pool: PgPool) {
    let service = FeedbackService::new(pool);
    let feedback = service
        .create(Uuid::new_v4(), Uuid::new_v4(), &request("T-1", 5))
        .await
        .unwrap();

    service.delete(feedback.id).await.unwrap();
    assert!(service.get(feedback.id).await.unwrap().is_none());

    let missing = service.delete(feedback.id).await.unwrap_err();
    assert!(matches!(missing, ApiError::NotFound(_)));
}
