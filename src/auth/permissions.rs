//! Per-operation authorization predicates
//!
//! These are the single source of truth for who may do what; the `can*`
//! flags in response payloads come from the same functions the mutation
//! handlers check.

use super::extract::AuthUser;
use crate::identity::UserRecord;
use crate::models::Feedback;

/// Admins and the feedback author may edit.
pub fn can_edit(viewer: Option<&AuthUser>, feedback: &Feedback) -> bool {
    matches!(viewer, Some(v) if v.is_admin || v.id == feedback.author_id)
}

/// Admins and the feedback author may delete.
pub fn can_delete(viewer: Option<&AuthUser>, feedback: &Feedback) -> bool {
    matches!(viewer, Some(v) if v.is_admin || v.id == feedback.author_id)
}

/// Only the recipient may dispute, and only while the record has never
/// been through a dispute and has none open.
pub fn can_dispute(viewer: Option<&AuthUser>, feedback: &Feedback) -> bool {
    matches!(viewer, Some(v) if v.id == feedback.recipient_id)
        && !feedback.was_disputed
        && !feedback.disputed
}

/// Authenticated actors may leave feedback for anyone but themselves and
/// administrators.
pub fn can_leave_feedback(viewer: Option<&AuthUser>, target: &UserRecord) -> bool {
    matches!(viewer, Some(v) if v.id != target.id) && !target.is_admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedbackRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(id: Uuid, is_admin: bool) -> AuthUser {
        AuthUser {
            id,
            username: "someone".to_string(),
            is_admin,
        }
    }

    fn feedback(author_id: Uuid, recipient_id: Uuid) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            author_id,
            recipient_id,
            rating: 5,
            comment: None,
            ticket_number: "T-1".to_string(),
            role: FeedbackRole::Buyer,
            disputed: false,
            dispute_reason: None,
            disputed_at: None,
            resolved_by_id: None,
            resolved_at: None,
            resolution_status: None,
            was_disputed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn delete_allowed_for_author_and_admin_only() {
        let author = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let f = feedback(author, recipient);

        assert!(can_delete(Some(&user(author, false)), &f));
        assert!(can_delete(Some(&user(Uuid::new_v4(), true)), &f));
        assert!(!can_delete(Some(&user(recipient, false)), &f));
        assert!(!can_delete(Some(&user(Uuid::new_v4(), false)), &f));
        assert!(!can_delete(None, &f));
    }

    #[test]
    fn dispute_allowed_for_recipient_of_fresh_record_only() {
        let author = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let f = feedback(author, recipient);

        assert!(can_dispute(Some(&user(recipient, false)), &f));
        assert!(!can_dispute(Some(&user(author, false)), &f));
        // admin status does not grant dispute rights
        assert!(!can_dispute(Some(&user(Uuid::new_v4(), true)), &f));
        assert!(!can_dispute(None, &f));
    }

    #[test]
    fn dispute_blocked_once_open_or_consumed() {
        let recipient = Uuid::new_v4();

        let mut open = feedback(Uuid::new_v4(), recipient);
        open.disputed = true;
        assert!(!can_dispute(Some(&user(recipient, false)), &open));

        let mut consumed = feedback(Uuid::new_v4(), recipient);
        consumed.was_disputed = true;
        assert!(!can_dispute(Some(&user(recipient, false)), &consumed));
    }

    #[test]
    fn leaving_feedback_blocked_for_self_admins_and_anonymous() {
        let target = UserRecord {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
            avatar: None,
            is_admin: false,
        };

        assert!(can_leave_feedback(Some(&user(Uuid::new_v4(), false)), &target));
        assert!(!can_leave_feedback(Some(&user(target.id, false)), &target));
        assert!(!can_leave_feedback(None, &target));

        let admin_target = UserRecord {
            is_admin: true,
            ..target.clone()
        };
        assert!(!can_leave_feedback(Some(&user(Uuid::new_v4(), false)), &admin_target));
    }
}
