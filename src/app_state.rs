//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::JwtKeys;
use crate::feedback_service::FeedbackService;
use crate::identity::IdentityResolver;
use crate::notify::PrivateMessenger;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub feedback_service: Arc<FeedbackService>,
    pub identity: Arc<dyn IdentityResolver>,
    pub messenger: Arc<dyn PrivateMessenger>,
    pub jwt_keys: JwtKeys,
}

impl AppState {
    pub fn new(
        feedback_service: Arc<FeedbackService>,
        identity: Arc<dyn IdentityResolver>,
        messenger: Arc<dyn PrivateMessenger>,
        jwt_keys: JwtKeys,
    ) -> Self {
        Self {
            feedback_service,
            identity,
            messenger,
            jwt_keys,
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt_keys.clone()
    }
}
