//! Deald Feedback Service
//!
//! Per-ticket feedback for the Deald forum marketplace: members rate each
//! other per transaction, recipients may dispute a rating once, and
//! administrators resolve disputes with a binary verdict.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod error;
pub mod feedback_service;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod notify;
pub mod routes;
