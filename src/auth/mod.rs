//! Identity, entirely delegated to an external provider.
//!
//! The app holds no credentials and validates no tokens itself: handlers
//! pass the caller's bearer token to an [`IdentityProvider`] and redraw
//! their response around whatever comes back. Session-change notifications
//! travel over the [`EventBus`](crate::events::EventBus) instead of any
//! ambient global.

pub mod local;
pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An authenticated caller, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
}

/// Tokens handed back after a completed sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: u64,
}

/// Where "who is this" comes from. Could be Supabase or a local stub.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to a session. An invalid or expired token is
    /// no session, not an error.
    async fn current_session(&self, access_token: &str) -> Result<Option<Session>, AppError>;

    /// Begin a provider sign-in.
    /// Returns (url, verifier) — the caller must keep the verifier and
    /// present it back at [`exchange_code`](Self::exchange_code).
    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> (String, String);

    /// Exchange an authorization code for session tokens.
    async fn exchange_code(&self, code: &str, verifier: &str)
    -> Result<SessionTokens, AppError>;

    /// Invalidate the caller's session with the provider.
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;
}

/// Display name from a signup email: the local part, or `User` when there
/// is nothing usable in front of the `@`.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default().trim();
    if local.is_empty() {
        "User".to_string()
    } else {
        local.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_takes_local_part() {
        assert_eq!(display_name_from_email("ronnie@example.com"), "ronnie");
    }

    #[test]
    fn display_name_without_at_sign_is_kept() {
        assert_eq!(display_name_from_email("ronnie"), "ronnie");
    }

    #[test]
    fn empty_email_falls_back_to_user() {
        assert_eq!(display_name_from_email(""), "User");
        assert_eq!(display_name_from_email("@example.com"), "User");
    }
}
