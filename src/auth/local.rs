//! A local identity for development runs and tests.
//!
//! Any bearer token resolves to the configured session; sign-in and
//! sign-out are no-ops that hand back fixed values. Useful when Supabase
//! is not configured and for driving the router in tests.

use async_trait::async_trait;

use super::{IdentityProvider, Session, SessionTokens};
use crate::error::AppError;

pub struct LocalIdentity {
    session: Option<Session>,
}

impl LocalIdentity {
    /// The default local user.
    pub fn new() -> Self {
        Self::signed_in("local-user", "Local User")
    }

    pub fn signed_in(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            session: Some(Session {
                user_id: user_id.into(),
                display_name: display_name.into(),
            }),
        }
    }

    /// Resolves every token to no session.
    pub fn anonymous() -> Self {
        Self { session: None }
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn current_session(&self, _access_token: &str) -> Result<Option<Session>, AppError> {
        Ok(self.session.clone())
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> (String, String) {
        (
            format!("local://signin/{provider}?redirect_to={redirect_to}"),
            "local-verifier".to_string(),
        )
    }

    async fn exchange_code(
        &self,
        _code: &str,
        _verifier: &str,
    ) -> Result<SessionTokens, AppError> {
        Ok(SessionTokens {
            access_token: "local-token".to_string(),
            refresh_token: "local-refresh".to_string(),
            expires_in: 3600,
        })
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AppError> {
        Ok(())
    }
}
