//! Supabase (GoTrue) identity client.
//!
//! Sign-in is the standard two-step PKCE flow: build an authorize URL the
//! user visits, then exchange the returned code (plus the verifier) for
//! session tokens. Session lookup is a single `GET /auth/v1/user` with the
//! caller's bearer token.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{IdentityProvider, Session, SessionTokens, display_name_from_email};
use crate::error::AppError;

/// An identity provider backed by a Supabase project's auth endpoints.
pub struct SupabaseIdentity {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseIdentity {
    /// `base_url` is the project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            client,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn session_from_user(user: UserResponse) -> Session {
        let display_name = user
            .user_metadata
            .and_then(|meta| meta.full_name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                user.email
                    .as_deref()
                    .map(display_name_from_email)
                    .unwrap_or_else(|| "User".to_string())
            });

        Session {
            user_id: user.id,
            display_name,
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    async fn current_session(&self, access_token: &str) -> Result<Option<Session>, AppError> {
        let resp = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // Rejected tokens mean "nobody is signed in", not a failure.
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED
            || resp.status() == reqwest::StatusCode::FORBIDDEN
        {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Supabase auth error ({status}): {text}"
            )));
        }

        let user: UserResponse = resp.json().await?;
        Ok(Some(Self::session_from_user(user)))
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> (String, String) {
        let pkce = generate_pkce();

        let params = [
            ("provider", provider),
            ("redirect_to", redirect_to),
            ("code_challenge", &pkce.challenge),
            ("code_challenge_method", "s256"),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoded(v)))
            .collect::<Vec<_>>()
            .join("&");

        let url = format!("{}?{}", self.auth_url("authorize"), query);
        (url, pkce.verifier)
    }

    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<SessionTokens, AppError> {
        let body = serde_json::json!({
            "auth_code": code,
            "code_verifier": verifier,
        });

        let resp = self
            .client
            .post(format!("{}?grant_type=pkce", self.auth_url("token")))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "token exchange failed ({status}): {text}"
            )));
        }

        let data: TokenResponse = resp.json().await?;
        Ok(SessionTokens {
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            expires_in: data.expires_in,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let resp = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "sign-out failed ({status}): {text}"
            )));
        }

        Ok(())
    }
}

/// PKCE verifier and challenge pair.
struct Pkce {
    verifier: String,
    challenge: String,
}

/// Generate a PKCE code verifier and S256 challenge.
fn generate_pkce() -> Pkce {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    let verifier = URL_SAFE_NO_PAD.encode(bytes);

    let hash = Sha256::digest(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hash);

    Pkce {
        verifier,
        challenge,
    }
}

/// Minimal URL encoding for query parameters.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

// --- API types ---

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    user_metadata: Option<UserMetadata>,
}

#[derive(Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}
