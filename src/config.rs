//! Environment-driven configuration.
//!
//! The only hard secret is `OPENAI_API_KEY`, supplied out-of-band. Supabase
//! settings are optional; without them the server falls back to the local
//! store and identity. Missing or malformed values are logged and replaced
//! with defaults rather than aborting startup.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::consts::DEFAULT_PORT;

/// Default bound on any single outbound request, in seconds.
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

pub struct Config {
    pub port: u16,
    pub openai_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    /// Bound on any single call to an external service. A hung upstream
    /// holds one request open for at most this long.
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: resolve_port(env::var("BRAWN_PORT").ok().as_deref()),
            openai_api_key: secret(env::var("OPENAI_API_KEY").ok()),
            supabase_url: secret(env::var("SUPABASE_URL").ok()),
            supabase_anon_key: secret(env::var("SUPABASE_ANON_KEY").ok()),
            upstream_timeout: Duration::from_secs(resolve_timeout_secs(
                env::var("BRAWN_UPSTREAM_TIMEOUT_SECS").ok().as_deref(),
            )),
        }
    }
}

/// Treat empty or whitespace-only values as unset.
fn secret(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn resolve_port(raw: Option<&str>) -> u16 {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.parse().unwrap_or_else(|e| {
            warn!("invalid BRAWN_PORT {value:?}: {e}, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
        _ => DEFAULT_PORT,
    }
}

fn resolve_timeout_secs(raw: Option<&str>) -> u64 {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.parse().unwrap_or_else(|e| {
            warn!(
                "invalid BRAWN_UPSTREAM_TIMEOUT_SECS {value:?}: {e}, using {DEFAULT_UPSTREAM_TIMEOUT_SECS}"
            );
            DEFAULT_UPSTREAM_TIMEOUT_SECS
        }),
        _ => DEFAULT_UPSTREAM_TIMEOUT_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_unset() {
        assert_eq!(resolve_port(None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("")), DEFAULT_PORT);
    }

    #[test]
    fn port_parses_override() {
        assert_eq!(resolve_port(Some("3000")), 3000);
        assert_eq!(resolve_port(Some("  9090  ")), 9090);
    }

    #[test]
    fn port_falls_back_on_garbage() {
        assert_eq!(resolve_port(Some("not-a-port")), DEFAULT_PORT);
    }

    #[test]
    fn timeout_defaults_when_unset() {
        assert_eq!(resolve_timeout_secs(None), DEFAULT_UPSTREAM_TIMEOUT_SECS);
    }

    #[test]
    fn timeout_parses_override() {
        assert_eq!(resolve_timeout_secs(Some("5")), 5);
    }

    #[test]
    fn secret_filters_blank_values() {
        assert_eq!(secret(None), None);
        assert_eq!(secret(Some("".to_string())), None);
        assert_eq!(secret(Some("   ".to_string())), None);
        assert_eq!(secret(Some(" sk-test ".to_string())), Some("sk-test".to_string()));
    }
}
