use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use brawn::advice::Advisor;
use brawn::advice::openai::OpenAiAdvisor;
use brawn::auth::IdentityProvider;
use brawn::auth::local::LocalIdentity;
use brawn::auth::supabase::SupabaseIdentity;
use brawn::banner::{BannerInfo, print_banner};
use brawn::config::Config;
use brawn::consts::{DEFAULT_MODEL, default_db_path};
use brawn::events::{Event, EventBus};
use brawn::leaderboard::Leaderboard;
use brawn::leaderboard::sqlite::SqliteLeaderboard;
use brawn::leaderboard::supabase::SupabaseLeaderboard;
use brawn::server::{AppState, build_router};

#[derive(Debug, Clone, PartialEq, ValueEnum)]
enum Store {
    /// Supabase when configured, otherwise the local SQLite store
    Auto,
    Supabase,
    Sqlite,
}

#[derive(Parser)]
#[command(
    name = "brawn",
    version,
    about = "Bodybuilding advice and a protein factory, served over HTTP."
)]
struct Cli {
    /// Port to bind (overrides BRAWN_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Leaderboard store backend
    #[arg(short, long, value_enum, default_value_t = Store::Auto)]
    store: Store,

    /// SQLite database path for the local leaderboard (use :memory: for ephemeral)
    #[arg(long)]
    db: Option<String>,

    /// Chat model for the advice relay
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    // One shared client so every outbound call carries the same timeout.
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .build()
        .context("failed to build HTTP client")?;

    // Advice relay
    let advice_auth = if config.openai_api_key.is_some() {
        "API key ✓"
    } else {
        tracing::warn!("OPENAI_API_KEY not set; advice requests will fail upstream");
        "not configured"
    };
    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let advisor: Arc<dyn Advisor> = Arc::new(OpenAiAdvisor::new(
        cli.model,
        config.openai_api_key.clone().unwrap_or_default(),
        http.clone(),
    ));

    let supabase = config
        .supabase_url
        .clone()
        .zip(config.supabase_anon_key.clone());

    // Leaderboard store
    let use_hosted_store = match cli.store {
        Store::Supabase => {
            if supabase.is_none() {
                anyhow::bail!("--store supabase requires SUPABASE_URL and SUPABASE_ANON_KEY");
            }
            true
        }
        Store::Sqlite => false,
        Store::Auto => supabase.is_some(),
    };

    let (leaderboard, store_label): (Arc<dyn Leaderboard>, String) = if use_hosted_store {
        let (url, key) = supabase.clone().expect("checked above");
        (
            Arc::new(SupabaseLeaderboard::new(url.clone(), key, http.clone())),
            format!("supabase ({url})"),
        )
    } else {
        let path = cli
            .db
            .clone()
            .unwrap_or_else(|| default_db_path().to_string_lossy().into_owned());
        if path != ":memory:"
            && let Some(parent) = Path::new(&path).parent()
        {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
        let label = if path == ":memory:" {
            "sqlite (ephemeral)".to_string()
        } else {
            format!("sqlite ({path})")
        };
        let store = SqliteLeaderboard::open(&path)
            .with_context(|| format!("failed to open leaderboard database at {path}"))?;
        (Arc::new(store), label)
    };

    // Identity provider
    let (identity, identity_label): (Arc<dyn IdentityProvider>, String) = match &supabase {
        Some((url, key)) => (
            Arc::new(SupabaseIdentity::new(url.clone(), key.clone(), http.clone())),
            format!("supabase ({url})"),
        ),
        None => {
            tracing::warn!("Supabase not configured; using the local development identity");
            (Arc::new(LocalIdentity::new()), "local".to_string())
        }
    };

    // Session changes are observable only through the bus; the operator log
    // is its one standing subscriber.
    let events = Arc::new(EventBus::default());
    let mut session_events = events.subscribe();
    tokio::spawn(async move {
        loop {
            match session_events.recv().await {
                Ok(Event::SessionChanged { session: Some(s) }) => {
                    tracing::info!("session change: {} signed in", s.display_name);
                }
                Ok(Event::SessionChanged { session: None }) => {
                    tracing::info!("session change: signed out");
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let port = cli.port.unwrap_or(config.port);
    let addr = format!("0.0.0.0:{port}");

    print_banner(&BannerInfo {
        addr: &addr,
        model: &model,
        advice_auth,
        store: &store_label,
        identity: &identity_label,
    });

    let state = AppState {
        advisor,
        leaderboard,
        identity,
        events,
    };
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
