use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use learnboard_api::auth::GoTrueClient;
use learnboard_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use learnboard_api::{config, serve, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Parser)]
#[command(name = "learnboard-api")]
#[command(about = "Learnboard API - multi-tenant learning platform backend")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides BIND_HOST)")]
    host: Option<String>,

    #[arg(long, value_enum, env = "LEARNBOARD_STORE", default_value_t = StoreKind::Postgres, help = "Backing store")]
    store: StoreKind,

    #[arg(long, help = "Apply database migrations before serving")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("learnboard_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.bind_host = host;
    }
    tracing::info!("Starting Learnboard API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match args.store {
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
        StoreKind::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if args.migrate || config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Arc::new(PgStore::new(pool))
        }
    };

    if !config.auth_configured() {
        anyhow::bail!("SUPABASE_URL and SUPABASE_ANON_KEY must be set");
    }
    let auth = GoTrueClient::from_config(&config.auth).context("failed to build the auth client")?;
    if let Some(root_domain) = config.root_domain() {
        tracing::info!("Tenant subdomains enabled under {}", root_domain);
    }

    let bind_addr = format!("{}:{}", config.server.bind_host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Learnboard API listening on http://{}", bind_addr);

    serve(listener, AppState::new(config, store, Arc::new(auth))).await?;
    Ok(())
}
