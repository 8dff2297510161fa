use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use members_api::config::Config;
use members_api::{AppState, AppStateInner, admin, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "members=debug,members_api=debug,members_db=info,tower_http=debug".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            eprintln!("       Set MEMBERS_SESSION_SECRET in your .env file, or MEMBERS_DEV_MODE=1 for local runs.");
            std::process::exit(1);
        }
    };
    if config.dev_mode {
        warn!("Dev mode: session cookies are not marked Secure");
    }

    // Init database
    let db = members_db::Database::open(&config.db_path)?;
    if !config.admin_emails.is_empty() {
        let promoted = admin::promote_admins(&db, &config.admin_emails)?;
        info!("Admin bootstrap promoted {} account(s)", promoted);
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state: AppState = Arc::new(AppStateInner { db, config });

    let app = router(state).layer(TraceLayer::new_for_http());

    info!("Members Only listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
