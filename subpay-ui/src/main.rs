//! SubPay UI server - JSON API over the session store plus the static SPA.

mod routes;
mod simulate;
mod sse;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use subpay::flows::FlowContext;
use subpay::io::config::load_config;
use subpay::io::seed_store::initial_state;
use subpay::store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "subpay-ui")]
#[command(about = "Web API and UI host for the SubPay demo")]
struct Args {
    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Demo config file (TOML). Missing file means defaults.
    #[arg(long, default_value = "subpay.toml")]
    config: PathBuf,

    /// Directory containing UI static files (defaults to ./ui/dist)
    #[arg(long)]
    ui_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("subpay_ui=info".parse()?)
                .add_directive("subpay=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = load_config(&args.config)?;
    let initial = initial_state(&config).context("load initial state")?;
    info!(
        config = %args.config.display(),
        plans = initial.plans.len(),
        demo_mode = initial.demo_mode,
        "starting subpay-ui"
    );

    let state = AppState::new(Store::new(initial), FlowContext::system(config));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .nest("/api", routes::api_router())
        .route("/events", get(sse::events_handler))
        .layer(cors)
        .with_state(state);

    let ui_dir = args
        .ui_dir
        .unwrap_or_else(|| PathBuf::from("ui").join("dist"));

    if ui_dir.exists() {
        info!(ui_dir = %ui_dir.display(), "serving static UI files");
        // Screen routes like /app/sub/{id} are resolved client-side.
        let index = ServeFile::new(ui_dir.join("index.html"));
        app = app.fallback_service(
            ServeDir::new(&ui_dir)
                .append_index_html_on_directories(true)
                .not_found_service(index),
        );
    } else {
        info!(ui_dir = %ui_dir.display(), "UI directory not found, API-only mode");
    }

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
