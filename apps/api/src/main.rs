use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;
mod seed;

use doctor_cell::{AvailabilityStore, InMemoryAvailabilityStore};
use shared_config::AppConfig;
use shared_database::{ProfileStore, SupabaseProfileStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic booking API server");

    let config = Arc::new(AppConfig::from_env());

    let profiles: Arc<dyn ProfileStore>;
    let availability: Arc<dyn AvailabilityStore>;
    if config.uses_remote_profiles() {
        info!("Reading profiles from {}", config.supabase_url);
        profiles = Arc::new(SupabaseProfileStore::new(&config));
        availability = Arc::new(InMemoryAvailabilityStore::new());
    } else {
        warn!("Supabase not configured, serving demo profiles from memory");
        let (demo_profiles, demo_availability) = seed::demo_stores()
            .await
            .context("failed to seed demo data")?;
        profiles = demo_profiles;
        availability = demo_availability;
    }

    if config.enforce_availability {
        info!("Bookings must fall inside declared availability");
    }

    let (doctors, appointments) = router::build_states(config.clone(), profiles, availability);

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(doctors, appointments)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
