use interaction_analyzer::{AppConfig, create_app};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// LOG_FORMAT=pretty for development, JSON lines otherwise.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "interaction_analyzer=debug,interaction_flow=debug,tower_http=info".into()
    });

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine, the environment may already be set
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(e) = dotenv {
        info!("no .env file loaded: {}", e);
    }

    let config = AppConfig::from_env();
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY not set; reports need a key entered in the form");
    }

    let app = create_app(&config)?;
    let listener = TcpListener::bind((config.bind_addr.as_str(), config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Drug-Protein Interaction Analyzer starting on {}", addr);
    info!("Form available at http://{}/", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Analysis endpoint: POST http://{}/api/analyze", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
