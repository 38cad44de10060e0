use axum::{extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, create_app, create_router, health_router, run_health_checks};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_todos::{ApiDoc, ElasticIndex, MongoTodoStore, TodoService, TwilioNotifier, handlers};
use tracing::info;

mod config;

use config::Config;

/// Readiness dependencies shared with the /ready handler
#[derive(Clone)]
struct ReadyState {
    mongo_client: mongodb::Client,
    search: ElasticIndex,
}

async fn ready(State(state): State<ReadyState>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "database",
            Box::pin(async {
                if database::mongodb::check_health(&state.mongo_client).await {
                    Ok(())
                } else {
                    Err("MongoDB ping failed".to_string())
                }
            }),
        ),
        (
            "search",
            Box::pin(async { state.search.ping().await.map_err(|e| e.to_string()) }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok(response) => response.into_response(),
        Err(response) => response.into_response(),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.url());

    // Connect to MongoDB with retry
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    // Get the database
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    // Wire up the domain service with its collaborators
    let store = MongoTodoStore::new(db);
    let search = ElasticIndex::new(config.search.clone())?;
    let notifier = TwilioNotifier::new(config.twilio.clone())?;
    let service = TodoService::new(store, search.clone(), notifier);

    // Build router with API routes
    let api_routes = handlers::router(service);

    // Create a router with OpenAPI docs and common middleware
    let router = create_router::<ApiDoc>(api_routes);

    // Merge health and readiness endpoints
    let ready_state = ReadyState {
        mongo_client,
        search,
    };
    let app = router
        .merge(health_router(config.app))
        .route("/ready", get(ready).with_state(ready_state));

    info!("Starting Todo API");

    create_app(app, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Todo API shutdown complete");
    Ok(())
}
