use taskearn::{ Config, Result };
use tower_http::{ cors::CorsLayer, trace::TraceLayer };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "taskearn=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| taskearn::AppError::Config(e.to_string()))?;

    tracing::info!(
        "Starting taskearn: min withdraw {}, {} tasks/day, {}s between claims, {} day lock",
        config.rules.min_withdraw_amount,
        config.rules.max_tasks_per_day,
        config.rules.task_rate_limit_seconds,
        config.rules.lock_period_days
    );

    // Connect and run migrations
    let db = taskearn::db::connect(&config.database_url).await?;

    tracing::info!("Database connected and migrated");

    let app_state = taskearn::api::AppState::new(db, config.rules, &config.admin_token);

    let app = taskearn::api
        ::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener
        ::bind(&addr).await
        .map_err(|e| taskearn::AppError::Internal(e.to_string()))?;

    axum::serve(listener, app).await.map_err(|e| taskearn::AppError::Internal(e.to_string()))?;

    Ok(())
}
