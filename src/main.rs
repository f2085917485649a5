use fast_zero::{
    create_router, AppConfig, AppState, CredentialVerifier, InMemoryTodoRepository,
    InMemoryUserRepository, PostgresTodoRepository, PostgresUserRepository, SystemClock,
    TodoRepository, TokenService, UserRepository,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn TodoRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fast_zero=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting fast_zero todo API");

    let config = AppConfig::from_env()?;
    info!(token = ?config.token, "Loaded configuration");

    // Postgres when DATABASE_URL is set, otherwise everything lives in memory
    let (user_repository, todo_repository): Repositories = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            info!("Connected to PostgreSQL");
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresTodoRepository::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set, using in-memory storage");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryTodoRepository::new()),
            )
        }
    };

    let token_service = Arc::new(TokenService::new(
        config.token.clone(),
        Arc::new(SystemClock::new()),
    ));
    let app_state = AppState::new(
        user_repository,
        todo_repository,
        token_service,
        Arc::new(CredentialVerifier::new()),
    );

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server running on http://{}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
