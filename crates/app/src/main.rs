use std::{sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect(&settings.server.database).await?;
    let engine = Arc::new(engine::Engine::builder().database(db).build().await?);

    let auth = server::AuthSettings::from(&settings.auth);
    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let server_engine = Arc::clone(&engine);
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(server_engine, auth, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    if let Some(minutes) = settings.auth.purge_interval_minutes {
        let purge_engine = Arc::clone(&engine);
        tasks.spawn(async move {
            tracing::info!("purging revoked tokens every {minutes} minutes");
            let mut interval = tokio::time::interval(Duration::from_secs(minutes * 60));
            loop {
                interval.tick().await;
                if let Err(err) = purge_engine.purge_revoked_tokens(chrono::Utc::now()).await {
                    tracing::error!("failed to purge revoked tokens: {err}");
                }
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn connect(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
