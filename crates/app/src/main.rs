use engine::RecommendedEntry;
use migration::{Migrator, MigratorTrait};
use serde::Deserialize;
use settings::Database;

mod settings;

/// Shape of the reference protocol TOML file.
#[derive(Debug, Deserialize)]
struct ReferenceFile {
    entries: Vec<RecommendedEntry>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "porcile={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let reference = match settings.server.reference_protocol.as_deref() {
        Some(path) => Some(load_reference(path)?),
        None => None,
    };

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(engine, reference, listener).await?;
    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn load_reference(
    path: &str,
) -> Result<Vec<RecommendedEntry>, Box<dyn std::error::Error + Send + Sync>> {
    let raw = std::fs::read_to_string(path)?;
    let file: ReferenceFile = toml::from_str(&raw)?;
    tracing::info!(
        "loaded reference protocol with {} entries from {path}",
        file.entries.len()
    );
    Ok(file.entries)
}
