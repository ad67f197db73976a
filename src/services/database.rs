use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection as SeaOrmDatabaseConnection,
    DbErr, EntityTrait, Schema, Statement,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::entities::prelude::{Category, Contact, Gallery, Image, Setting, Users};

pub type DatabaseConnection = Arc<SeaOrmDatabaseConnection>;

pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(&config.url);

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .max_lifetime(Duration::from_secs(28800))
        .sqlx_logging(false);

    info!(
        "Connection pool: min={}, max={}",
        config.min_connections, config.max_connections
    );

    let db = Database::connect(opt).await?;
    let connection = Arc::new(db);

    if let Err(e) = warm_up_connection_pool(&connection).await {
        tracing::warn!("⚠️  Connection pool warm-up failed: {}", e);
    } else {
        info!("Connection pool warmed up");
    }

    Ok(connection)
}

/// Trivial round-trip used by warm-up and the health probe.
pub async fn ping(db: &SeaOrmDatabaseConnection) -> Result<(), DbErr> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_owned());
    db.execute(stmt).await.map(|_| ())
}

async fn warm_up_connection_pool(db: &DatabaseConnection) -> Result<(), DbErr> {
    for i in 1..=3 {
        match ping(db).await {
            Ok(()) => tracing::debug!("Warm-up query {} done", i),
            Err(e) => {
                tracing::warn!("⚠️  Warm-up query {} failed: {}", i, e);
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Creates every table that does not exist yet, parents before children.
pub async fn create_schema(db: &SeaOrmDatabaseConnection) -> Result<(), DbErr> {
    create_table(db, Users).await?;
    create_table(db, Category).await?;
    create_table(db, Gallery).await?;
    create_table(db, Image).await?;
    create_table(db, Contact).await?;
    create_table(db, Setting).await?;
    info!("Database schema is in place");
    Ok(())
}

async fn create_table<E: EntityTrait>(
    db: &SeaOrmDatabaseConnection,
    entity: E,
) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
