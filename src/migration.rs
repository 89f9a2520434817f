//! Schema of the entity store.
//!
//! Every entity kind lives in the single `"Entity"` JSONB table, so a new
//! version under `migrations/` is only needed when that table or its indexes
//! change. Applied versions are tracked by refinery in
//! `refinery_schema_history`.

use refinery::{embed_migrations, Report};
use tokio_postgres::{Client, NoTls};
use tracing::{error, info};

use crate::error::Error;

embed_migrations!("migrations");

/// Highest schema version compiled into this binary.
pub fn schema_version() -> u32 {
    migrations::runner()
        .get_migrations()
        .iter()
        .map(|migration| migration.version())
        .max()
        .unwrap_or_default()
}

async fn connect(database_url: &str) -> Result<Client, Error> {
    let config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e| Error::Migration(format!("invalid database URL: {}", e)))?;

    let (client, connection) = config
        .connect(NoTls)
        .await
        .map_err(|e| Error::Migration(format!("connect failed: {}", e)))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("Migration connection error: {}", e);
        }
    });

    Ok(client)
}

/// Brings the entity store up to [`schema_version`] and returns the versions
/// applied by this call.
pub async fn run_migrations(database_url: &str) -> Result<Vec<u32>, Error> {
    let mut client = connect(database_url).await?;
    let report = migrations::runner()
        .run_async(&mut client)
        .await
        .map_err(|e| Error::Migration(e.to_string()))?;

    let applied = applied_versions(&report);
    if applied.is_empty() {
        info!("Entity store already at schema V{:03}", schema_version());
    } else {
        info!(
            "Entity store migrated to schema V{:03} ({} applied)",
            schema_version(),
            applied.len()
        );
    }

    Ok(applied)
}

fn applied_versions(report: &Report) -> Vec<u32> {
    report
        .applied_migrations()
        .iter()
        .map(|migration| {
            info!("Applied V{:03}__{}", migration.version(), migration.name());
            migration.version()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_table_is_embedded() {
        let runner = migrations::runner();
        let migrations = runner.get_migrations();

        assert_eq!(schema_version(), 1);
        assert_eq!(migrations.len(), 1);
        assert_eq!(migrations[0].name(), "entity");
    }
}
