use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;

use super::{PoolOption, PoolType};
use crate::{configuration::Config, dao::EntityStore, error::Error};

/// Postgres backend: every entity kind shares the `"Entity"` table, keyed by
/// `("entity", "id")`, with the document kept as JSONB.
#[derive(Debug)]
pub struct PgStore {
    pub pool: PoolType,
}

impl PgStore {
    pub async fn new(config: &Config) -> Result<PgStore, Error> {
        let pool = PoolOption::new()
            .after_connect(|_conn, _meta| Box::pin(async move { Ok(()) }))
            .max_connections(config.max_connections)
            .connect(config.database_url.as_str())
            .await?;

        Ok(PgStore { pool })
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn get(&self, entity: &str, id: &str) -> Result<Option<Value>, Error> {
        let row: Option<(Json<Value>,)> = sqlx::query_as(
            r#"
            SELECT "data" FROM "Entity" WHERE "entity" = $1 AND "id" = $2
            "#,
        )
        .bind(entity)
        .bind(id)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(data),)| data))
    }

    async fn upsert(
        &self,
        entity: &str,
        id: &str,
        data: Value,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO "Entity" ("entity", "id", "data", "updated_at")
            VALUES($1, $2, $3, now())
            ON CONFLICT ("entity", "id") DO UPDATE SET
                "data" = EXCLUDED."data",
                "updated_at" = EXCLUDED."updated_at"
            "#,
        )
        .bind(entity)
        .bind(id)
        .bind(Json(data))
        .persistent(true)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, entity: &str, id: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            DELETE FROM "Entity" WHERE "entity" = $1 AND "id" = $2
            "#,
        )
        .bind(entity)
        .bind(id)
        .persistent(true)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count(&self, entity: &str) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(1) FROM "Entity" WHERE "entity" = $1
            "#,
        )
        .bind(entity)
        .persistent(true)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
