use sqlx::{postgres::PgPoolOptions, PgPool};

mod entity;

pub use self::entity::PgStore;

pub type PoolType = PgPool;
pub type PoolOption = PgPoolOptions;
