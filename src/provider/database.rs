use std::sync::Arc;

use tracing::info;

use crate::{
    configuration::Config,
    dao::{EntityStore, MemoryStore, PgStore},
    error::Error,
    helpers::Store_Backend,
    migration::run_migrations,
    model::{
        Active_Staker, Block, Burned, Contract_Updated, DET_Holder,
        Daily_DET_Price, Debt_Snapshot, Fees_Claimed,
        Fifteen_Minute_DET_Price, Global_Metadata, Issued, Issuer,
        Latest_Rate, Position_Aggregate, Position_Changed, Rate_Update,
        Rates_Updated, Reward_Escrow_Holder, Synth_Holder, Table,
        Total_Active_Staker, Total_Daily_Active_Staker, Trade, Transfer,
        Vested,
    },
};

pub struct DatabasePool {
    pub transfer: Table<Transfer>,
    pub issued: Table<Issued>,
    pub burned: Table<Burned>,
    pub fees_claimed: Table<Fees_Claimed>,
    pub contract_updated: Table<Contract_Updated>,
    pub vested: Table<Vested>,
    pub rates_updated: Table<Rates_Updated>,
    pub position_changed: Table<Position_Changed>,
    pub trade: Table<Trade>,
    pub det_holder: Table<DET_Holder>,
    pub debt_snapshot: Table<Debt_Snapshot>,
    pub synth_holder: Table<Synth_Holder>,
    pub reward_escrow_holder: Table<Reward_Escrow_Holder>,
    pub issuer: Table<Issuer>,
    pub global_metadata: Table<Global_Metadata>,
    pub active_staker: Table<Active_Staker>,
    pub total_active_staker: Table<Total_Active_Staker>,
    pub total_daily_active_staker: Table<Total_Daily_Active_Staker>,
    pub rate_update: Table<Rate_Update>,
    pub latest_rate: Table<Latest_Rate>,
    pub daily_det_price: Table<Daily_DET_Price>,
    pub fifteen_minute_det_price: Table<Fifteen_Minute_DET_Price>,
    pub position_aggregate: Table<Position_Aggregate>,
    pub block: Table<Block>,
}

impl DatabasePool {
    pub fn new(store: Arc<dyn EntityStore>) -> DatabasePool {
        DatabasePool {
            transfer: Table::new(store.clone()),
            issued: Table::new(store.clone()),
            burned: Table::new(store.clone()),
            fees_claimed: Table::new(store.clone()),
            contract_updated: Table::new(store.clone()),
            vested: Table::new(store.clone()),
            rates_updated: Table::new(store.clone()),
            position_changed: Table::new(store.clone()),
            trade: Table::new(store.clone()),
            det_holder: Table::new(store.clone()),
            debt_snapshot: Table::new(store.clone()),
            synth_holder: Table::new(store.clone()),
            reward_escrow_holder: Table::new(store.clone()),
            issuer: Table::new(store.clone()),
            global_metadata: Table::new(store.clone()),
            active_staker: Table::new(store.clone()),
            total_active_staker: Table::new(store.clone()),
            total_daily_active_staker: Table::new(store.clone()),
            rate_update: Table::new(store.clone()),
            latest_rate: Table::new(store.clone()),
            daily_det_price: Table::new(store.clone()),
            fifteen_minute_det_price: Table::new(store.clone()),
            position_aggregate: Table::new(store.clone()),
            block: Table::new(store),
        }
    }

    /// Opens the configured backend; Postgres schemas are migrated first.
    pub async fn connect(config: &Config) -> Result<DatabasePool, Error> {
        let store: Arc<dyn EntityStore> = match config.store_backend {
            Store_Backend::Postgres => {
                run_migrations(&config.database_url).await?;
                Arc::new(PgStore::new(config).await?)
            },
            Store_Backend::Memory => Arc::new(MemoryStore::new()),
        };

        info!("Entity store backend: {}", store.backend());

        Ok(DatabasePool::new(store))
    }
}
