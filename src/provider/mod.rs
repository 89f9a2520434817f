pub use self::{
    database::DatabasePool,
    event::Event,
    ledger::{Contract, Ledger, LedgerCall, LedgerValue, Read},
    rpc::RpcLedger,
};

mod database;
mod event;
mod ledger;
mod rpc;
