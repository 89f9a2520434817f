//! Fixtures shared by the unit tests: an in-memory store and a ledger that
//! answers from a fixed table.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::{
    configuration::{parse_selectors, AppState, Config, State},
    dao::MemoryStore,
    error::Error,
    helpers::Store_Backend,
    provider::{DatabasePool, Ledger, LedgerCall, LedgerValue, Read},
    types::{Event_Envelope, Event_Kind},
};

pub const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub const BOB: &str = "0x0000000000000000000000000000000000000b0b";
pub const TOKEN: &str = "0x0000000000000000000000000000000000007070";
pub const RESOLVER: &str = "0x0000000000000000000000000000000000005e50";
pub const STATE: &str = "0x000000000000000000000000000000000000057a";

/// Calls missing from the table revert.
#[derive(Debug, Default)]
pub struct StaticLedger {
    values: HashMap<LedgerCall, LedgerValue>,
}

impl StaticLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, call: LedgerCall, value: LedgerValue) -> Self {
        self.values.insert(call, value);
        self
    }
}

#[async_trait]
impl Ledger for StaticLedger {
    async fn call(
        &self,
        call: &LedgerCall,
        _block: i64,
    ) -> Result<Read<LedgerValue>, Error> {
        match self.values.get(call) {
            Some(value) => Ok(Read::Value(value.clone())),
            None => Ok(Read::Reverted),
        }
    }
}

/// Everything a full holder snapshot of `account` on `TOKEN` reads.
pub fn holder_ledger(account: &str, balance: i64) -> StaticLedger {
    StaticLedger::new()
        .with(
            LedgerCall::BalanceOf {
                contract: String::from(TOKEN),
                account: account.to_owned(),
            },
            LedgerValue::Uint(BigDecimal::from(balance)),
        )
        .with(
            LedgerCall::Collateral {
                contract: String::from(TOKEN),
                account: account.to_owned(),
            },
            LedgerValue::Uint(BigDecimal::from(120)),
        )
        .with(
            LedgerCall::Resolver {
                contract: String::from(TOKEN),
            },
            LedgerValue::Address(String::from(RESOLVER)),
        )
        .with(
            LedgerCall::GetAddress {
                contract: String::from(RESOLVER),
                name: String::from("dTradeState"),
            },
            LedgerValue::Address(String::from(STATE)),
        )
        .with(
            LedgerCall::IssuanceData {
                contract: String::from(STATE),
                account: account.to_owned(),
            },
            LedgerValue::IssuanceData {
                initial_debt_ownership: BigDecimal::from(7),
                debt_entry_index: BigDecimal::from(3),
            },
        )
        .with(
            LedgerCall::DebtLedger {
                contract: String::from(STATE),
                index: String::from("3"),
            },
            LedgerValue::Uint(BigDecimal::from(99)),
        )
}

pub fn config() -> Config {
    Config {
        store_backend: Store_Backend::Memory,
        database_url: String::new(),
        max_connections: 1,
        rpc_url: String::from("http://localhost:8545"),
        timeout: 5,
        events_source: String::from("-"),
        excluded_accounts: HashSet::from([
            String::from("0x971e78e0c92392a4e39099835cf7e6ab535b2227"),
            String::from("0xb671f2210b1f6621a2607ea63e6b2dc3e2464d1f"),
        ]),
        issue_selectors: parse_selectors(String::from(
            "(0xaf086c7e,issueMaxSynths),(0xe8e09b8b,issueSynthsOnBehalf)",
        ))
        .unwrap(),
        burn_selectors: parse_selectors(String::from(
            "(0x295da87d,burnSynths),(0x9741fb22,burnSynthsToTarget)",
        ))
        .unwrap(),
        stable_currencies: vec![String::from("dUSD"), String::from("nUSD")],
        price_currency: String::from("DET"),
        debt_currency: String::from("dUSD"),
        state_contract_name: String::from("dTradeState"),
    }
}

pub fn app_state(ledger: StaticLedger) -> (AppState<State>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let database = DatabasePool::new(store.clone());
    let state = State::new(config(), database, Box::new(ledger));

    (AppState::new(state), store)
}

/// An event sent by `ALICE` to `TOKEN` in block 100 at 1600000000.
pub fn envelope(event: Event_Kind) -> Event_Envelope {
    Event_Envelope {
        address: String::from(TOKEN),
        block_number: 100,
        block_timestamp: 1_600_000_000,
        tx_hash: String::from("0xfeed"),
        tx_from: String::from(ALICE),
        tx_to: Some(String::from(TOKEN)),
        tx_input: String::from("0xaf086c7e"),
        gas_price: String::from("20"),
        log_index: 2,
        event,
    }
}
