//! Holder snapshots and the global counters derived from them.

use bigdecimal::{BigDecimal, Zero};
use tracing::{debug, warn};

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{event_id, SINGLETON_ID},
    model::{DET_Holder, Debt_Snapshot, Global_Metadata, Issuer},
    provider::{Contract, Read},
    types::Event_Envelope,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metadata_Field {
    Issuers,
    DET_Holders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holder_Counter {
    Mints,
    Claims,
}

/// Reads the holder's DET position at the event block and stores a snapshot
/// under `{timestamp}-{account}`.
///
/// The previous snapshot is looked up by the bare account id, which never
/// matches the stored key format; the holder counter therefore moves on the
/// first snapshot of every timestamp with a positive balance.
pub async fn track_det_holder(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    det_contract: &str,
    account: &str,
) -> Result<(), Error> {
    let account = account.to_lowercase();
    if app_state.config.is_excluded(&account) {
        debug!("Skipping holder snapshot for system account {}", account);
        return Ok(());
    }

    let ledger = app_state.ledger.as_ref();
    let block = envelope.block_number;
    let holders = &app_state.database.det_holder;
    let existing = holders.get_one(&account).await?;

    let det = Contract::bind(ledger, det_contract, block);
    let (balance_of, collateral) = match (
        det.balance_of(&account).await?,
        det.collateral(&account).await?,
    ) {
        (Read::Value(balance_of), Read::Value(collateral)) => {
            (balance_of, collateral)
        },
        _ => {
            warn!(
                "Holder balance unreadable for {} on {} at block {}, tx {}",
                account, det_contract, block, envelope.tx_hash
            );
            return Ok(());
        },
    };

    let transferable = det.transferable(&account).await?.ok();

    let Read::Value(resolver) = det.resolver().await? else {
        debug!(
            "No resolver on {} at block {}, tx {}",
            det_contract, block, envelope.tx_hash
        );
        return Ok(());
    };

    let state_name = &app_state.config.state_contract_name;
    let Read::Value(state_address) = Contract::bind(ledger, &resolver, block)
        .get_address(state_name)
        .await?
    else {
        debug!(
            "Resolver {} has no {} at block {}",
            resolver, state_name, block
        );
        return Ok(());
    };

    let state = Contract::bind(ledger, &state_address, block);
    let Read::Value((initial_debt_ownership, debt_entry_index)) =
        state.issuance_data(&account).await?
    else {
        debug!(
            "issuanceData reverted for {} at block {}, tx {}",
            account, block, envelope.tx_hash
        );
        return Ok(());
    };

    let debt_entry_at_index = state.debt_ledger(&debt_entry_index).await?.ok();

    let det_holder = DET_Holder {
        id: format!("{}-{}", envelope.block_timestamp, account),
        account: account.to_owned(),
        block,
        timestamp: envelope.block_timestamp,
        balance_of,
        collateral,
        transferable,
        initial_debt_ownership,
        debt_entry_at_index,
        mints: existing.as_ref().and_then(|holder| holder.mints.to_owned()),
        claims: existing.as_ref().and_then(|holder| holder.claims.to_owned()),
    };

    // a snapshot that is already stored has been counted
    if !holders.exists(&det_holder.id).await? {
        let zero = BigDecimal::zero();
        let delta = match &existing {
            None if det_holder.balance_of > zero => 1,
            Some(prev)
                if prev.balance_of.is_zero() && det_holder.balance_of > zero =>
            {
                1
            },
            Some(prev)
                if prev.balance_of > zero && det_holder.balance_of.is_zero() =>
            {
                -1
            },
            _ => 0,
        };

        if delta != 0 {
            update_metadata(app_state, Metadata_Field::DET_Holders, delta)
                .await?;
        }
    }

    holders.upsert(&det_holder).await
}

pub async fn update_metadata(
    app_state: &AppState<State>,
    field: Metadata_Field,
    delta: i64,
) -> Result<(), Error> {
    let table = &app_state.database.global_metadata;
    let mut metadata =
        table
            .get_one(SINGLETON_ID)
            .await?
            .unwrap_or_else(|| Global_Metadata {
                id: String::from(SINGLETON_ID),
                issuers: BigDecimal::zero(),
                det_holders: BigDecimal::zero(),
            });

    match field {
        Metadata_Field::Issuers => metadata.issuers += BigDecimal::from(delta),
        Metadata_Field::DET_Holders => {
            metadata.det_holders += BigDecimal::from(delta)
        },
    }

    table.upsert(&metadata).await
}

/// Every account that ever issued is counted once.
pub async fn track_issuer(
    app_state: &AppState<State>,
    account: &str,
) -> Result<(), Error> {
    let issuers = &app_state.database.issuer;
    if issuers.exists(account).await? {
        return Ok(());
    }

    update_metadata(app_state, Metadata_Field::Issuers, 1).await?;
    issuers
        .upsert(&Issuer {
            id: account.to_owned(),
        })
        .await
}

/// Bumps a counter on the holder stored under the bare account id.
pub async fn increment_holder_counter(
    app_state: &AppState<State>,
    account: &str,
    counter: Holder_Counter,
) -> Result<(), Error> {
    let holders = &app_state.database.det_holder;
    let Some(mut holder) = holders.get_one(account).await? else {
        return Ok(());
    };

    let slot = match counter {
        Holder_Counter::Mints => &mut holder.mints,
        Holder_Counter::Claims => &mut holder.claims,
    };
    *slot = Some(slot.take().unwrap_or_default() + BigDecimal::from(1));

    holders.upsert(&holder).await
}

/// Debt position of the transaction sender against the called contract.
pub async fn track_debt_snapshot(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
) -> Result<(), Error> {
    let account = envelope.sender();
    if app_state.config.is_excluded(&account) {
        return Ok(());
    }

    let Some(contract) = envelope.recipient() else {
        debug!("Transaction {} has no recipient, skipping debt snapshot", envelope.tx_hash);
        return Ok(());
    };

    let det = Contract::bind(
        app_state.ledger.as_ref(),
        &contract,
        envelope.block_number,
    );

    let snapshot = Debt_Snapshot {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        account: account.to_owned(),
        block: envelope.block_number,
        timestamp: envelope.block_timestamp,
        balance_of: det.balance_of(&account).await?.ok(),
        collateral: det.collateral(&account).await?.ok(),
        debt_balance_of: det
            .debt_balance_of(&account, &app_state.config.debt_currency)
            .await?
            .ok(),
    };

    app_state.database.debt_snapshot.upsert(&snapshot).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::EntityStore,
        provider::{LedgerCall, LedgerValue},
        test_support::{app_state, envelope, holder_ledger, StaticLedger, ALICE, TOKEN},
        types::{Event_Kind, Transfer_Type},
    };

    const ESCROW: &str = "0x971e78e0c92392a4e39099835cf7e6ab535b2227";

    fn transfer() -> Event_Envelope {
        envelope(Event_Kind::DET_Transfer(Transfer_Type {
            from: String::from(ALICE),
            to: String::from(ESCROW),
            value: String::from("1"),
        }))
    }

    async fn holders(app_state: &AppState<State>) -> BigDecimal {
        app_state
            .database
            .global_metadata
            .get_one(SINGLETON_ID)
            .await
            .unwrap()
            .map(|m| m.det_holders)
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_holder_snapshot() {
        let (app_state, _) = app_state(holder_ledger(ALICE, 100));
        let event = transfer();

        track_det_holder(&app_state, &event, TOKEN, ALICE).await.unwrap();

        let holder = app_state
            .database
            .det_holder
            .get_one(&format!("1600000000-{}", ALICE))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(holder.balance_of, BigDecimal::from(100));
        assert_eq!(holder.collateral, BigDecimal::from(120));
        assert_eq!(holder.transferable, None);
        assert_eq!(holder.initial_debt_ownership, BigDecimal::from(7));
        assert_eq!(holder.debt_entry_at_index, Some(BigDecimal::from(99)));
        assert_eq!(holders(&app_state).await, BigDecimal::from(1));

        // same timestamp again, already counted
        track_det_holder(&app_state, &event, TOKEN, ALICE).await.unwrap();
        assert_eq!(holders(&app_state).await, BigDecimal::from(1));
    }

    #[tokio::test]
    async fn test_excluded_account_is_skipped() {
        let (app_state, store) = app_state(holder_ledger(ESCROW, 100));
        track_det_holder(&app_state, &transfer(), TOKEN, ESCROW).await.unwrap();
        track_debt_snapshot(
            &app_state,
            &Event_Envelope {
                tx_from: String::from(ESCROW),
                ..transfer()
            },
        )
        .await
        .unwrap();

        assert_eq!(store.count("DETHolder").await.unwrap(), 0);
        assert_eq!(store.count("DebtSnapshot").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_resolver_stores_nothing() {
        let ledger = StaticLedger::new()
            .with(
                LedgerCall::BalanceOf {
                    contract: String::from(TOKEN),
                    account: String::from(ALICE),
                },
                LedgerValue::Uint(BigDecimal::from(1)),
            )
            .with(
                LedgerCall::Collateral {
                    contract: String::from(TOKEN),
                    account: String::from(ALICE),
                },
                LedgerValue::Uint(BigDecimal::from(1)),
            );
        let (app_state, store) = app_state(ledger);

        track_det_holder(&app_state, &transfer(), TOKEN, ALICE).await.unwrap();

        assert_eq!(store.count("DETHolder").await.unwrap(), 0);
        assert_eq!(holders(&app_state).await, BigDecimal::zero());
    }

    #[tokio::test]
    async fn test_issuer_counted_once() {
        let (app_state, _) = app_state(StaticLedger::new());
        track_issuer(&app_state, ALICE).await.unwrap();
        track_issuer(&app_state, ALICE).await.unwrap();

        let metadata = app_state
            .database
            .global_metadata
            .get_one(SINGLETON_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(metadata.issuers, BigDecimal::from(1));
        assert_eq!(metadata.det_holders, BigDecimal::zero());
    }

    #[tokio::test]
    async fn test_debt_snapshot_with_partial_reads() {
        let ledger = StaticLedger::new().with(
            LedgerCall::BalanceOf {
                contract: String::from(TOKEN),
                account: String::from(ALICE),
            },
            LedgerValue::Uint(BigDecimal::from(3)),
        );
        let (app_state, _) = app_state(ledger);
        let event = transfer();

        track_debt_snapshot(&app_state, &event).await.unwrap();

        let snapshot = app_state
            .database
            .debt_snapshot
            .get_one(&event_id(&event.tx_hash, event.log_index))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.balance_of, Some(BigDecimal::from(3)));
        assert_eq!(snapshot.collateral, None);
        assert_eq!(snapshot.debt_balance_of, None);
    }
}
