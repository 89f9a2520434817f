use bigdecimal::{BigDecimal, Zero};
use tracing::debug;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{day_id, SINGLETON_ID},
    model::{Active_Staker, Total_Active_Staker, Total_Daily_Active_Staker},
    provider::{Contract, Read},
    types::Event_Envelope,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debt_Change {
    Mint,
    Burn,
}

/// Keeps the set of accounts with outstanding debt in step with issuance and
/// burns, then snapshots the total for the day of the event.
pub async fn track_active_stakers(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    change: Debt_Change,
) -> Result<(), Error> {
    let account = envelope.sender();
    let Some(contract) = envelope.recipient() else {
        debug!("Transaction {} has no recipient, skipping stakers", envelope.tx_hash);
        return Ok(());
    };

    let debt = Contract::bind(
        app_state.ledger.as_ref(),
        &contract,
        envelope.block_number,
    )
    .debt_balance_of(&account, &app_state.config.debt_currency)
    .await?;

    let debt = match debt {
        Read::Value(debt) => debt,
        Read::Reverted => {
            debug!(
                "debtBalanceOf reverted for {} at block {}, tx {}",
                account, envelope.block_number, envelope.tx_hash
            );
            return Ok(());
        },
    };

    let total = apply_transition(app_state, &account, &debt, change).await?;
    snapshot_daily(app_state, envelope.block_timestamp, &total).await
}

pub async fn apply_transition(
    app_state: &AppState<State>,
    account: &str,
    debt: &BigDecimal,
    change: Debt_Change,
) -> Result<BigDecimal, Error> {
    let stakers = &app_state.database.active_staker;
    let tracked = stakers.exists(account).await?;

    match change {
        Debt_Change::Mint if !tracked && debt > &BigDecimal::zero() => {
            stakers
                .upsert(&Active_Staker {
                    id: account.to_owned(),
                })
                .await?;
        },
        Debt_Change::Burn if tracked && debt.is_zero() => {
            stakers.delete(account).await?;
        },
        _ => {},
    }

    // recounted from the membership set, replays converge
    let count = BigDecimal::from(stakers.count().await?);
    let totals = &app_state.database.total_active_staker;
    let current = totals.get_one(SINGLETON_ID).await?;

    if current.as_ref().map(|total| &total.count) != Some(&count) {
        totals
            .upsert(&Total_Active_Staker {
                id: String::from(SINGLETON_ID),
                count: count.to_owned(),
            })
            .await?;
    }

    Ok(count)
}

/// The first event of a day fixes that day's count.
pub async fn snapshot_daily(
    app_state: &AppState<State>,
    timestamp: i64,
    count: &BigDecimal,
) -> Result<(), Error> {
    let id = day_id(timestamp).to_string();
    let daily = &app_state.database.total_daily_active_staker;

    if !daily.exists(&id).await? {
        daily
            .upsert(&Total_Daily_Active_Staker {
                id,
                count: count.to_owned(),
            })
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::EntityStore,
        provider::{LedgerCall, LedgerValue},
        test_support::{app_state, envelope, StaticLedger, ALICE, TOKEN},
        types::{Event_Kind, Issued_Type},
    };

    fn debt_call() -> LedgerCall {
        LedgerCall::DebtBalanceOf {
            contract: String::from(TOKEN),
            account: String::from(ALICE),
            currency: String::from("dUSD"),
        }
    }

    fn issued() -> Event_Envelope {
        envelope(Event_Kind::Issued(Issued_Type {
            account: String::from(ALICE),
            value: String::from("10"),
        }))
    }

    #[tokio::test]
    async fn test_mint_then_burn() {
        let (app_state, _) = app_state(StaticLedger::new());

        let total = apply_transition(&app_state, ALICE, &BigDecimal::from(5), Debt_Change::Mint)
            .await
            .unwrap();
        assert_eq!(total, BigDecimal::from(1));

        let total = apply_transition(&app_state, ALICE, &BigDecimal::from(9), Debt_Change::Mint)
            .await
            .unwrap();
        assert_eq!(total, BigDecimal::from(1));

        let total = apply_transition(&app_state, ALICE, &BigDecimal::from(1), Debt_Change::Burn)
            .await
            .unwrap();
        assert_eq!(total, BigDecimal::from(1));

        let total = apply_transition(&app_state, ALICE, &BigDecimal::zero(), Debt_Change::Burn)
            .await
            .unwrap();
        assert_eq!(total, BigDecimal::zero());
        assert!(!app_state.database.active_staker.exists(ALICE).await.unwrap());

        let stored = app_state
            .database
            .total_active_staker
            .get_one(SINGLETON_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.count, BigDecimal::zero());
    }

    #[tokio::test]
    async fn test_mint_without_debt_is_not_tracked() {
        let (app_state, _) = app_state(StaticLedger::new());
        let total = apply_transition(&app_state, ALICE, &BigDecimal::zero(), Debt_Change::Mint)
            .await
            .unwrap();
        assert_eq!(total, BigDecimal::zero());
    }

    #[tokio::test]
    async fn test_daily_snapshot_is_fixed_by_first_event() {
        let (app_state, _) = app_state(StaticLedger::new());
        snapshot_daily(&app_state, 1_600_000_000, &BigDecimal::from(3)).await.unwrap();
        snapshot_daily(&app_state, 1_600_000_500, &BigDecimal::from(4)).await.unwrap();

        let daily = app_state
            .database
            .total_daily_active_staker
            .get_one("18518")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(daily.count, BigDecimal::from(3));
    }

    #[tokio::test]
    async fn test_reverted_debt_read_changes_nothing() {
        let (app_state, store) = app_state(StaticLedger::new());
        track_active_stakers(&app_state, &issued(), Debt_Change::Mint).await.unwrap();

        assert_eq!(store.count("ActiveStaker").await.unwrap(), 0);
        assert_eq!(store.count("TotalDailyActiveStaker").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_issue_tracks_staker_and_snapshots_day() {
        let ledger = StaticLedger::new().with(debt_call(), LedgerValue::Uint(BigDecimal::from(50)));
        let (app_state, _) = app_state(ledger);

        track_active_stakers(&app_state, &issued(), Debt_Change::Mint).await.unwrap();
        track_active_stakers(&app_state, &issued(), Debt_Change::Mint).await.unwrap();

        assert!(app_state.database.active_staker.exists(ALICE).await.unwrap());
        let daily = app_state
            .database
            .total_daily_active_staker
            .get_one("18518")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(daily.count, BigDecimal::from(1));
    }
}
