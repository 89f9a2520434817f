//! Per-account position statistics.
//!
//! Two update disciplines feed the same aggregate shape:
//!
//! * authoritative: the event carries the position size after the trade
//!   (`PositionChanged`), aggregates are keyed by `{trader}-{amm}`;
//! * delta: the event carries a signed change and the size is accumulated
//!   (`LogTrade`), aggregates are keyed by `{account}`.
//!
//! The transitions are pure; the stored aggregate is replaced only when the
//! transition succeeds.

use bigdecimal::{BigDecimal, Zero};
use tracing::debug;

use crate::{
    configuration::{AppState, State},
    error::Error,
    model::Position_Aggregate,
    types::Event_Envelope,
};

const RATIO_SCALE: i64 = 18;

#[derive(Debug, Clone)]
pub struct Authoritative_Update {
    pub margin: BigDecimal,
    pub position_notional: BigDecimal,
    pub exchanged_position_size: BigDecimal,
    pub position_size_after: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Delta_Update {
    pub is_buy: bool,
    pub margin_amount: BigDecimal,
    pub position_amount: BigDecimal,
    pub position_notional: BigDecimal,
    pub deposited_amount: BigDecimal,
}

fn ratio(
    numerator: &BigDecimal,
    denominator: &BigDecimal,
    what: &str,
) -> Result<BigDecimal, Error> {
    if denominator.is_zero() {
        return Err(Error::InvariantViolation(format!(
            "{} is zero while the position is open",
            what
        )));
    }

    Ok((numerator / denominator).with_scale(RATIO_SCALE).normalized())
}

pub fn apply_authoritative(
    prev: &Position_Aggregate,
    update: &Authoritative_Update,
) -> Result<Position_Aggregate, Error> {
    if update.position_size_after.is_zero() {
        return Ok(prev.reset());
    }

    let notional = &prev.notional + &update.position_notional;
    let avg_leverage = ratio(&notional, &update.margin, "margin")?;
    let last_price = ratio(
        &update.position_notional,
        &update.exchanged_position_size,
        "exchanged position size",
    )?;
    let avg_entry_price = ratio(
        &(prev.size.abs() * &prev.avg_entry_price
            + &update.exchanged_position_size * &last_price),
        &update.position_size_after,
        "position size",
    )?;

    Ok(Position_Aggregate {
        size: update.position_size_after.to_owned(),
        total_margin: update.margin.to_owned(),
        notional,
        avg_leverage,
        last_price,
        avg_entry_price,
        last_position_size: update.exchanged_position_size.to_owned(),
        ..prev.clone()
    })
}

pub fn apply_delta(
    prev: &Position_Aggregate,
    update: &Delta_Update,
) -> Result<Position_Aggregate, Error> {
    let (size, total_margin) = if update.is_buy {
        (
            &prev.size + &update.position_amount,
            &prev.total_margin - &update.margin_amount,
        )
    } else {
        (
            &prev.size - &update.position_amount,
            &prev.total_margin + &update.margin_amount,
        )
    };

    if size.is_zero() {
        return Ok(prev.reset());
    }

    let notional = &prev.notional + &update.position_notional;
    let total_deposited = &prev.total_deposited + &update.deposited_amount;
    let avg_leverage =
        ratio(&notional, &total_deposited, "deposited amount")?.abs();
    let last_price = ratio(
        &update.position_notional,
        &update.position_amount,
        "position amount",
    )?;
    let cumulative_size = &prev.cumulative_size + &update.position_amount;
    let avg_entry_price = ratio(
        &(prev.cumulative_size.abs() * &prev.avg_entry_price
            + &update.position_amount * &last_price),
        &cumulative_size.abs(),
        "cumulative size",
    )?
    .abs();

    Ok(Position_Aggregate {
        size,
        total_margin,
        notional,
        total_deposited,
        avg_leverage,
        last_price,
        avg_entry_price,
        last_position_size: update.position_amount.to_owned(),
        cumulative_size,
        ..prev.clone()
    })
}

pub async fn update_authoritative(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    trader: &str,
    market: &str,
    update: &Authoritative_Update,
    event_id: &str,
) -> Result<(), Error> {
    let id = format!("{}-{}", trader, market);
    let prev = load(app_state, &id, trader, Some(market)).await?;
    if prev.last_event.as_deref() == Some(event_id) {
        debug!("Position {} already includes {}", id, event_id);
        return Ok(());
    }

    let next = apply_authoritative(&prev, update)?;
    store(app_state, envelope, next, event_id).await
}

pub async fn update_delta(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    account: &str,
    update: &Delta_Update,
    event_id: &str,
) -> Result<(), Error> {
    let prev = load(app_state, account, account, None).await?;
    if prev.last_event.as_deref() == Some(event_id) {
        debug!("Position {} already includes {}", account, event_id);
        return Ok(());
    }

    let next = apply_delta(&prev, update)?;
    store(app_state, envelope, next, event_id).await
}

async fn load(
    app_state: &AppState<State>,
    id: &str,
    account: &str,
    market: Option<&str>,
) -> Result<Position_Aggregate, Error> {
    let aggregate = app_state
        .database
        .position_aggregate
        .get_one(id)
        .await?
        .unwrap_or_else(|| {
            Position_Aggregate::empty(
                id.to_owned(),
                account.to_owned(),
                market.map(str::to_owned),
            )
        });

    Ok(aggregate)
}

async fn store(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    mut aggregate: Position_Aggregate,
    event_id: &str,
) -> Result<(), Error> {
    aggregate.block = envelope.block_number;
    aggregate.timestamp = envelope.block_timestamp;
    aggregate.last_event = Some(event_id.to_owned());

    app_state.database.position_aggregate.upsert(&aggregate).await
}
