use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::position_aggregation::{update_authoritative, Authoritative_Update},
    helpers::{event_id, parse_amount},
    model::Position_Changed,
    types::{Event_Envelope, Position_Changed_Type},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Position_Changed_Type,
) -> Result<(), Error> {
    let position_changed = Position_Changed {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        trader: item.trader.to_lowercase(),
        amm: item.amm.to_lowercase(),
        margin: parse_amount(&item.margin)?,
        position_notional: parse_amount(&item.position_notional)?,
        exchanged_position_size: parse_amount(&item.exchanged_position_size)?,
        fee: parse_amount(&item.fee)?,
        position_size_after: parse_amount(&item.position_size_after)?,
        realized_pnl: parse_amount(&item.realized_pnl)?,
        unrealized_pnl_after: parse_amount(&item.unrealized_pnl_after)?,
        bad_debt: parse_amount(&item.bad_debt)?,
        liquidation_penalty: parse_amount(&item.liquidation_penalty)?,
        spot_price: parse_amount(&item.spot_price)?,
        funding_payment: parse_amount(&item.funding_payment)?,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
    };

    app_state
        .database
        .position_changed
        .upsert(&position_changed)
        .await
}

pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Position_Changed_Type,
) -> Result<(), Error> {
    let update = Authoritative_Update {
        margin: parse_amount(&item.margin)?,
        position_notional: parse_amount(&item.position_notional)?,
        exchanged_position_size: parse_amount(&item.exchanged_position_size)?,
        position_size_after: parse_amount(&item.position_size_after)?,
    };

    update_authoritative(
        app_state,
        envelope,
        &item.trader.to_lowercase(),
        &item.amm.to_lowercase(),
        &update,
        &event_id(&envelope.tx_hash, envelope.log_index),
    )
    .await
}
