use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::det_holder::{increment_holder_counter, Holder_Counter},
    helpers::{event_id, parse_amount},
    model::Fees_Claimed,
    types::{Event_Envelope, Fees_Claimed_Type},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Fees_Claimed_Type,
) -> Result<(), Error> {
    let fees_claimed = Fees_Claimed {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        account: item.account.to_lowercase(),
        rewards: parse_amount(&item.det_rewards)?,
        value: parse_amount(&item.d_usd_amount)?,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
    };

    app_state.database.fees_claimed.upsert(&fees_claimed).await
}

pub async fn parse_and_insert(
    app_state: &AppState<State>,
    _envelope: &Event_Envelope,
    item: &Fees_Claimed_Type,
) -> Result<(), Error> {
    increment_holder_counter(
        app_state,
        &item.account.to_lowercase(),
        Holder_Counter::Claims,
    )
    .await
}
