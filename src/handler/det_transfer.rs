use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::det_holder,
    helpers::{event_id, parse_amount},
    model::Transfer,
    types::{Event_Envelope, Transfer_Type},
};

pub const SOURCE: &str = "DET";

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Transfer_Type,
) -> Result<(), Error> {
    let transfer = Transfer {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        source: String::from(SOURCE),
        from: item.from.to_lowercase(),
        to: item.to.to_lowercase(),
        value: parse_amount(&item.value)?,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
    };

    app_state.database.transfer.upsert(&transfer).await
}

pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Transfer_Type,
) -> Result<(), Error> {
    det_holder::track_det_holder(app_state, envelope, &envelope.address, &item.from)
        .await?;
    det_holder::track_det_holder(app_state, envelope, &envelope.address, &item.to)
        .await?;

    Ok(())
}
