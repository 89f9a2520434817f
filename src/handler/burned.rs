use tracing::{debug, warn};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{
        active_staker::{track_active_stakers, Debt_Change},
        det_holder, synth_source,
    },
    helpers::{event_id, parse_amount},
    model::Burned,
    types::{Burned_Type, Event_Envelope},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Burned_Type,
) -> Result<(), Error> {
    match app_state.config.classify_burn(&envelope.tx_input) {
        Some(function) => debug!("Burned via {} in {}", function, envelope.tx_hash),
        None => warn!(
            "Unclassified Burned event with input: {}, hash: {}, address: {}",
            envelope.tx_input, envelope.tx_hash, envelope.address
        ),
    }

    let burned = Burned {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        account: envelope.sender(),
        value: parse_amount(&item.value)?,
        source: synth_source(app_state, envelope).await?,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
        gas_price: parse_amount(&envelope.gas_price)?,
    };

    app_state.database.burned.upsert(&burned).await
}

pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    _item: &Burned_Type,
) -> Result<(), Error> {
    let account = envelope.sender();

    if let Some(contract) = envelope.recipient() {
        det_holder::track_det_holder(app_state, envelope, &contract, &account)
            .await?;
    }

    det_holder::track_debt_snapshot(app_state, envelope).await?;
    track_active_stakers(app_state, envelope, Debt_Change::Burn).await
}
