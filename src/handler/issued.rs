use tracing::{debug, warn};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{
        active_staker::{track_active_stakers, Debt_Change},
        det_holder::{self, Holder_Counter},
        synth_source,
    },
    helpers::{event_id, parse_amount},
    model::Issued,
    types::{Event_Envelope, Issued_Type},
};

/// The record is attributed to the transaction sender; an unknown calling
/// function is logged and the event is still kept.
pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Issued_Type,
) -> Result<(), Error> {
    match app_state.config.classify_issue(&envelope.tx_input) {
        Some(function) => debug!("Issued via {} in {}", function, envelope.tx_hash),
        None => warn!(
            "Unclassified Issued event with input: {}, hash: {}, address: {}",
            envelope.tx_input, envelope.tx_hash, envelope.address
        ),
    }

    let issued = Issued {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        account: envelope.sender(),
        value: parse_amount(&item.value)?,
        source: synth_source(app_state, envelope).await?,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
        gas_price: parse_amount(&envelope.gas_price)?,
    };

    app_state.database.issued.upsert(&issued).await
}

pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    _item: &Issued_Type,
) -> Result<(), Error> {
    let account = envelope.sender();

    det_holder::track_issuer(app_state, &account).await?;

    if let Some(contract) = envelope.recipient() {
        det_holder::track_det_holder(app_state, envelope, &contract, &account)
            .await?;
    }

    det_holder::increment_holder_counter(app_state, &account, Holder_Counter::Mints)
        .await?;
    det_holder::track_debt_snapshot(app_state, envelope).await?;
    track_active_stakers(app_state, envelope, Debt_Change::Mint).await
}
