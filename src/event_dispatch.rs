use tracing::error;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{
        burned, det_transfer, fees_claimed, issued, log_trade,
        position_changed, rates_updated, synth_transfer, target_updated,
        vested,
    },
    types::{Event_Envelope, Event_Kind},
};

/// Writes the audit record of the event, then applies it to the derived
/// entities. A handler failure leaves the record in place.
pub async fn parse_event(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
) -> Result<(), Error> {
    record(app_state, envelope).await?;

    if let Err(e) = apply(app_state, envelope).await {
        error!(
            "{} handler failed in tx {}, log {}: {}",
            envelope.event, envelope.tx_hash, envelope.log_index, e
        );
        return Err(e);
    }

    Ok(())
}

async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
) -> Result<(), Error> {
    match &envelope.event {
        Event_Kind::DET_Transfer(item) => {
            det_transfer::record(app_state, envelope, item).await
        },
        Event_Kind::Synth_Transfer(item) => {
            synth_transfer::record(app_state, envelope, item).await
        },
        Event_Kind::Target_Updated(item) => {
            target_updated::record(app_state, envelope, item).await
        },
        Event_Kind::Vested(item) => {
            vested::record(app_state, envelope, item).await
        },
        Event_Kind::Issued(item) => {
            issued::record(app_state, envelope, item).await
        },
        Event_Kind::Burned(item) => {
            burned::record(app_state, envelope, item).await
        },
        Event_Kind::Fees_Claimed(item) => {
            fees_claimed::record(app_state, envelope, item).await
        },
        Event_Kind::Rates_Updated(item) => {
            rates_updated::record(app_state, envelope, item).await
        },
        Event_Kind::Position_Changed(item) => {
            position_changed::record(app_state, envelope, item).await
        },
        Event_Kind::Log_Trade(item) => {
            log_trade::record(app_state, envelope, item).await
        },
    }
}

async fn apply(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
) -> Result<(), Error> {
    match &envelope.event {
        Event_Kind::DET_Transfer(item) => {
            det_transfer::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Synth_Transfer(item) => {
            synth_transfer::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Target_Updated(_) => Ok(()),
        Event_Kind::Vested(item) => {
            vested::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Issued(item) => {
            issued::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Burned(item) => {
            burned::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Fees_Claimed(item) => {
            fees_claimed::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Rates_Updated(item) => {
            rates_updated::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Position_Changed(item) => {
            position_changed::parse_and_insert(app_state, envelope, item).await
        },
        Event_Kind::Log_Trade(item) => {
            log_trade::parse_and_insert(app_state, envelope, item).await
        },
    }
}
