use tracing::{debug, warn};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::det_holder,
    helpers::{event_id, parse_amount},
    model::{Reward_Escrow_Holder, Vested},
    provider::{Contract, Read},
    types::{Event_Envelope, Vested_Type},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Vested_Type,
) -> Result<(), Error> {
    let vested = Vested {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        beneficiary: item.beneficiary.to_lowercase(),
        value: parse_amount(&item.value)?,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
    };

    app_state.database.vested.upsert(&vested).await
}

/// Refreshes the escrowed balance, then the beneficiary's holder snapshot on
/// the token the escrow points at.
pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Vested_Type,
) -> Result<(), Error> {
    let beneficiary = item.beneficiary.to_lowercase();
    let escrow = Contract::bind(
        app_state.ledger.as_ref(),
        &envelope.address,
        envelope.block_number,
    );

    match escrow.balance_of(&beneficiary).await? {
        Read::Value(balance_of) => {
            app_state
                .database
                .reward_escrow_holder
                .upsert(&Reward_Escrow_Holder {
                    id: beneficiary.to_owned(),
                    balance_of,
                })
                .await?;
        },
        Read::Reverted => {
            warn!(
                "Escrow balance unreadable for {} on {} at block {}",
                beneficiary, envelope.address, envelope.block_number
            );
        },
    }

    let Read::Value(det_contract) = escrow.dtrade().await? else {
        debug!("Escrow {} has no token address", envelope.address);
        return Ok(());
    };

    det_holder::track_det_holder(app_state, envelope, &det_contract, &beneficiary)
        .await
}
