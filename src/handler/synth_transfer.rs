use tracing::warn;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{event_id, parse_amount},
    model::{Synth_Holder, Transfer},
    provider::{Contract, Read},
    types::{Event_Envelope, Transfer_Type},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Transfer_Type,
) -> Result<(), Error> {
    let transfer = Transfer {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        source: app_state.config.debt_currency.to_owned(),
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
    let source = &app_state.config.debt_currency;
    track_synth_holder(app_state, envelope, source, &item.from).await?;
    track_synth_holder(app_state, envelope, source, &item.to).await?;

    Ok(())
}

pub async fn track_synth_holder(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    source: &str,
    account: &str,
) -> Result<(), Error> {
    let account = account.to_lowercase();
    let synth = Contract::bind(
        app_state.ledger.as_ref(),
        &envelope.address,
        envelope.block_number,
    );

    let Read::Value(balance_of) = synth.balance_of(&account).await? else {
        warn!(
            "Synth balance unreadable for {} on {} at block {}",
            account, envelope.address, envelope.block_number
        );
        return Ok(());
    };

    let holder = Synth_Holder {
        id: format!("{}-{}", account, source),
        synth: source.to_owned(),
        balance_of,
    };

    app_state.database.synth_holder.upsert(&holder).await
}
