use tracing::debug;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::rate_aggregation::{
        record_det_price, seed_stable_rates, update_latest_rate,
    },
    helpers::{bytes32_to_string, event_id, parse_amount},
    model::{Rate_Update, Rates_Updated},
    types::{Event_Envelope, Rates_Updated_Type},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Rates_Updated_Type,
) -> Result<(), Error> {
    let new_rates = item
        .new_rates
        .iter()
        .map(|rate| parse_amount(rate))
        .collect::<Result<Vec<_>, Error>>()?;

    let rates_updated = Rates_Updated {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        currency_keys: item.currency_keys.to_owned(),
        new_rates,
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
        from: envelope.sender(),
        gas_price: parse_amount(&envelope.gas_price)?,
    };

    app_state.database.rates_updated.upsert(&rates_updated).await
}

/// One `RateUpdate` per non-empty key; the tracked price currency also feeds
/// the daily and quarter-hour buckets.
pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Rates_Updated_Type,
) -> Result<(), Error> {
    seed_stable_rates(app_state).await?;

    if item.currency_keys.len() != item.new_rates.len() {
        return Err(Error::ParseMessage(format!(
            "{} currency keys for {} rates in {}",
            item.currency_keys.len(),
            item.new_rates.len(),
            envelope.tx_hash
        )));
    }

    let id = event_id(&envelope.tx_hash, envelope.log_index);

    for (index, (key, rate)) in
        item.currency_keys.iter().zip(&item.new_rates).enumerate()
    {
        let synth = bytes32_to_string(key);
        if synth.is_empty() {
            debug!("Empty currency key at {} in {}", index, envelope.tx_hash);
            continue;
        }

        let rate = parse_amount(rate)?;
        let rate_update = Rate_Update {
            id: format!("{}-{}", envelope.tx_hash, synth),
            currency_key: key.to_owned(),
            synth: synth.to_owned(),
            rate: rate.to_owned(),
            block: envelope.block_number,
            timestamp: envelope.block_timestamp,
        };
        app_state.database.rate_update.upsert(&rate_update).await?;

        if synth == app_state.config.price_currency {
            record_det_price(
                app_state,
                envelope.block_timestamp,
                &rate,
                &format!("{}-{}", id, index),
            )
            .await?;
        }

        update_latest_rate(app_state, &synth, &rate).await?;
    }

    Ok(())
}
