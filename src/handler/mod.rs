use tracing::debug;

use crate::{
    configuration::{AppState, State},
    error::Error,
    provider::{Contract, Read},
    types::Event_Envelope,
};

pub mod active_staker;
pub mod burned;
pub mod det_holder;
pub mod det_transfer;
pub mod fees_claimed;
pub mod issued;
pub mod log_trade;
pub mod position_aggregation;
pub mod position_changed;
pub mod rate_aggregation;
pub mod rates_updated;
pub mod synth_transfer;
pub mod target_updated;
pub mod vested;

/// Currency key of the synth that emitted the event, falling back to the
/// debt currency for contracts that predate `currencyKey()`.
pub async fn synth_source(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
) -> Result<String, Error> {
    let synth = Contract::bind(
        app_state.ledger.as_ref(),
        &envelope.address,
        envelope.block_number,
    );

    match synth.currency_key().await? {
        Read::Value(key) => Ok(key),
        Read::Reverted => {
            debug!("currencyKey reverted on {}", envelope.address);
            Ok(app_state.config.debt_currency.to_owned())
        },
    }
}
