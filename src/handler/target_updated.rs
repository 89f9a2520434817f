use crate::{
    configuration::{AppState, State},
    error::Error,
    model::Contract_Updated,
    types::{Event_Envelope, Target_Updated_Type},
};

pub const SOURCE: &str = "Dtrade";

/// Proxy retargets are keyed by transaction hash alone.
pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Target_Updated_Type,
) -> Result<(), Error> {
    let contract_updated = Contract_Updated {
        id: envelope.tx_hash.to_owned(),
        source: String::from(SOURCE),
        target: item.new_target.to_lowercase(),
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
    };

    app_state
        .database
        .contract_updated
        .upsert(&contract_updated)
        .await
}
