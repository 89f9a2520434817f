use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::position_aggregation::{update_delta, Delta_Update},
    helpers::{event_id, parse_amount},
    model::Trade,
    types::{Balance, Event_Envelope, Log_Trade_Type},
};

pub async fn record(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Log_Trade_Type,
) -> Result<(), Error> {
    let trade = Trade {
        id: event_id(&envelope.tx_hash, envelope.log_index),
        maker: item.maker.to_lowercase(),
        taker: item.taker.to_lowercase(),
        trader: item.trader.to_lowercase(),
        margin_amount: parse_amount(&item.margin_amount)?,
        position_amount: parse_amount(&item.position_amount)?,
        is_buy: item.is_buy,
        maker_balance: item.maker_balance.to_owned(),
        taker_balance: item.taker_balance.to_owned(),
        timestamp: envelope.block_timestamp,
        block: envelope.block_number,
    };

    app_state.database.trade.upsert(&trade).await
}

/// `is_buy` is the maker's direction; the taker trades the other way. Each
/// side's deposit is the margin carried in its packed balance word.
pub async fn parse_and_insert(
    app_state: &AppState<State>,
    envelope: &Event_Envelope,
    item: &Log_Trade_Type,
) -> Result<(), Error> {
    let margin_amount = parse_amount(&item.margin_amount)?;
    let position_amount = parse_amount(&item.position_amount)?;
    let maker_balance = Balance::from_bytes32(&item.maker_balance)?;
    let taker_balance = Balance::from_bytes32(&item.taker_balance)?;
    let id = event_id(&envelope.tx_hash, envelope.log_index);

    let sides = [
        ("maker", &item.maker, item.is_buy, maker_balance),
        ("taker", &item.taker, !item.is_buy, taker_balance),
    ];

    for (side, account, is_buy, balance) in sides {
        let update = Delta_Update {
            is_buy,
            margin_amount: margin_amount.to_owned(),
            position_amount: position_amount.to_owned(),
            position_notional: margin_amount.to_owned(),
            deposited_amount: balance.margin,
        };

        update_delta(
            app_state,
            envelope,
            &account.to_lowercase(),
            &update,
            &format!("{}-{}", id, side),
        )
        .await?;
    }

    Ok(())
}
