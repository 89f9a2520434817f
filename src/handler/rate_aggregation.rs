use bigdecimal::BigDecimal;

use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{bucket_id, unit},
    model::{DET_Price, Entity, Latest_Rate, Table},
};

/// Running mean over integer rates, truncated after each step.
pub fn incremental_mean(
    average: &BigDecimal,
    rate: &BigDecimal,
    count: &BigDecimal,
) -> BigDecimal {
    let previous = count - BigDecimal::from(1);
    ((average * previous + rate) / count).with_scale(0)
}

/// Folds `rate` into the bucket containing `timestamp`, creating it on first
/// use. A bucket whose last contributor was `event_id` is left as is.
pub async fn record_rate<const WIDTH: i64>(
    table: &Table<DET_Price<WIDTH>>,
    timestamp: i64,
    rate: &BigDecimal,
    event_id: &str,
) -> Result<DET_Price<WIDTH>, Error>
where
    DET_Price<WIDTH>: Entity,
{
    let id = bucket_id(timestamp, WIDTH).to_string();
    let mut bucket = table
        .get_one(&id)
        .await?
        .unwrap_or_else(|| DET_Price::new(id));

    if bucket.last_event.as_deref() == Some(event_id) {
        return Ok(bucket);
    }

    bucket.count += BigDecimal::from(1);
    bucket.average_price =
        incremental_mean(&bucket.average_price, rate, &bucket.count);
    bucket.last_event = Some(event_id.to_owned());

    table.upsert(&bucket).await?;

    Ok(bucket)
}

pub async fn record_det_price(
    app_state: &AppState<State>,
    timestamp: i64,
    rate: &BigDecimal,
    event_id: &str,
) -> Result<(), Error> {
    let database = &app_state.database;
    record_rate(&database.daily_det_price, timestamp, rate, event_id).await?;
    record_rate(&database.fifteen_minute_det_price, timestamp, rate, event_id)
        .await?;

    Ok(())
}

/// Stable currencies are pegged at one unit; an existing rate is kept.
pub async fn seed_stable_rates(
    app_state: &AppState<State>,
) -> Result<(), Error> {
    for symbol in &app_state.config.stable_currencies {
        if !app_state.database.latest_rate.exists(symbol).await? {
            app_state
                .database
                .latest_rate
                .upsert(&Latest_Rate {
                    id: symbol.to_owned(),
                    rate: unit(),
                })
                .await?;
        }
    }

    Ok(())
}

pub async fn update_latest_rate(
    app_state: &AppState<State>,
    symbol: &str,
    rate: &BigDecimal,
) -> Result<(), Error> {
    app_state
        .database
        .latest_rate
        .upsert(&Latest_Rate {
            id: symbol.to_owned(),
            rate: rate.to_owned(),
        })
        .await
}
