use chrono::DateTime;
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::{debug, error, info};

use crate::{
    configuration::{AppState, State},
    error::Error,
    event_dispatch::parse_event,
    model::Block,
    types::Event_Envelope,
};

pub const CURSOR_ID: &str = "latest";

/// Reads decoded events as newline-delimited JSON, one envelope per line,
/// from a file or from stdin (`-`).
///
/// Processing resumes after the stored cursor: envelopes strictly before it
/// were already applied by an earlier run and are skipped. The envelope at
/// the cursor itself is applied again as a replay.
pub struct Event {
    app_state: AppState<State>,
    cursor: Option<Option<(i64, i64)>>,
    last: Option<(i64, i64)>,
}

impl Event {
    pub fn new(app_state: AppState<State>) -> Self {
        Self {
            app_state,
            cursor: None,
            last: None,
        }
    }

    pub async fn get_last_position(&self) -> Result<Option<(i64, i64)>, Error> {
        let cursor = self.app_state.database.block.get_one(CURSOR_ID).await?;
        Ok(cursor.map(|block| (block.block, block.log_index)))
    }

    async fn resume_from(&mut self) -> Result<Option<(i64, i64)>, Error> {
        if let Some(cursor) = self.cursor {
            return Ok(cursor);
        }

        let cursor = self.get_last_position().await?;
        if let Some((block, log_index)) = cursor {
            info!("Resuming after block {}, log {}", block, log_index);
        }
        self.cursor = Some(cursor);

        Ok(cursor)
    }

    pub async fn run(&mut self) -> Result<(), Error> {
        let source = self.app_state.config.events_source.to_owned();
        info!("Reading events from {}", source);

        let count = if source == "-" {
            self.consume(BufReader::new(io::stdin())).await?
        } else {
            let file = File::open(&source).await?;
            self.consume(BufReader::new(file)).await?
        };

        info!("Processed {} events", count);

        Ok(())
    }

    pub async fn consume<R: AsyncBufRead + Unpin>(
        &mut self,
        reader: R,
    ) -> Result<u64, Error> {
        let cursor = self.resume_from().await?;
        let mut lines = reader.lines();
        let mut count = 0;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let envelope = serde_json::from_str::<Event_Envelope>(&line)?;
            if cursor.is_some_and(|cursor| envelope.position() < cursor) {
                debug!(
                    "Skipping block {}, log {}: already applied",
                    envelope.block_number, envelope.log_index
                );
                continue;
            }

            self.apply(&envelope).await?;
            count += 1;
        }

        Ok(count)
    }

    async fn apply(&mut self, envelope: &Event_Envelope) -> Result<(), Error> {
        check_order(self.last, envelope.position())?;

        if let Err(e) = parse_event(&self.app_state, envelope).await {
            error!(
                "Stopping at block {}, log {}: {}",
                envelope.block_number, envelope.log_index, e
            );
            return Err(e);
        }

        let timestamp = DateTime::from_timestamp(envelope.block_timestamp, 0)
            .ok_or_else(|| {
                Error::ParseMessage(format!(
                    "invalid block timestamp {}",
                    envelope.block_timestamp
                ))
            })?;

        self.app_state
            .database
            .block
            .upsert(&Block {
                id: String::from(CURSOR_ID),
                block: envelope.block_number,
                log_index: envelope.log_index,
                timestamp,
            })
            .await?;

        self.last = Some(envelope.position());

        Ok(())
    }
}

/// Events must arrive in `(blockNumber, logIndex)` order; repeating the last
/// position is a replay and is accepted.
pub fn check_order(
    last: Option<(i64, i64)>,
    next: (i64, i64),
) -> Result<(), Error> {
    match last {
        Some(last) if next < last => Err(Error::OutOfOrder(format!(
            "event at block {}, log {} after block {}, log {}",
            next.0, next.1, last.0, last.1
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    use crate::test_support::{app_state, StaticLedger};

    const RATES: &str = r#"
{"address":"0xaa","blockNumber":10,"blockTimestamp":1600000000,"txHash":"0x01","txFrom":"0xbb","txTo":"0xaa","logIndex":0,"event":{"type":"RatesUpdated","params":{"currencyKeys":["0x4445540000000000000000000000000000000000000000000000000000000000"],"newRates":["100"]}}}
{"address":"0xaa","blockNumber":11,"blockTimestamp":1600000100,"txHash":"0x02","txFrom":"0xbb","txTo":"0xaa","logIndex":0,"event":{"type":"RatesUpdated","params":{"currencyKeys":["0x4445540000000000000000000000000000000000000000000000000000000000"],"newRates":["300"]}}}
"#;

    #[test]
    fn test_check_order() {
        assert!(check_order(None, (5, 0)).is_ok());
        assert!(check_order(Some((5, 1)), (5, 1)).is_ok());
        assert!(check_order(Some((5, 1)), (6, 0)).is_ok());
        assert!(matches!(
            check_order(Some((5, 1)), (5, 0)),
            Err(Error::OutOfOrder(_))
        ));
    }

    #[tokio::test]
    async fn test_consume_stream_and_advance_cursor() {
        let (app_state, _) = app_state(StaticLedger::new());
        let stream = r#"
{"address":"0xaa","blockNumber":10,"blockTimestamp":1600000000,"txHash":"0x01","txFrom":"0xbb","txTo":"0xaa","logIndex":0,"event":{"type":"TargetUpdated","params":{"newTarget":"0xcc"}}}

{"address":"0xaa","blockNumber":11,"blockTimestamp":1600000013,"txHash":"0x02","txFrom":"0xbb","txTo":"0xaa","logIndex":3,"event":{"type":"TargetUpdated","params":{"newTarget":"0xdd"}}}
"#;

        let mut source = Event::new(app_state.clone());
        let count = source.consume(stream.as_bytes()).await.unwrap();
        assert_eq!(count, 2);

        let cursor = app_state
            .database
            .block
            .get_one(CURSOR_ID)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((cursor.block, cursor.log_index), (11, 3));
        assert_eq!(cursor.timestamp.timestamp(), 1600000013);
    }

    #[tokio::test]
    async fn test_out_of_order_stream_is_rejected() {
        let (app_state, _) = app_state(StaticLedger::new());
        let stream = r#"
{"address":"0xaa","blockNumber":11,"blockTimestamp":1600000013,"txHash":"0x02","txFrom":"0xbb","txTo":"0xaa","logIndex":3,"event":{"type":"TargetUpdated","params":{"newTarget":"0xdd"}}}
{"address":"0xaa","blockNumber":10,"blockTimestamp":1600000000,"txHash":"0x01","txFrom":"0xbb","txTo":"0xaa","logIndex":0,"event":{"type":"TargetUpdated","params":{"newTarget":"0xcc"}}}
"#;

        let mut source = Event::new(app_state.clone());
        let result = source.consume(stream.as_bytes()).await;
        assert!(matches!(result, Err(Error::OutOfOrder(_))));
        assert!(!app_state
            .database
            .contract_updated
            .exists("0x01")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_restart_skips_applied_events() {
        let (app_state, _) = app_state(StaticLedger::new());

        let mut first = Event::new(app_state.clone());
        assert_eq!(first.consume(RATES.as_bytes()).await.unwrap(), 2);
        let bucket = app_state
            .database
            .daily_det_price
            .get_one("18518")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bucket.count, BigDecimal::from(2));
        assert_eq!(bucket.average_price, BigDecimal::from(200));

        // only the event at the cursor is replayed, and it is a no-op
        let mut second = Event::new(app_state.clone());
        assert_eq!(second.consume(RATES.as_bytes()).await.unwrap(), 1);
        assert_eq!(
            app_state
                .database
                .daily_det_price
                .get_one("18518")
                .await
                .unwrap()
                .unwrap(),
            bucket
        );
    }

    #[tokio::test]
    async fn test_stream_continues_after_cursor() {
        let (app_state, _) = app_state(StaticLedger::new());
        let mut lines = RATES.trim().lines();
        let head = lines.next().unwrap();

        Event::new(app_state.clone()).consume(head.as_bytes()).await.unwrap();
        let mut resumed = Event::new(app_state.clone());
        assert_eq!(resumed.get_last_position().await.unwrap(), Some((10, 0)));
        assert_eq!(resumed.consume(RATES.as_bytes()).await.unwrap(), 2);

        let bucket = app_state
            .database
            .daily_det_price
            .get_one("18518")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bucket.count, BigDecimal::from(2));
        assert_eq!(bucket.average_price, BigDecimal::from(200));
    }
}
