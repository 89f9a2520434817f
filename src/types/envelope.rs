use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    Burned_Type, Fees_Claimed_Type, Issued_Type, Log_Trade_Type,
    Position_Changed_Type, Rates_Updated_Type, Target_Updated_Type,
    Transfer_Type, Vested_Type,
};

fn zero() -> String {
    String::from("0")
}

/// One decoded log as delivered by the host, with its block and
/// transaction context.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event_Envelope {
    pub address: String,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub tx_hash: String,
    pub tx_from: String,
    pub tx_to: Option<String>,
    #[serde(default)]
    pub tx_input: String,
    #[serde(default = "zero")]
    pub gas_price: String,
    pub log_index: i64,
    pub event: Event_Kind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", content = "params")]
pub enum Event_Kind {
    #[serde(rename = "DETTransfer")]
    DET_Transfer(Transfer_Type),
    #[serde(rename = "SynthTransfer")]
    Synth_Transfer(Transfer_Type),
    #[serde(rename = "TargetUpdated")]
    Target_Updated(Target_Updated_Type),
    #[serde(rename = "Vested", alias = "VestingEntryCreated")]
    Vested(Vested_Type),
    #[serde(rename = "Issued")]
    Issued(Issued_Type),
    #[serde(rename = "Burned")]
    Burned(Burned_Type),
    #[serde(rename = "FeesClaimed")]
    Fees_Claimed(Fees_Claimed_Type),
    #[serde(rename = "RatesUpdated")]
    Rates_Updated(Rates_Updated_Type),
    #[serde(rename = "PositionChanged")]
    Position_Changed(Position_Changed_Type),
    #[serde(rename = "LogTrade")]
    Log_Trade(Log_Trade_Type),
}

impl fmt::Display for Event_Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Event_Kind::DET_Transfer(_) => write!(f, "DETTransfer"),
            Event_Kind::Synth_Transfer(_) => write!(f, "SynthTransfer"),
            Event_Kind::Target_Updated(_) => write!(f, "TargetUpdated"),
            Event_Kind::Vested(_) => write!(f, "Vested"),
            Event_Kind::Issued(_) => write!(f, "Issued"),
            Event_Kind::Burned(_) => write!(f, "Burned"),
            Event_Kind::Fees_Claimed(_) => write!(f, "FeesClaimed"),
            Event_Kind::Rates_Updated(_) => write!(f, "RatesUpdated"),
            Event_Kind::Position_Changed(_) => write!(f, "PositionChanged"),
            Event_Kind::Log_Trade(_) => write!(f, "LogTrade"),
        }
    }
}

impl Event_Envelope {
    /// Ordering key inside one stream.
    pub fn position(&self) -> (i64, i64) {
        (self.block_number, self.log_index)
    }

    /// Account that sent the transaction, lowercased.
    pub fn sender(&self) -> String {
        self.tx_from.to_lowercase()
    }

    /// Contract the transaction was sent to; issuance and burns are called on
    /// the token itself.
    pub fn recipient(&self) -> Option<String> {
        self.tx_to.as_ref().map(|to| to.to_lowercase())
    }
}
