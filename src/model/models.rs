//! Entity documents
//!
//! Amounts are raw on-chain integers carried as `BigDecimal`; derived ratios
//! of the position aggregates are fractional.

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::helpers::{DAY_SECONDS, FIFTEEN_MINUTE_SECONDS};

macro_rules! entity {
    ($model:ty, $name:literal) => {
        impl Entity for $model {
            const NAME: &'static str = $name;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

// =============================================================================
// AUDIT RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub source: String,
    pub from: String,
    pub to: String,
    pub value: BigDecimal,
    pub timestamp: i64,
    pub block: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issued {
    pub id: String,
    pub account: String,
    pub value: BigDecimal,
    pub source: String,
    pub timestamp: i64,
    pub block: i64,
    pub gas_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Burned {
    pub id: String,
    pub account: String,
    pub value: BigDecimal,
    pub source: String,
    pub timestamp: i64,
    pub block: i64,
    pub gas_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fees_Claimed {
    pub id: String,
    pub account: String,
    pub rewards: BigDecimal,
    pub value: BigDecimal,
    pub timestamp: i64,
    pub block: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract_Updated {
    pub id: String,
    pub source: String,
    pub target: String,
    pub timestamp: i64,
    pub block: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vested {
    pub id: String,
    pub beneficiary: String,
    pub value: BigDecimal,
    pub timestamp: i64,
    pub block: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates_Updated {
    pub id: String,
    pub currency_keys: Vec<String>,
    pub new_rates: Vec<BigDecimal>,
    pub timestamp: i64,
    pub block: i64,
    pub from: String,
    pub gas_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position_Changed {
    pub id: String,
    pub trader: String,
    pub amm: String,
    pub margin: BigDecimal,
    pub position_notional: BigDecimal,
    pub exchanged_position_size: BigDecimal,
    pub fee: BigDecimal,
    pub position_size_after: BigDecimal,
    pub realized_pnl: BigDecimal,
    pub unrealized_pnl_after: BigDecimal,
    pub bad_debt: BigDecimal,
    pub liquidation_penalty: BigDecimal,
    pub spot_price: BigDecimal,
    pub funding_payment: BigDecimal,
    pub timestamp: i64,
    pub block: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub maker: String,
    pub taker: String,
    pub trader: String,
    pub margin_amount: BigDecimal,
    pub position_amount: BigDecimal,
    pub is_buy: bool,
    pub maker_balance: String,
    pub taker_balance: String,
    pub timestamp: i64,
    pub block: i64,
}

entity!(Transfer, "Transfer");
entity!(Issued, "Issued");
entity!(Burned, "Burned");
entity!(Fees_Claimed, "FeesClaimed");
entity!(Contract_Updated, "ContractUpdated");
entity!(Vested, "Vested");
entity!(Rates_Updated, "RatesUpdated");
entity!(Position_Changed, "PositionChanged");
entity!(Trade, "Trade");

// =============================================================================
// HOLDERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DET_Holder {
    pub id: String,
    pub account: String,
    pub block: i64,
    pub timestamp: i64,
    pub balance_of: BigDecimal,
    pub collateral: BigDecimal,
    pub transferable: Option<BigDecimal>,
    pub initial_debt_ownership: BigDecimal,
    pub debt_entry_at_index: Option<BigDecimal>,
    pub mints: Option<BigDecimal>,
    pub claims: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt_Snapshot {
    pub id: String,
    pub account: String,
    pub block: i64,
    pub timestamp: i64,
    pub balance_of: Option<BigDecimal>,
    pub collateral: Option<BigDecimal>,
    pub debt_balance_of: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Synth_Holder {
    pub id: String,
    pub synth: String,
    pub balance_of: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward_Escrow_Holder {
    pub id: String,
    pub balance_of: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Global_Metadata {
    pub id: String,
    pub issuers: BigDecimal,
    pub det_holders: BigDecimal,
}

entity!(DET_Holder, "DETHolder");
entity!(Debt_Snapshot, "DebtSnapshot");
entity!(Synth_Holder, "SynthHolder");
entity!(Reward_Escrow_Holder, "RewardEscrowHolder");
entity!(Issuer, "Issuer");
entity!(Global_Metadata, "GlobalMetadata");

// =============================================================================
// ACTIVE STAKERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Active_Staker {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Total_Active_Staker {
    pub id: String,
    pub count: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Total_Daily_Active_Staker {
    pub id: String,
    pub count: BigDecimal,
}

entity!(Active_Staker, "ActiveStaker");
entity!(Total_Active_Staker, "TotalActiveStaker");
entity!(Total_Daily_Active_Staker, "TotalDailyActiveStaker");

// =============================================================================
// RATES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rate_Update {
    pub id: String,
    pub currency_key: String,
    pub synth: String,
    pub rate: BigDecimal,
    pub block: i64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Latest_Rate {
    pub id: String,
    pub rate: BigDecimal,
}

/// Incremental mean of the tracked price inside one `WIDTH`-second bucket.
///
/// `last_event` is the id of the most recent contributing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DET_Price<const WIDTH: i64> {
    pub id: String,
    pub count: BigDecimal,
    pub average_price: BigDecimal,
    #[serde(default)]
    pub last_event: Option<String>,
}

impl<const WIDTH: i64> DET_Price<WIDTH> {
    pub fn new(id: String) -> Self {
        Self {
            id,
            count: BigDecimal::zero(),
            average_price: BigDecimal::zero(),
            last_event: None,
        }
    }
}

pub type Daily_DET_Price = DET_Price<{ DAY_SECONDS }>;
pub type Fifteen_Minute_DET_Price = DET_Price<{ FIFTEEN_MINUTE_SECONDS }>;

entity!(Rate_Update, "RateUpdate");
entity!(Latest_Rate, "LatestRate");
entity!(Daily_DET_Price, "DailyDETPrice");
entity!(Fifteen_Minute_DET_Price, "FifteenMinuteDETPrice");

// =============================================================================
// POSITIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position_Aggregate {
    pub id: String,
    pub account: String,
    pub market: Option<String>,
    pub size: BigDecimal,
    pub total_margin: BigDecimal,
    pub notional: BigDecimal,
    pub total_deposited: BigDecimal,
    pub avg_entry_price: BigDecimal,
    pub avg_leverage: BigDecimal,
    pub last_price: BigDecimal,
    pub last_position_size: BigDecimal,
    pub cumulative_size: BigDecimal,
    pub block: i64,
    pub timestamp: i64,
    #[serde(default)]
    pub last_event: Option<String>,
}

impl Position_Aggregate {
    pub fn empty(id: String, account: String, market: Option<String>) -> Self {
        Self {
            id,
            account,
            market,
            size: BigDecimal::zero(),
            total_margin: BigDecimal::zero(),
            notional: BigDecimal::zero(),
            total_deposited: BigDecimal::zero(),
            avg_entry_price: BigDecimal::zero(),
            avg_leverage: BigDecimal::zero(),
            last_price: BigDecimal::zero(),
            last_position_size: BigDecimal::zero(),
            cumulative_size: BigDecimal::zero(),
            block: 0,
            timestamp: 0,
            last_event: None,
        }
    }

    /// Zero state: same identity, every running statistic cleared.
    pub fn reset(&self) -> Self {
        Self::empty(self.id.to_owned(), self.account.to_owned(), self.market.to_owned())
    }
}

entity!(Position_Aggregate, "PositionAggregate");

// =============================================================================
// SYNC
// =============================================================================

/// Position of the last applied event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub block: i64,
    pub log_index: i64,
    pub timestamp: DateTime<Utc>,
}

entity!(Block, "Block");
