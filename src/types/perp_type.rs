use serde::{Deserialize, Serialize};

/// ClearingHouse `PositionChanged`; `position_size_after` is authoritative.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Position_Changed_Type {
    pub trader: String,
    pub amm: String,
    pub margin: String,
    #[serde(alias = "positionNotional")]
    pub position_notional: String,
    #[serde(alias = "exchangedPositionSize")]
    pub exchanged_position_size: String,
    pub fee: String,
    #[serde(alias = "positionSizeAfter")]
    pub position_size_after: String,
    #[serde(alias = "realizedPnl")]
    pub realized_pnl: String,
    #[serde(alias = "unrealizedPnlAfter")]
    pub unrealized_pnl_after: String,
    #[serde(alias = "badDebt")]
    pub bad_debt: String,
    #[serde(alias = "liquidationPenalty")]
    pub liquidation_penalty: String,
    #[serde(alias = "spotPrice")]
    pub spot_price: String,
    #[serde(alias = "fundingPayment")]
    pub funding_payment: String,
}

/// Perpetual `LogTrade`; `is_buy` is from the maker's side and the balances
/// are packed bytes32 words.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Log_Trade_Type {
    pub maker: String,
    pub taker: String,
    pub trader: String,
    #[serde(alias = "marginAmount")]
    pub margin_amount: String,
    #[serde(alias = "positionAmount")]
    pub position_amount: String,
    #[serde(alias = "isBuy")]
    pub is_buy: bool,
    #[serde(alias = "makerBalance")]
    pub maker_balance: String,
    #[serde(alias = "takerBalance")]
    pub taker_balance: String,
}
