use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transfer_Type {
    pub from: String,
    pub to: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Target_Updated_Type {
    #[serde(alias = "newTarget")]
    pub new_target: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Vested_Type {
    pub beneficiary: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Issued_Type {
    pub account: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Burned_Type {
    pub account: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Fees_Claimed_Type {
    pub account: String,
    #[serde(alias = "dUSDAmount")]
    pub d_usd_amount: String,
    #[serde(alias = "detRewards")]
    pub det_rewards: String,
}
