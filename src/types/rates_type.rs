use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rates_Updated_Type {
    #[serde(alias = "currencyKeys")]
    pub currency_keys: Vec<String>,
    #[serde(alias = "newRates")]
    pub new_rates: Vec<String>,
}
