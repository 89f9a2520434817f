use std::{str::FromStr, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use ethers::{
    abi::{decode, encode, ParamType, Token},
    types::{Address, Bytes, U256},
    utils::id,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{Ledger, LedgerCall, LedgerValue, Read};
use crate::{
    configuration::Config,
    error::Error,
    helpers::{bytes32_to_string, str_to_bytes32},
};

/// `eth_call` over JSON-RPC against a node with historical state.
#[derive(Debug)]
pub struct RpcLedger {
    client: Client,
    url: Url,
}

#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallObject, String),
}

#[derive(Debug, Serialize)]
struct CallObject {
    to: Address,
    data: Bytes,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Bytes>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcLedger {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let url = Url::parse(&config.rpc_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(RpcLedger { client, url })
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn call(
        &self,
        call: &LedgerCall,
        block: i64,
    ) -> Result<Read<LedgerValue>, Error> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (
                CallObject {
                    to: parse_address(call.contract())?,
                    data: encode_call(call)?,
                },
                format!("0x{:x}", block),
            ),
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await?;

        if let Some(error) = response.error {
            if is_revert(&error) {
                debug!(
                    "{} on {} reverted at block {}: {}",
                    call.signature(),
                    call.contract(),
                    block,
                    error.message
                );
                return Ok(Read::Reverted);
            }

            return Err(Error::Ledger(format!(
                "{} on {} failed: {} ({})",
                call.signature(),
                call.contract(),
                error.message,
                error.code
            )));
        }

        let data = response
            .result
            .context("eth_call returned neither result nor error")?;

        match decode_value(call, &data) {
            Some(value) => Ok(Read::Value(value)),
            None => Ok(Read::Reverted),
        }
    }
}

pub fn is_revert(error: &RpcError) -> bool {
    error.code == 3 || error.message.to_lowercase().contains("revert")
}

fn parse_address(value: &str) -> Result<Address, Error> {
    Address::from_str(value).map_err(|e| {
        Error::Ledger(format!("invalid address {}: {}", value, e))
    })
}

pub fn encode_call(call: &LedgerCall) -> Result<Bytes, Error> {
    let tokens = match call {
        LedgerCall::BalanceOf { account, .. }
        | LedgerCall::Collateral { account, .. }
        | LedgerCall::Transferable { account, .. }
        | LedgerCall::IssuanceData { account, .. } => {
            vec![Token::Address(parse_address(account)?)]
        },
        LedgerCall::Resolver { .. }
        | LedgerCall::CurrencyKey { .. }
        | LedgerCall::DTrade { .. } => vec![],
        LedgerCall::GetAddress { name, .. } => {
            vec![Token::FixedBytes(str_to_bytes32(name).to_vec())]
        },
        LedgerCall::DebtLedger { index, .. } => {
            let index = U256::from_dec_str(index).map_err(|e| {
                Error::Ledger(format!("invalid index {}: {}", index, e))
            })?;
            vec![Token::Uint(index)]
        },
        LedgerCall::DebtBalanceOf {
            account, currency, ..
        } => vec![
            Token::Address(parse_address(account)?),
            Token::FixedBytes(str_to_bytes32(currency).to_vec()),
        ],
    };

    let mut data = id(call.signature()).to_vec();
    data.extend(encode(&tokens));

    Ok(Bytes::from(data))
}

/// Empty or malformed return data is treated the same as a revert.
pub fn decode_value(call: &LedgerCall, data: &[u8]) -> Option<LedgerValue> {
    let kinds = match call {
        LedgerCall::BalanceOf { .. }
        | LedgerCall::Collateral { .. }
        | LedgerCall::Transferable { .. }
        | LedgerCall::DebtLedger { .. }
        | LedgerCall::DebtBalanceOf { .. } => vec![ParamType::Uint(256)],
        LedgerCall::Resolver { .. }
        | LedgerCall::GetAddress { .. }
        | LedgerCall::DTrade { .. } => vec![ParamType::Address],
        LedgerCall::CurrencyKey { .. } => vec![ParamType::FixedBytes(32)],
        LedgerCall::IssuanceData { .. } => {
            vec![ParamType::Uint(256), ParamType::Uint(256)]
        },
    };

    let tokens = decode(&kinds, data).ok()?;

    match (call, tokens.as_slice()) {
        (LedgerCall::IssuanceData { .. }, [Token::Uint(ownership), Token::Uint(index)]) => {
            Some(LedgerValue::IssuanceData {
                initial_debt_ownership: to_decimal(ownership)?,
                debt_entry_index: to_decimal(index)?,
            })
        },
        (_, [Token::Uint(value)]) => Some(LedgerValue::Uint(to_decimal(value)?)),
        (_, [Token::Address(address)]) => {
            Some(LedgerValue::Address(format!("{:?}", address)))
        },
        (_, [Token::FixedBytes(bytes)]) => {
            let hex = bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>();
            Some(LedgerValue::Bytes32(bytes32_to_string(&format!("0x{}", hex))))
        },
        _ => None,
    }
}

fn to_decimal(value: &U256) -> Option<BigDecimal> {
    BigDecimal::from_str(&value.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> LedgerCall {
        LedgerCall::BalanceOf {
            contract: String::from("0x971e78e0c92392a4e39099835cf7e6ab535b2227"),
            account: String::from("0xb671f2210b1f6621a2607ea63e6b2dc3e2464d1f"),
        }
    }

    #[test]
    fn test_encode_balance_of() {
        let data = encode_call(&call()).unwrap();
        assert_eq!(&data[0..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(data[35], 0x1f);
    }

    #[test]
    fn test_decode_uint_and_empty_result() {
        let mut word = [0u8; 32];
        word[31] = 42;
        assert_eq!(
            decode_value(&call(), &word),
            Some(LedgerValue::Uint(BigDecimal::from(42)))
        );
        assert_eq!(decode_value(&call(), &[]), None);
    }

    #[test]
    fn test_decode_currency_key() {
        let call = LedgerCall::CurrencyKey {
            contract: String::from("0x971e78e0c92392a4e39099835cf7e6ab535b2227"),
        };
        let data = encode(&[Token::FixedBytes(str_to_bytes32("dUSD").to_vec())]);
        assert_eq!(
            decode_value(&call, &data),
            Some(LedgerValue::Bytes32(String::from("dUSD")))
        );
    }

    #[test]
    fn test_revert_classification() {
        let revert = RpcError {
            code: -32000,
            message: String::from("execution reverted"),
        };
        let missing_state = RpcError {
            code: -32000,
            message: String::from("missing trie node"),
        };
        assert!(is_revert(&revert));
        assert!(is_revert(&RpcError {
            code: 3,
            message: String::new()
        }));
        assert!(!is_revert(&missing_state));
    }
}
