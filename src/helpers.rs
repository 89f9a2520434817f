use std::{fmt, io, str::FromStr};

use bigdecimal::BigDecimal;

use crate::error::Error;

pub const DAY_SECONDS: i64 = 86_400;
pub const FIFTEEN_MINUTE_SECONDS: i64 = 900;
pub const SINGLETON_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store_Backend {
    Postgres,
    Memory,
}

impl fmt::Display for Store_Backend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Store_Backend::Postgres => write!(f, "postgres"),
            Store_Backend::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for Store_Backend {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Store_Backend, Self::Err> {
        match value {
            "postgres" => Ok(Store_Backend::Postgres),
            "memory" => Ok(Store_Backend::Memory),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                "Store backend not supported",
            )),
        }
    }
}

pub fn parse_tuple_string(data: String) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    let Some(str) = data.trim().strip_prefix('(') else {
        return items;
    };

    for c in str.split(",(") {
        if let Some(index) = c.find(')') {
            let tuple_data = &c[0..index];
            items.push(tuple_data.to_owned());
        }
    }

    items
}

/// Audit records are keyed by `{txHash}-{logIndex}`.
pub fn event_id(tx_hash: &str, log_index: i64) -> String {
    format!("{}-{}", tx_hash, log_index)
}

pub fn bucket_id(timestamp: i64, width: i64) -> i64 {
    timestamp.div_euclid(width)
}

pub fn day_id(timestamp: i64) -> i64 {
    bucket_id(timestamp, DAY_SECONDS)
}

/// First four bytes of the transaction calldata as lowercase `0x`-hex.
pub fn tx_selector(input: &str) -> Option<String> {
    let hex = input.strip_prefix("0x").unwrap_or(input);
    let selector = hex.get(0..8)?;
    if !selector.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", selector.to_lowercase()))
}

/// Currency keys travel as bytes32; a key that is not hex is taken verbatim.
pub fn bytes32_to_string(value: &str) -> String {
    let Some(hex) = value.strip_prefix("0x") else {
        return value.to_owned();
    };

    let bytes = (0..hex.len())
        .step_by(2)
        .filter_map(|i| hex.get(i..i + 2))
        .map(|pair| u8::from_str_radix(pair, 16))
        .collect::<Result<Vec<u8>, _>>();

    match bytes {
        Ok(bytes) => {
            let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
            String::from_utf8_lossy(&bytes[..end]).into_owned()
        },
        Err(_) => value.to_owned(),
    }
}

/// Right-pads an ASCII currency key into a bytes32 word.
pub fn str_to_bytes32(value: &str) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (slot, byte) in bytes.iter_mut().zip(value.as_bytes()) {
        *slot = *byte;
    }
    bytes
}

pub fn parse_amount(value: &str) -> Result<BigDecimal, Error> {
    Ok(BigDecimal::from_str(value.trim())?)
}

/// 10^18, one whole unit of an 18-decimal token.
pub fn unit() -> BigDecimal {
    BigDecimal::from(1_000_000_000_000_000_000u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tuple_string() {
        let items = parse_tuple_string(String::from("(a,b),(c,d)"));
        assert_eq!(items, vec![String::from("a,b"), String::from("c,d")]);
        assert!(parse_tuple_string(String::new()).is_empty());
    }

    #[test]
    fn test_bucket_ids() {
        assert_eq!(day_id(0), 0);
        assert_eq!(day_id(86_399), 0);
        assert_eq!(day_id(86_400), 1);
        assert_eq!(bucket_id(899, FIFTEEN_MINUTE_SECONDS), 0);
        assert_eq!(bucket_id(900, FIFTEEN_MINUTE_SECONDS), 1);
        assert_eq!(bucket_id(1_600_000_000, FIFTEEN_MINUTE_SECONDS), 1_777_777);
    }

    #[test]
    fn test_tx_selector() {
        assert_eq!(
            tx_selector("0xAF086C7E00000000").as_deref(),
            Some("0xaf086c7e")
        );
        assert_eq!(tx_selector("0x1234"), None);
        assert_eq!(tx_selector("0xzz086c7e"), None);
    }

    #[test]
    fn test_bytes32_round_trip_for_currency_keys() {
        let word = str_to_bytes32("dUSD");
        let hex = format!(
            "0x{}",
            word.iter().map(|b| format!("{:02x}", b)).collect::<String>()
        );
        assert_eq!(bytes32_to_string(&hex), "dUSD");
        assert_eq!(bytes32_to_string("DET"), "DET");
    }

    #[test]
    fn test_event_id() {
        assert_eq!(event_id("0xabc", 7), "0xabc-7");
    }
}
