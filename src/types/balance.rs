use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::error::Error;

/// Account balance packed into one bytes32 word:
///
/// | byte  | content                 |
/// |-------|-------------------------|
/// | 0     | margin is positive flag |
/// | 1-15  | margin (uint120)        |
/// | 16    | position positive flag  |
/// | 17-31 | position (uint120)      |
///
/// Only the magnitudes are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub margin: BigDecimal,
    pub position: BigDecimal,
}

impl Balance {
    pub fn from_bytes32(value: &str) -> Result<Balance, Error> {
        let hex = value.strip_prefix("0x").unwrap_or(value);
        if hex.len() != 64 || !hex.is_ascii() {
            return Err(Error::ParseMessage(format!(
                "balance word must be 32 bytes, got {}",
                value
            )));
        }

        let mut bytes = [0u8; 32];
        for (index, slot) in bytes.iter_mut().enumerate() {
            let pair = &hex[index * 2..index * 2 + 2];
            *slot = u8::from_str_radix(pair, 16).map_err(|_| {
                Error::ParseMessage(format!("invalid balance word {}", value))
            })?;
        }

        Ok(Balance {
            margin: uint120(&bytes[1..16])?,
            position: uint120(&bytes[17..32])?,
        })
    }
}

fn uint120(bytes: &[u8]) -> Result<BigDecimal, Error> {
    let value = bytes
        .iter()
        .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte));
    Ok(BigDecimal::from_str(&value.to_string())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(margin_flag: u8, margin: u128, position_flag: u8, position: u128) -> String {
        let mut bytes = [0u8; 32];
        bytes[0] = margin_flag;
        bytes[1..16].copy_from_slice(&margin.to_be_bytes()[1..16]);
        bytes[16] = position_flag;
        bytes[17..32].copy_from_slice(&position.to_be_bytes()[1..16]);
        format!(
            "0x{}",
            bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>()
        )
    }

    #[test]
    fn test_sign_flags_do_not_leak_into_magnitudes() {
        let balance = Balance::from_bytes32(&word(0, 5_000, 1, 50)).unwrap();

        assert_eq!(balance.margin, BigDecimal::from(5_000));
        assert_eq!(balance.position, BigDecimal::from(50));
    }

    #[test]
    fn test_decode_large_values() {
        let margin = 1_000_000_000_000_000_000_000u128;
        let balance = Balance::from_bytes32(&word(1, margin, 0, 3)).unwrap();

        assert_eq!(
            balance.margin,
            BigDecimal::from_str("1000000000000000000000").unwrap()
        );
        assert_eq!(balance.position, BigDecimal::from(3));
    }

    #[test]
    fn test_rejects_short_word() {
        assert!(Balance::from_bytes32("0x01").is_err());
    }
}
