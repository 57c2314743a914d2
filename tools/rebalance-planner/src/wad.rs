//! 18-decimal fixed point.

use alloy_primitives::{I256, U256};

use crate::errors::RebalanceError;

pub const DECIMALS: usize = 18;

/// 1.0
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Parse a plain decimal ("2000", "0.002", ".5") into WAD.
pub fn parse_wad(input: &str) -> Result<U256, RebalanceError> {
    let invalid = || RebalanceError::InvalidDecimal(input.to_string());
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !digits(whole)
        || !digits(fraction)
        || fraction.len() > DECIMALS
    {
        return Err(invalid());
    }

    let whole = match whole {
        "" => U256::ZERO,
        whole => whole.parse::<U256>().map_err(|_| invalid())?,
    };
    let fraction = match fraction {
        "" => U256::ZERO,
        fraction => format!("{fraction:0<DECIMALS$}").parse::<U256>().map_err(|_| invalid())?,
    };
    whole
        .checked_mul(WAD)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Render WAD as a decimal without trailing zeros.
pub fn format_wad(value: U256) -> String {
    let whole = value / WAD;
    let fraction = (value % WAD).to::<u64>();
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{fraction:0>DECIMALS$}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

pub fn format_signed_wad(value: I256) -> String {
    let magnitude = format_wad(value.unsigned_abs());
    if value.is_negative() {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wad() {
        assert_eq!(parse_wad("2000").unwrap(), U256::from(2000u64) * WAD);
        assert_eq!(parse_wad("0.002").unwrap(), U256::from(2_000_000_000_000_000u64));
        assert_eq!(parse_wad(".5").unwrap(), WAD / U256::from(2u64));
        assert_eq!(parse_wad("1.").unwrap(), WAD);
        assert_eq!(parse_wad("0.000000000000000001").unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_parse_wad_rejects_garbage() {
        for input in ["", ".", "-1", "1.2.3", "abc", "1e18", "0x10", "0.0000000000000000001"] {
            assert_eq!(parse_wad(input), Err(RebalanceError::InvalidDecimal(input.to_string())), "{input}");
        }
    }

    #[test]
    fn test_format_wad() {
        assert_eq!(format_wad(U256::from(2000u64) * WAD), "2000");
        assert_eq!(format_wad(U256::from(2_000_000_000_000_000u64)), "0.002");
        assert_eq!(format_wad(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_wad(U256::ZERO), "0");
    }

    #[test]
    fn test_format_signed_wad() {
        let half = I256::from_raw(WAD / U256::from(2u64));
        assert_eq!(format_signed_wad(half), "0.5");
        assert_eq!(format_signed_wad(-half), "-0.5");
    }
}
