//! Human-readable descriptor lines for encoded triggers.

use alloy_primitives::{Address, U256};
use automation_types::{CodecError, TriggerParams};

use crate::decoder::{decode, decode_header};

/// Describe an encoded trigger bound to `command`.
///
/// Ratios and deviation are basis-point-like values shown as percentages (×10⁻²); prices are
/// 18-decimal amounts truncated to two decimals; the base fee stays an integer in GWEI.
/// The stop-loss level is rendered as a percentage like the other ratios, not as a raw value.
pub fn describe(bytes: &[u8], command: Address) -> Result<Vec<String>, CodecError> {
    let header = decode_header(bytes)?;
    let kind = header.kind()?;
    let decoded = decode(kind.discriminant(), bytes)?;
    let params = TriggerParams::from_fields(kind, &decoded.fields)?;

    let mut lines = vec![
        format!("Vault ID: {}", header.vault_id),
        format!("Trigger Type: {}", header.trigger_type),
        format!("Command Address: {command}"),
    ];
    match &params {
        TriggerParams::StopLoss { stop_loss_level, .. } => {
            lines.push(format!("Stop Loss Level: {}%", format_percent(*stop_loss_level)));
        }
        TriggerParams::AutoTakeProfit { execution_price, max_base_fee_gwei, .. } => {
            lines.push(format!("Execution Price: {}", format_price(*execution_price)));
            lines.push(format!("MaxBaseFee: {max_base_fee_gwei} GWEI"));
        }
        TriggerParams::BasicBuy {
            exec_coll_ratio,
            target_coll_ratio,
            max_buy_price,
            deviation,
            max_base_fee_gwei,
        } => lines.extend(ratio_band_lines(
            *exec_coll_ratio,
            *target_coll_ratio,
            ("Max Buy Price", *max_buy_price),
            *deviation,
            *max_base_fee_gwei,
        )),
        TriggerParams::BasicSell {
            exec_coll_ratio,
            target_coll_ratio,
            min_sell_price,
            deviation,
            max_base_fee_gwei,
        } => lines.extend(ratio_band_lines(
            *exec_coll_ratio,
            *target_coll_ratio,
            ("Min Sell Price", *min_sell_price),
            *deviation,
            *max_base_fee_gwei,
        )),
    }
    Ok(lines)
}

fn ratio_band_lines(
    exec_coll_ratio: U256,
    target_coll_ratio: U256,
    (price_label, price): (&str, U256),
    deviation: u64,
    max_base_fee_gwei: u32,
) -> [String; 5] {
    [
        format!("Execution Ratio: {}%", format_percent(exec_coll_ratio)),
        format!("Target Ratio: {}%", format_percent(target_coll_ratio)),
        format!("{price_label}: {}", format_price(price)),
        format!("Deviation: {}%", format_percent(U256::from(deviation))),
        format!("MaxBaseFee: {max_base_fee_gwei} GWEI"),
    ]
}

/// `value × 10⁻²` without trailing zeros: 15000 → "150", 15050 → "150.5".
pub fn format_percent(value: U256) -> String {
    let hundred = U256::from(100u64);
    let whole = value / hundred;
    let cents = (value % hundred).to::<u64>();
    match cents {
        0 => whole.to_string(),
        c if c % 10 == 0 => format!("{whole}.{}", c / 10),
        c => format!("{whole}.{c:02}"),
    }
}

/// `value × 10⁻¹⁸` truncated to two decimals: 1_234.567e18 → "1234.56".
pub fn format_price(value: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(18u64));
    let whole = value / unit;
    let cents = ((value % unit) / U256::from(10u64).pow(U256::from(16u64))).to::<u64>();
    format!("{whole}.{cents:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(values: &[U256]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes::<32>()).collect()
    }

    fn wad(whole: u64, hundredths: u64) -> U256 {
        U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
            + U256::from(hundredths) * U256::from(10u64).pow(U256::from(16u64))
    }

    const COMMAND: Address = Address::repeat_byte(0x11);

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(U256::from(15_000u64)), "150");
        assert_eq!(format_percent(U256::from(15_050u64)), "150.5");
        assert_eq!(format_percent(U256::from(15_055u64)), "150.55");
        assert_eq!(format_percent(U256::from(5u64)), "0.05");
        assert_eq!(format_percent(U256::ZERO), "0");
    }

    #[test]
    fn test_format_price_truncates() {
        assert_eq!(format_price(wad(1_234, 56) + U256::from(9_999u64)), "1234.56");
        assert_eq!(format_price(wad(2_000, 0)), "2000.00");
        assert_eq!(format_price(U256::from(10u64).pow(U256::from(16u64)) - U256::from(1u64)), "0.00");
    }

    #[test]
    fn test_describe_stop_loss() {
        let bytes = words(&[U256::from(7u64), U256::from(1u64), U256::from(16_000u64)]);
        let lines = describe(&bytes, COMMAND).unwrap();
        assert_eq!(
            lines,
            vec![
                "Vault ID: 7".to_string(),
                "Trigger Type: 1".to_string(),
                format!("Command Address: {COMMAND}"),
                "Stop Loss Level: 160%".to_string(),
            ]
        );
    }

    #[test]
    fn test_describe_basic_buy() {
        let bytes = words(&[
            U256::from(12u64),
            U256::from(3u64),
            U256::from(15_000u64),
            U256::from(17_550u64),
            wad(2_500, 75),
            U256::from(50u64),
            U256::from(300u64),
        ]);
        let lines = describe(&bytes, COMMAND).unwrap();
        assert_eq!(
            &lines[3..],
            &[
                "Execution Ratio: 150%".to_string(),
                "Target Ratio: 175.5%".to_string(),
                "Max Buy Price: 2500.75".to_string(),
                "Deviation: 0.5%".to_string(),
                "MaxBaseFee: 300 GWEI".to_string(),
            ]
        );
    }

    #[test]
    fn test_describe_basic_sell_labels_min_price() {
        let bytes = words(&[
            U256::from(12u64),
            U256::from(4u64),
            U256::from(20_000u64),
            U256::from(18_000u64),
            wad(1_800, 0),
            U256::from(100u64),
            U256::from(200u64),
        ]);
        let lines = describe(&bytes, COMMAND).unwrap();
        assert_eq!(lines[5], "Min Sell Price: 1800.00");
        assert_eq!(lines[6], "Deviation: 1%");
    }

    #[test]
    fn test_describe_auto_take_profit() {
        let bytes = words(&[U256::from(3u64), U256::from(8u64), wad(4_321, 9), U256::from(120u64)]);
        let lines = describe(&bytes, COMMAND).unwrap();
        assert_eq!(&lines[3..], &["Execution Price: 4321.09".to_string(), "MaxBaseFee: 120 GWEI".to_string()]);
    }

    #[test]
    fn test_describe_unsupported() {
        let bytes = words(&[U256::from(3u64), U256::from(99u64), U256::ZERO]);
        assert_eq!(describe(&bytes, COMMAND), Err(CodecError::UnsupportedTriggerType(99)));
    }
}
