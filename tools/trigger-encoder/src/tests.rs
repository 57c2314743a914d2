#[cfg(test)]
mod tests {
    use crate::encoder::{encode, encode_trigger};
    use account_guard::decoder::{decode, decode_header, decode_trigger};
    use alloy_primitives::U256;
    use automation_types::{CloseTo, CodecError, PayloadFault, Trigger, TriggerKind, TriggerParams};

    fn sample(kind: TriggerKind) -> TriggerParams {
        match kind {
            TriggerKind::StopLossToCollateral => {
                TriggerParams::StopLoss { close_to: CloseTo::Collateral, stop_loss_level: U256::from(16_000u64) }
            }
            TriggerKind::StopLossToDai => {
                TriggerParams::StopLoss { close_to: CloseTo::Dai, stop_loss_level: U256::from(14_550u64) }
            }
            TriggerKind::AutoTakeProfitToCollateral => TriggerParams::AutoTakeProfit {
                close_to: CloseTo::Collateral,
                execution_price: U256::from(3_500u64) * U256::from(10u64).pow(U256::from(18u64)),
                max_base_fee_gwei: u32::MAX,
            },
            TriggerKind::AutoTakeProfitToDai => TriggerParams::AutoTakeProfit {
                close_to: CloseTo::Dai,
                execution_price: U256::MAX,
                max_base_fee_gwei: 0,
            },
            TriggerKind::BasicBuy => TriggerParams::BasicBuy {
                exec_coll_ratio: U256::from(20_000u64),
                target_coll_ratio: U256::from(17_500u64),
                max_buy_price: U256::from(2_000u64),
                deviation: u64::MAX,
                max_base_fee_gwei: 300,
            },
            TriggerKind::BasicSell => TriggerParams::BasicSell {
                exec_coll_ratio: U256::from(15_000u64),
                target_coll_ratio: U256::from(17_500u64),
                min_sell_price: U256::ZERO,
                deviation: 100,
                max_base_fee_gwei: 250,
            },
        }
    }

    #[test]
    fn test_round_trip_every_kind() {
        for kind in TriggerKind::ALL {
            let trigger = Trigger::new(U256::from(1_234u64), sample(kind));
            let bytes = encode_trigger(&trigger);
            assert_eq!(bytes.len(), kind.encoded_len());

            let header = decode_header(&bytes).unwrap();
            assert_eq!(header, trigger.header());

            let decoded = decode(kind.discriminant(), &bytes).unwrap();
            assert_eq!(decoded.vault_id, trigger.vault_id);
            assert_eq!(decoded.fields, trigger.params.to_fields());

            assert_eq!(decode_trigger(&bytes).unwrap(), trigger);
        }
    }

    #[test]
    fn test_positional_and_typed_encoders_agree() {
        let trigger = Trigger::new(U256::from(77u64), sample(TriggerKind::BasicSell));
        let positional = encode(trigger.vault_id, 4, &trigger.params.to_fields()).unwrap();
        assert_eq!(positional, encode_trigger(&trigger));
    }

    #[test]
    fn test_unsupported_type_both_ways() {
        assert_eq!(
            encode(U256::from(1u64), 99, &[U256::from(1u64)]),
            Err(CodecError::UnsupportedTriggerType(99))
        );

        let mut bytes = encode(U256::from(1u64), 1, &[U256::from(1u64)]).unwrap();
        bytes[63] = 99;
        assert_eq!(decode_header(&bytes).unwrap().trigger_type, 99);
        assert_eq!(decode(99, &bytes), Err(CodecError::UnsupportedTriggerType(99)));
        assert_eq!(decode_trigger(&bytes), Err(CodecError::UnsupportedTriggerType(99)));
    }

    #[test]
    fn test_encode_rejects_wrong_arity() {
        assert_eq!(
            encode(U256::from(1u64), 3, &[U256::from(1u64); 4]),
            Err(CodecError::MalformedPayload(PayloadFault::Arity { expected: 5, actual: 4 }))
        );
    }

    #[test]
    fn test_encode_rejects_overwide_fields() {
        let fields = [U256::from(1u64), U256::from(u64::from(u32::MAX) + 1)];
        assert_eq!(
            encode(U256::from(1u64), 7, &fields),
            Err(CodecError::MalformedPayload(PayloadFault::FieldOverflow { field: "maxBaseFeeInGwei" }))
        );

        let fields = [
            U256::from(1u64),
            U256::from(1u64),
            U256::from(1u64),
            U256::from(u64::MAX) + U256::from(1u64),
            U256::from(1u64),
        ];
        assert_eq!(
            encode(U256::from(1u64), 4, &fields),
            Err(CodecError::MalformedPayload(PayloadFault::FieldOverflow { field: "deviation" }))
        );
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let bytes = encode_trigger(&Trigger::new(U256::from(5u64), sample(TriggerKind::BasicBuy)));
        assert!(matches!(
            decode(3, &bytes[..bytes.len() - 1]),
            Err(CodecError::MalformedPayload(PayloadFault::Length { .. }))
        ));
    }
}
