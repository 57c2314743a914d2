use alloy_primitives::U256;

use crate::errors::{CodecError, PayloadFault};

/// Every field occupies one big-endian word on the wire.
pub const WORD: usize = 32;

/// `vaultId` + `triggerType`.
pub const HEADER_LEN: usize = 2 * WORD;

/// Trigger kinds supported by the automation service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TriggerKind {
    StopLossToCollateral = 1,
    StopLossToDai = 2,
    BasicBuy = 3,
    BasicSell = 4,
    AutoTakeProfitToCollateral = 7,
    AutoTakeProfitToDai = 8,
}

/// Declared width of a positional field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    U16,
    U32,
    U64,
    U256,
}

impl Width {
    pub const fn bits(self) -> usize {
        match self {
            Width::U16 => 16,
            Width::U32 => 32,
            Width::U64 => 64,
            Width::U256 => 256,
        }
    }

    /// Whether `value` is representable in this width.
    pub fn fits(self, value: U256) -> bool {
        value.bit_len() <= self.bits()
    }
}

/// A named positional field of a trigger layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub width: Width,
}

const fn field(name: &'static str, width: Width) -> Field {
    Field { name, width }
}

/// Common header shared by every kind.
pub const HEADER_FIELDS: [Field; 2] =
    [field("vaultId", Width::U256), field("triggerType", Width::U16)];

const STOP_LOSS_FIELDS: &[Field] = &[field("stopLossLevel", Width::U256)];

const AUTO_TAKE_PROFIT_FIELDS: &[Field] = &[
    field("executionPrice", Width::U256),
    field("maxBaseFeeInGwei", Width::U32),
];

const BASIC_BUY_FIELDS: &[Field] = &[
    field("execCollRatio", Width::U256),
    field("targetCollRatio", Width::U256),
    field("maxBuyPrice", Width::U256),
    field("deviation", Width::U64),
    field("maxBaseFeeInGwei", Width::U32),
];

const BASIC_SELL_FIELDS: &[Field] = &[
    field("execCollRatio", Width::U256),
    field("targetCollRatio", Width::U256),
    field("minSellPrice", Width::U256),
    field("deviation", Width::U64),
    field("maxBaseFeeInGwei", Width::U32),
];

impl TriggerKind {
    pub const ALL: [TriggerKind; 6] = [
        TriggerKind::StopLossToCollateral,
        TriggerKind::StopLossToDai,
        TriggerKind::BasicBuy,
        TriggerKind::BasicSell,
        TriggerKind::AutoTakeProfitToCollateral,
        TriggerKind::AutoTakeProfitToDai,
    ];

    /// Fields that follow the common header, in wire order.
    pub const fn fields(self) -> &'static [Field] {
        match self {
            TriggerKind::StopLossToCollateral | TriggerKind::StopLossToDai => STOP_LOSS_FIELDS,
            TriggerKind::AutoTakeProfitToCollateral | TriggerKind::AutoTakeProfitToDai => {
                AUTO_TAKE_PROFIT_FIELDS
            }
            TriggerKind::BasicBuy => BASIC_BUY_FIELDS,
            TriggerKind::BasicSell => BASIC_SELL_FIELDS,
        }
    }

    /// Exact encoded length, header included.
    pub const fn encoded_len(self) -> usize {
        HEADER_LEN + self.fields().len() * WORD
    }

    pub const fn discriminant(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for TriggerKind {
    type Error = CodecError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        use TriggerKind::*;
        let kind = match value {
            1 => StopLossToCollateral,
            2 => StopLossToDai,
            3 => BasicBuy,
            4 => BasicSell,
            7 => AutoTakeProfitToCollateral,
            8 => AutoTakeProfitToDai,
            _ => return Err(CodecError::UnsupportedTriggerType(value)),
        };
        Ok(kind)
    }
}

/// Which asset a closing trigger exits into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseTo {
    Collateral,
    Dai,
}

/// Kind-specific payload of a trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerParams {
    StopLoss {
        close_to: CloseTo,
        stop_loss_level: U256,
    },
    AutoTakeProfit {
        close_to: CloseTo,
        execution_price: U256,
        max_base_fee_gwei: u32,
    },
    BasicBuy {
        exec_coll_ratio: U256,
        target_coll_ratio: U256,
        max_buy_price: U256,
        deviation: u64,
        max_base_fee_gwei: u32,
    },
    BasicSell {
        exec_coll_ratio: U256,
        target_coll_ratio: U256,
        min_sell_price: U256,
        deviation: u64,
        max_base_fee_gwei: u32,
    },
}

impl TriggerParams {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerParams::StopLoss { close_to: CloseTo::Collateral, .. } => {
                TriggerKind::StopLossToCollateral
            }
            TriggerParams::StopLoss { close_to: CloseTo::Dai, .. } => TriggerKind::StopLossToDai,
            TriggerParams::AutoTakeProfit { close_to: CloseTo::Collateral, .. } => {
                TriggerKind::AutoTakeProfitToCollateral
            }
            TriggerParams::AutoTakeProfit { close_to: CloseTo::Dai, .. } => {
                TriggerKind::AutoTakeProfitToDai
            }
            TriggerParams::BasicBuy { .. } => TriggerKind::BasicBuy,
            TriggerParams::BasicSell { .. } => TriggerKind::BasicSell,
        }
    }

    /// Positional field values in the order given by `kind().fields()`.
    pub fn to_fields(&self) -> Vec<U256> {
        match self {
            TriggerParams::StopLoss { stop_loss_level, .. } => vec![*stop_loss_level],
            TriggerParams::AutoTakeProfit { execution_price, max_base_fee_gwei, .. } => {
                vec![*execution_price, U256::from(*max_base_fee_gwei)]
            }
            TriggerParams::BasicBuy {
                exec_coll_ratio,
                target_coll_ratio,
                max_buy_price,
                deviation,
                max_base_fee_gwei,
            } => vec![
                *exec_coll_ratio,
                *target_coll_ratio,
                *max_buy_price,
                U256::from(*deviation),
                U256::from(*max_base_fee_gwei),
            ],
            TriggerParams::BasicSell {
                exec_coll_ratio,
                target_coll_ratio,
                min_sell_price,
                deviation,
                max_base_fee_gwei,
            } => vec![
                *exec_coll_ratio,
                *target_coll_ratio,
                *min_sell_price,
                U256::from(*deviation),
                U256::from(*max_base_fee_gwei),
            ],
        }
    }

    /// Rebuild typed params from positional values, enforcing arity and widths.
    pub fn from_fields(kind: TriggerKind, fields: &[U256]) -> Result<Self, CodecError> {
        check_layout(kind, fields)?;
        let params = match kind {
            TriggerKind::StopLossToCollateral | TriggerKind::StopLossToDai => {
                TriggerParams::StopLoss { close_to: close_to(kind), stop_loss_level: fields[0] }
            }
            TriggerKind::AutoTakeProfitToCollateral | TriggerKind::AutoTakeProfitToDai => {
                TriggerParams::AutoTakeProfit {
                    close_to: close_to(kind),
                    execution_price: fields[0],
                    max_base_fee_gwei: fields[1].to::<u32>(),
                }
            }
            TriggerKind::BasicBuy => TriggerParams::BasicBuy {
                exec_coll_ratio: fields[0],
                target_coll_ratio: fields[1],
                max_buy_price: fields[2],
                deviation: fields[3].to::<u64>(),
                max_base_fee_gwei: fields[4].to::<u32>(),
            },
            TriggerKind::BasicSell => TriggerParams::BasicSell {
                exec_coll_ratio: fields[0],
                target_coll_ratio: fields[1],
                min_sell_price: fields[2],
                deviation: fields[3].to::<u64>(),
                max_base_fee_gwei: fields[4].to::<u32>(),
            },
        };
        Ok(params)
    }
}

fn close_to(kind: TriggerKind) -> CloseTo {
    match kind {
        TriggerKind::StopLossToDai | TriggerKind::AutoTakeProfitToDai => CloseTo::Dai,
        _ => CloseTo::Collateral,
    }
}

/// Check `fields` against the kind's layout: count first, then each declared width.
pub fn check_layout(kind: TriggerKind, fields: &[U256]) -> Result<(), CodecError> {
    let layout = kind.fields();
    if fields.len() != layout.len() {
        return Err(PayloadFault::Arity { expected: layout.len(), actual: fields.len() }.into());
    }
    for (value, field) in fields.iter().zip(layout) {
        if !field.width.fits(*value) {
            return Err(PayloadFault::FieldOverflow { field: field.name }.into());
        }
    }
    Ok(())
}

/// The independently decodable header of every trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerHeader {
    pub vault_id: U256,
    pub trigger_type: u16,
}

impl TriggerHeader {
    pub fn kind(&self) -> Result<TriggerKind, CodecError> {
        TriggerKind::try_from(self.trigger_type)
    }
}

/// Positional decode result: header plus raw field values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTrigger {
    pub vault_id: U256,
    pub trigger_type: u16,
    pub fields: Vec<U256>,
}

/// A complete trigger record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trigger {
    pub vault_id: U256,
    pub params: TriggerParams,
}

impl Trigger {
    pub fn new(vault_id: U256, params: TriggerParams) -> Self {
        Self { vault_id, params }
    }

    pub fn kind(&self) -> TriggerKind {
        self.params.kind()
    }

    pub fn header(&self) -> TriggerHeader {
        TriggerHeader { vault_id: self.vault_id, trigger_type: self.kind().discriminant() }
    }
}

impl TryFrom<DecodedTrigger> for Trigger {
    type Error = CodecError;

    fn try_from(decoded: DecodedTrigger) -> Result<Self, Self::Error> {
        let kind = TriggerKind::try_from(decoded.trigger_type)?;
        let params = TriggerParams::from_fields(kind, &decoded.fields)?;
        Ok(Trigger { vault_id: decoded.vault_id, params })
    }
}
