//! Rebalance sizing.
//!
//! Prices are quoted in debt units per collateral unit, so a vault's collateralization ratio is
//! `collateral · oraclePrice / debt`. Increasing leverage borrows debt, pays origination and
//! flash-loan fees on it and buys collateral at `marketPrice · (1 + slippage)`. Decreasing sells
//! collateral at `marketPrice · (1 − slippage)` to repay debt plus origination; it never needs a
//! flash loan. Rounding always favours the less leveraged position, and a ratio target is checked
//! against the resulting vault so it is never undershot.

use std::cmp::Ordering;

use alloy_primitives::{I256, U256};
use tracing::debug;

use crate::{errors::RebalanceError, wad::WAD};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketParams {
    pub oracle_price: U256,
    /// Swap venue price before slippage.
    pub market_price: U256,
    pub origination_fee_rate: U256,
    pub flash_loan_fee_rate: U256,
    pub slippage: U256,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VaultState {
    pub debt: U256,
    pub collateral: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizingTarget {
    /// Collateralization ratio to land on.
    CollRatio(U256),
    /// Absolute collateral amount to end with.
    Collateral(U256),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesiredState {
    pub target: SizingTarget,
    /// Deposited before sizing and counted in the collateral delta.
    pub provided_collateral: U256,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebalancePlan {
    pub collateral_delta: I256,
    pub debt_delta: I256,
    pub origination_fee: U256,
    /// Zero whenever the flash loan is skipped.
    pub flash_loan_fee: U256,
    /// Debt handed to the swap when borrowing; collateral sold when repaying.
    pub swap_amount: U256,
    pub skip_flash_loan: bool,
}

impl VaultState {
    /// `collateral · price / debt`; `None` for a debt-free vault.
    pub fn coll_ratio(&self, oracle_price: U256) -> Result<Option<U256>, RebalanceError> {
        if self.debt.is_zero() {
            return Ok(None);
        }
        Ok(Some(mul_div_down(self.collateral, oracle_price, self.debt)?))
    }

    /// The vault after `plan` has been carried out.
    pub fn apply(&self, plan: &RebalancePlan) -> Result<VaultState, RebalanceError> {
        Ok(VaultState {
            debt: apply_delta(self.debt, plan.debt_delta)?,
            collateral: apply_delta(self.collateral, plan.collateral_delta)?,
        })
    }
}

/// Deltas that move `vault` to `desired` at the given market.
pub fn compute_rebalance(
    market: &MarketParams,
    vault: &VaultState,
    desired: &DesiredState,
) -> Result<RebalancePlan, RebalanceError> {
    validate(market, desired)?;

    let collateral = add(vault.collateral, desired.provided_collateral)?;
    let buy_price = mul_div_up(market.market_price, WAD + market.slippage, WAD)?;
    let sell_price = mul_div_down(market.market_price, WAD - market.slippage, WAD)?;
    // Fraction of borrowed debt that reaches the swap.
    let borrow_yield = WAD - market.origination_fee_rate - market.flash_loan_fee_rate;
    // Debt cost of every unit repaid.
    let repay_cost = WAD + market.origination_fee_rate;

    let step = match desired.target {
        SizingTarget::CollRatio(ratio) => {
            let value = mul(collateral, market.oracle_price)?;
            let owed = mul(ratio, vault.debt)?;
            if value >= owed {
                // (C' + ΔD·k/Pbuy)·Po = R·(D + ΔD)
                let denominator = mul(ratio, buy_price)?
                    .checked_sub(mul(borrow_yield, market.oracle_price)?)
                    .filter(|d| !d.is_zero())
                    .ok_or(RebalanceError::InvalidParameters("target ratio unreachable"))?;
                let mut borrowed = mul_div_down(buy_price, value - owed, denominator)?;
                // Per-quantity rounding can leave the result a few wei under target; borrow less
                // until the resulting position meets it.
                loop {
                    let bought = purchase(borrowed, market, buy_price)?.bought;
                    let after = VaultState {
                        debt: add(vault.debt, borrowed)?,
                        collateral: add(collateral, bought)?,
                    };
                    let deficit = shortfall(&after, market.oracle_price, ratio)?;
                    if deficit.is_zero() {
                        break;
                    }
                    let step = mul_div_up(deficit, buy_price, denominator)?.max(U256::from(1u64));
                    borrowed = borrowed.saturating_sub(step);
                }
                Step::Borrow(borrowed)
            } else {
                // (C' − ΔD·k'/Psell)·Po = R·(D − ΔD)
                nonzero(sell_price)?;
                let denominator = mul(ratio, sell_price)?
                    .checked_sub(mul(repay_cost, market.oracle_price)?)
                    .filter(|d| !d.is_zero())
                    .ok_or(RebalanceError::InvalidParameters("target ratio unreachable"))?;
                let mut repaid = mul_div_up(sell_price, owed - value, denominator)?.min(vault.debt);
                // Same as above, repaying more until the target is met. Full repayment always
                // meets it.
                loop {
                    let sold = mul_div_up(repaid, repay_cost, sell_price)?;
                    if sold > collateral {
                        return Err(RebalanceError::InvalidParameters(
                            "not enough collateral to deleverage",
                        ));
                    }
                    let after =
                        VaultState { debt: vault.debt - repaid, collateral: collateral - sold };
                    let deficit = shortfall(&after, market.oracle_price, ratio)?;
                    if deficit.is_zero() {
                        break Step::Repay { repaid, sold };
                    }
                    let step = mul_div_up(deficit, sell_price, denominator)?.max(U256::from(1u64));
                    repaid = add(repaid, step)?.min(vault.debt);
                }
            }
        }
        SizingTarget::Collateral(target) => match target.cmp(&collateral) {
            Ordering::Greater => {
                Step::Borrow(mul_div_down(target - collateral, buy_price, borrow_yield)?)
            }
            Ordering::Less => {
                nonzero(sell_price)?;
                let sold = collateral - target;
                let repaid = mul_div_down(sold, sell_price, repay_cost)?;
                if repaid > vault.debt {
                    return Err(RebalanceError::InvalidParameters("repayment exceeds vault debt"));
                }
                Step::Repay { repaid, sold }
            }
            Ordering::Equal => Step::Borrow(U256::ZERO),
        },
    };

    let plan = match step {
        Step::Borrow(borrowed) => {
            let Purchase { origination_fee, flash_loan_fee, swap_amount, bought } =
                purchase(borrowed, market, buy_price)?;
            RebalancePlan {
                collateral_delta: signed(add(desired.provided_collateral, bought)?, false)?,
                debt_delta: signed(borrowed, false)?,
                origination_fee,
                flash_loan_fee,
                swap_amount,
                skip_flash_loan: borrowed.is_zero(),
            }
        }
        Step::Repay { repaid, sold } => {
            let collateral_delta = if desired.provided_collateral >= sold {
                signed(desired.provided_collateral - sold, false)?
            } else {
                signed(sold - desired.provided_collateral, true)?
            };
            RebalancePlan {
                collateral_delta,
                debt_delta: signed(repaid, true)?,
                origination_fee: mul_div_up(repaid, market.origination_fee_rate, WAD)?,
                flash_loan_fee: U256::ZERO,
                swap_amount: sold,
                skip_flash_loan: true,
            }
        }
    };

    debug!(
        debt = %vault.debt,
        collateral = %vault.collateral,
        collateral_delta = %plan.collateral_delta,
        debt_delta = %plan.debt_delta,
        skip_flash_loan = plan.skip_flash_loan,
        "rebalance sized"
    );
    Ok(plan)
}

enum Step {
    Borrow(U256),
    Repay { repaid: U256, sold: U256 },
}

/// Where borrowed debt goes: fees first, the rest into collateral at the buy price.
struct Purchase {
    origination_fee: U256,
    flash_loan_fee: U256,
    swap_amount: U256,
    bought: U256,
}

fn purchase(
    borrowed: U256,
    market: &MarketParams,
    buy_price: U256,
) -> Result<Purchase, RebalanceError> {
    let origination_fee = mul_div_up(borrowed, market.origination_fee_rate, WAD)?;
    let flash_loan_fee = mul_div_up(borrowed, market.flash_loan_fee_rate, WAD)?;
    let swap_amount = borrowed.saturating_sub(origination_fee).saturating_sub(flash_loan_fee);
    Ok(Purchase {
        origination_fee,
        flash_loan_fee,
        swap_amount,
        bought: mul_div_down(swap_amount, WAD, buy_price)?,
    })
}

/// How far `R · debt` exceeds `collateral · price`, in WAD² units; zero once the ratio is met.
fn shortfall(vault: &VaultState, oracle_price: U256, ratio: U256) -> Result<U256, RebalanceError> {
    Ok(mul(ratio, vault.debt)?.saturating_sub(mul(vault.collateral, oracle_price)?))
}

fn validate(market: &MarketParams, desired: &DesiredState) -> Result<(), RebalanceError> {
    if market.oracle_price.is_zero() {
        return Err(RebalanceError::InvalidParameters("oracle price must be positive"));
    }
    if market.market_price.is_zero() {
        return Err(RebalanceError::InvalidParameters("market price must be positive"));
    }
    let target = match desired.target {
        SizingTarget::CollRatio(ratio) => ratio,
        SizingTarget::Collateral(amount) => amount,
    };
    if target.is_zero() {
        return Err(RebalanceError::InvalidParameters("target must be positive"));
    }
    let fees = market
        .origination_fee_rate
        .checked_add(market.flash_loan_fee_rate)
        .ok_or(RebalanceError::MathOverflow)?;
    if fees >= WAD {
        return Err(RebalanceError::InvalidParameters("fees must stay below 100%"));
    }
    if market.slippage >= WAD {
        return Err(RebalanceError::InvalidParameters("slippage must stay below 100%"));
    }
    Ok(())
}

fn nonzero(price: U256) -> Result<(), RebalanceError> {
    if price.is_zero() {
        return Err(RebalanceError::InvalidParameters("sell price rounds to zero"));
    }
    Ok(())
}

fn add(a: U256, b: U256) -> Result<U256, RebalanceError> {
    a.checked_add(b).ok_or(RebalanceError::MathOverflow)
}

fn mul(a: U256, b: U256) -> Result<U256, RebalanceError> {
    a.checked_mul(b).ok_or(RebalanceError::MathOverflow)
}

fn mul_div_down(a: U256, b: U256, denominator: U256) -> Result<U256, RebalanceError> {
    mul(a, b)?.checked_div(denominator).ok_or(RebalanceError::MathOverflow)
}

fn mul_div_up(a: U256, b: U256, denominator: U256) -> Result<U256, RebalanceError> {
    let product = mul(a, b)?;
    let quotient = product.checked_div(denominator).ok_or(RebalanceError::MathOverflow)?;
    if (product % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::from(1u64))
    }
}

fn signed(magnitude: U256, negative: bool) -> Result<I256, RebalanceError> {
    if magnitude.bit(255) {
        return Err(RebalanceError::MathOverflow);
    }
    let value = I256::from_raw(magnitude);
    Ok(if negative { -value } else { value })
}

fn apply_delta(value: U256, delta: I256) -> Result<U256, RebalanceError> {
    let magnitude = delta.unsigned_abs();
    let applied = if delta.is_negative() {
        value.checked_sub(magnitude)
    } else {
        value.checked_add(magnitude)
    };
    applied.ok_or(RebalanceError::MathOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        let seven = U256::from(7u64);
        let two = U256::from(2u64);
        assert_eq!(mul_div_down(seven, U256::from(1u64), two), Ok(U256::from(3u64)));
        assert_eq!(mul_div_up(seven, U256::from(1u64), two), Ok(U256::from(4u64)));
        assert_eq!(mul_div_up(U256::from(8u64), U256::from(1u64), two), Ok(U256::from(4u64)));
        assert_eq!(mul(U256::MAX, two), Err(RebalanceError::MathOverflow));
    }

    #[test]
    fn test_signed_rejects_top_bit() {
        assert_eq!(signed(U256::MAX, false), Err(RebalanceError::MathOverflow));
        assert_eq!(signed(U256::from(5u64), true).unwrap().unsigned_abs(), U256::from(5u64));
        assert!(signed(U256::from(5u64), true).unwrap().is_negative());
    }

    #[test]
    fn test_apply_delta() {
        let ten = U256::from(10u64);
        assert_eq!(apply_delta(ten, signed(U256::from(3u64), true).unwrap()), Ok(U256::from(7u64)));
        assert_eq!(apply_delta(ten, signed(U256::from(11u64), true).unwrap()), Err(RebalanceError::MathOverflow));
    }
}
