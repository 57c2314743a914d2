//! Sizing of leverage adjustments for collateralized vaults.
//!
//! Every amount, price, ratio and rate is an 18-decimal fixed-point
//! [`U256`](alloy_primitives::U256) (see [`wad`]); deltas are signed.
//! Nothing here touches floating point.

pub mod engine;
pub mod errors;
pub mod wad;


pub use engine::{
    compute_rebalance, DesiredState, MarketParams, RebalancePlan, SizingTarget, VaultState,
};
pub use errors::RebalanceError;
pub use wad::{format_signed_wad, format_wad, parse_wad, WAD};
