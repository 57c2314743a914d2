use std::path::PathBuf;

use account_guard::{describe::describe, GuardConfig, Ledger};
use alloy_primitives::{Address, U256};
use anyhow::{anyhow, Context, Result};
use automation_types::TriggerKind;
use clap::{Parser, Subcommand};
use rebalance_planner::{
    compute_rebalance, format_signed_wad, format_wad, parse_wad, DesiredState, MarketParams,
    SizingTarget, VaultState,
};
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Operator tooling for automation triggers, rebalance sizing and guard bootstrap configs.
///
/// Output goes to stdout (hex, text lines or JSON); logs go to stderr and honour `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a trigger from positional field values (decimal or 0x-hex).
    Encode {
        #[arg(long)]
        vault_id: U256,

        /// 1/2 stop loss, 3 basic buy, 4 basic sell, 7/8 auto take profit.
        #[arg(long)]
        trigger_type: u16,

        fields: Vec<U256>,
    },

    /// Print the human-readable lines for an encoded trigger.
    Describe {
        /// Trigger bytes as hex, with or without 0x.
        payload: String,

        /// Command contract the trigger is bound to.
        #[arg(long, env = "COMMAND_ADDRESS")]
        command: Address,
    },

    /// Size a rebalance. Amounts, prices and rates are plain decimals (eg 0.002 for 0.2%).
    Plan {
        #[arg(long, default_value = "0")]
        debt: String,

        #[arg(long, default_value = "0")]
        collateral: String,

        #[arg(long, env = "ORACLE_PRICE")]
        oracle_price: String,

        /// Defaults to the oracle price.
        #[arg(long, env = "MARKET_PRICE")]
        market_price: Option<String>,

        /// Origination fee rate.
        #[arg(long = "of", env = "ORIGINATION_FEE", default_value = "0")]
        origination_fee: String,

        /// Flash-loan fee rate.
        #[arg(long = "ff", env = "FLASH_LOAN_FEE", default_value = "0")]
        flash_loan_fee: String,

        #[arg(long, env = "SLIPPAGE", default_value = "0")]
        slippage: String,

        /// Target collateralization ratio (eg 2.5 for 250%).
        #[arg(
            long,
            conflicts_with = "target_collateral",
            required_unless_present = "target_collateral"
        )]
        ratio: Option<String>,

        /// Target collateral amount.
        #[arg(long)]
        target_collateral: Option<String>,

        /// Collateral deposited before sizing.
        #[arg(long, default_value = "0")]
        deposit: String,
    },

    /// Bootstrap a guard from a JSON config and print the resulting state.
    Guard {
        #[arg(long, env = "GUARD_CONFIG", default_value = "guard.json")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("automation_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Encode { vault_id, trigger_type, fields } => {
            let bytes = trigger_encoder::encode(vault_id, trigger_type, &fields)
                .with_context(|| format!("failed to encode trigger type {trigger_type}"))?;
            let kind = TriggerKind::try_from(trigger_type).ok();
            debug!(?kind, len = bytes.len(), "trigger encoded");
            println!("0x{}", hex::encode(bytes));
        }
        Command::Describe { payload, command } => {
            let bytes = hex::decode(payload.trim().trim_start_matches("0x"))
                .context("payload is not valid hex")?;
            for line in describe(&bytes, command).context("failed to describe trigger")? {
                println!("{line}");
            }
        }
        Command::Plan {
            debt,
            collateral,
            oracle_price,
            market_price,
            origination_fee,
            flash_loan_fee,
            slippage,
            ratio,
            target_collateral,
            deposit,
        } => {
            let oracle_price = wad("oracle-price", &oracle_price)?;
            let market = MarketParams {
                oracle_price,
                market_price: match market_price {
                    Some(price) => wad("market-price", &price)?,
                    None => oracle_price,
                },
                origination_fee_rate: wad("of", &origination_fee)?,
                flash_loan_fee_rate: wad("ff", &flash_loan_fee)?,
                slippage: wad("slippage", &slippage)?,
            };
            let vault = VaultState {
                debt: wad("debt", &debt)?,
                collateral: wad("collateral", &collateral)?,
            };
            let target = match (ratio, target_collateral) {
                (Some(ratio), _) => SizingTarget::CollRatio(wad("ratio", &ratio)?),
                (None, Some(amount)) => {
                    SizingTarget::Collateral(wad("target-collateral", &amount)?)
                }
                (None, None) => return Err(anyhow!("provide --ratio or --target-collateral")),
            };
            let desired = DesiredState { target, provided_collateral: wad("deposit", &deposit)? };
            println!("{}", serde_json::to_string_pretty(&plan_json(&market, &vault, &desired)?)?);
        }
        Command::Guard { config } => {
            let loaded = GuardConfig::load(&config)
                .with_context(|| format!("failed to load guard config {}", config.display()))?;
            let ledger = Ledger::from_config(&loaded).context("failed to bootstrap guard")?;
            let guard = ledger.guard();
            info!(guard = %guard.address(), "guard bootstrapped");
            let out = json!({
                "admin": guard.owner(),
                "guard": guard.address(),
                "factory": ledger.factory().address(),
                "whitelist": guard.whitelist().collect::<Vec<_>>(),
                "whitelistSend": guard.whitelist_send().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn wad(flag: &str, value: &str) -> Result<U256> {
    parse_wad(value).with_context(|| format!("--{flag}"))
}

fn plan_json(market: &MarketParams, vault: &VaultState, desired: &DesiredState) -> Result<Value> {
    let plan = compute_rebalance(market, vault, desired).context("failed to size rebalance")?;
    let after = vault.apply(&plan)?;
    let ratio = after.coll_ratio(market.oracle_price)?;
    info!(skip_flash_loan = plan.skip_flash_loan, "rebalance planned");

    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(json!({
        "collateralDelta": format_signed_wad(plan.collateral_delta),
        "debtDelta": format_signed_wad(plan.debt_delta),
        "originationFee": format_wad(plan.origination_fee),
        "flashLoanFee": format_wad(plan.flash_loan_fee),
        "swapAmount": format_wad(plan.swap_amount),
        "skipFlashLoan": plan.skip_flash_loan,
        "resulting": {
            "debt": format_wad(after.debt),
            "collateral": format_wad(after.collateral),
            "collRatio": ratio.map(format_wad),
        },
        "generatedAt": now,
    }))
}
