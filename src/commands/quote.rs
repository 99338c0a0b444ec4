use alloy_primitives::U256;
use anyhow::Result;

use crate::chain::wallet::Wallet;
use crate::config::{AppConfig, CROSS_CHAIN_GAS_HINT};
use crate::fees::{calculate_fees, is_form_valid, validate_tip};
use crate::models::{TipForm, WalletContext};

pub fn run(
    config: &AppConfig,
    wallet: &dyn Wallet,
    recipient: Option<&str>,
    amount: &str,
    target_chain: Option<u64>,
) -> Result<()> {
    let ctx = wallet.context();
    let token = config.usdc_for(ctx.chain_id)?;
    let balance = match ctx.address {
        Some(owner) => Some(wallet.balance_of(token, owner)?),
        None => None,
    };

    let form = TipForm {
        recipient: recipient.unwrap_or_default().to_string(),
        amount: amount.to_string(),
        target_chain_id: target_chain,
        ..TipForm::default()
    };
    for line in render(config, &ctx, balance, &form) {
        println!("{line}");
    }
    Ok(())
}

fn render(
    config: &AppConfig,
    ctx: &WalletContext,
    balance: Option<U256>,
    form: &TipForm,
) -> Vec<String> {
    let fees = calculate_fees(&form.amount, config.fee_bps);
    let mut lines = vec![
        format!("tip:          {} USDC", fees.total),
        format!(
            "platform fee: -{} USDC ({}%)",
            fees.platform_fee,
            f64::from(config.fee_bps) / 100.0
        ),
    ];
    if form
        .target_chain_id
        .is_some_and(|target| target != ctx.chain_id)
    {
        lines.push(format!("cross-chain:  {CROSS_CHAIN_GAS_HINT}"));
    }
    lines.push(format!("recipient gets {} USDC", fees.net_amount));

    if is_form_valid(form, &config.bounds, ctx, balance) {
        lines.push("valid: yes".to_string());
    } else if let Err(err) = validate_tip(form, &config.bounds, ctx, balance) {
        lines.push(format!("valid: no ({err})"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    use crate::config::{BSC_TESTNET, SEPOLIA};

    fn ctx() -> WalletContext {
        WalletContext {
            address: Some(Address::repeat_byte(0xaa)),
            chain_id: SEPOLIA,
        }
    }

    fn form(amount: &str, target_chain_id: Option<u64>) -> TipForm {
        TipForm {
            recipient: "0x1111111111111111111111111111111111111111".to_string(),
            amount: amount.to_string(),
            target_chain_id,
            ..TipForm::default()
        }
    }

    fn has_advisory(lines: &[String]) -> bool {
        lines.iter().any(|line| line.starts_with("cross-chain:"))
    }

    #[test]
    fn advisory_follows_target_chain() {
        let config = AppConfig::load();
        let cross = render(&config, &ctx(), None, &form("10", Some(BSC_TESTNET)));
        assert!(has_advisory(&cross));
        assert!(cross.contains(&format!("cross-chain:  {CROSS_CHAIN_GAS_HINT}")));

        let same = render(&config, &ctx(), None, &form("10", Some(SEPOLIA)));
        assert!(!has_advisory(&same));
        let unset = render(&config, &ctx(), None, &form("10", None));
        assert!(!has_advisory(&unset));
    }

    #[test]
    fn quote_shows_fees_and_verdict() {
        let config = AppConfig::load();
        let lines = render(&config, &ctx(), None, &form("10", None));
        assert_eq!(lines[0], "tip:          10 USDC");
        assert_eq!(lines[1], "platform fee: -0.10 USDC (1%)");
        assert_eq!(lines[2], "recipient gets 9.90 USDC");
        assert_eq!(lines[3], "valid: yes");
    }

    #[test]
    fn quote_explains_rejection() {
        let config = AppConfig::load();
        let broke = Some(U256::from(1_000_000u64));
        let lines = render(&config, &ctx(), broke, &form("10", None));
        let verdict = lines.last().expect("verdict");
        assert!(verdict.starts_with("valid: no"), "{verdict}");
        assert!(verdict.contains("exceeds wallet balance"));
    }
}
