use std::thread;
use std::time::{Duration, Instant};

use alloy_primitives::utils::format_ether;
use anyhow::{Context, Result, bail};
use tracing::info;

use crate::chain::wallet::{TxLifecycle, Wallet};
use crate::config::DemoTipConfig;
use crate::error::{TipError, ValidationError};
use crate::sequencer::{BuyOutcome, SequencerMode, TipSequencer, TransferStatus};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Vending machine demo: a fixed ETH tip from Sepolia to Base Sepolia
/// through the gateway, with the cosmetic insert/dispense phases.
pub fn run(wallet: &mut dyn Wallet, demo: &DemoTipConfig, sleep_timers: bool) -> Result<()> {
    let mut sequencer = TipSequencer::new(SequencerMode::Demo);
    println!("[{}] {} ETH", sequencer.lcd(), demo.amount_eth);

    let ctx = wallet.context();
    if ctx.address.is_none() {
        wallet.connect()?;
    }
    if wallet.context().chain_id != demo.source_chain_id {
        info!(chain_id = demo.source_chain_id, "switching to demo source chain");
        wallet.switch_chain(demo.source_chain_id)?;
    }

    let missing = demo.validate();
    let started = Instant::now();
    match sequencer.buy(started, &missing) {
        BuyOutcome::Submit => {}
        BuyOutcome::ConfigMissing => {
            println!("[{}]", sequencer.lcd());
            return Err(TipError::ConfigMissing(
                missing.iter().map(ToString::to_string).collect(),
            )
            .into());
        }
        BuyOutcome::Ignored => bail!("a demo tip is already in flight"),
    }
    println!("[{}]", sequencer.lcd());

    let deposit = demo.deposit()?;
    let available = wallet.native_balance()?;
    if available < deposit.value {
        let err = TipError::from(ValidationError::InsufficientBalance {
            amount: demo.amount_eth.to_string(),
            balance: format_ether(available),
        });
        sequencer.on_error(&err.to_string());
        println!("[{}]", sequencer.lcd());
        return Err(err.into());
    }

    let hash = match wallet.deposit_and_call(&deposit) {
        Ok(hash) => hash,
        Err(err) => {
            sequencer.on_error(&err.to_string());
            println!("[{}]", sequencer.lcd());
            return Err(err.into());
        }
    };
    println!("tx: {hash}");

    let mut last = sequencer.status();
    let mut settled = false;
    loop {
        let now = Instant::now();
        if !settled {
            match wallet.tx_status(hash) {
                TxLifecycle::Success => {
                    settled = true;
                    sequencer.on_success(now);
                }
                TxLifecycle::Failed(reason) => {
                    sequencer.on_error(&reason);
                    println!("[{}]", sequencer.lcd());
                    return Err(TipError::Transaction(reason))
                        .with_context(|| format!("demo tip failed: tx={hash}"));
                }
                TxLifecycle::Pending | TxLifecycle::Confirming => {}
            }
        }
        sequencer.advance(now);

        if sequencer.status() != last {
            last = sequencer.status();
            println!("[{}]", sequencer.lcd());
        }
        if sequencer.status() == TransferStatus::Completed {
            break;
        }

        match sequencer.next_deadline() {
            Some(deadline) if !sleep_timers => sequencer.advance(deadline),
            Some(deadline) if settled => {
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
            }
            _ if sleep_timers => thread::sleep(POLL_INTERVAL),
            _ => {}
        }
    }

    // The session ends here; the reset-to-idle timer must not outlive it.
    sequencer.dispose();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::utils::parse_ether;
    use alloy_primitives::{Address, U256};

    use crate::chain::wallet::SimulatedWallet;
    use crate::config::{BSC_TESTNET, SEPOLIA};

    fn demo_config() -> DemoTipConfig {
        DemoTipConfig::new(
            Some("0x1111111111111111111111111111111111111111".to_string()),
            Some("0x2222222222222222222222222222222222222222".to_string()),
            Some("0x3333333333333333333333333333333333333333".to_string()),
            Some("0x4444444444444444444444444444444444444444".to_string()),
        )
    }

    fn funded_wallet(chain_id: u64) -> SimulatedWallet {
        SimulatedWallet::new(Address::repeat_byte(0xaa), chain_id)
            .with_native(U256::from(10u64).pow(U256::from(18u64)))
    }

    #[test]
    fn demo_switches_chain_and_spends_native() {
        let mut wallet = funded_wallet(BSC_TESTNET);
        run(&mut wallet, &demo_config(), false).expect("demo");

        assert_eq!(wallet.context().chain_id, SEPOLIA);
        let spent = parse_ether("0.01").expect("amount");

        let deposits = wallet.deposits();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].universal_swap_app, Address::repeat_byte(0x22));
        assert_eq!(deposits[0].target_zrc20, Address::repeat_byte(0x33));
        assert_eq!(deposits[0].recipient, Address::repeat_byte(0x11));
        assert_eq!(deposits[0].gateway, Address::repeat_byte(0x44));
        assert_eq!(deposits[0].value, spent);
        let left = wallet.native_balance().expect("balance");
        assert_eq!(left, U256::from(10u64).pow(U256::from(18u64)) - spent);
    }

    #[test]
    fn incomplete_config_is_reported_before_submission() {
        let mut wallet = funded_wallet(SEPOLIA);
        let demo = DemoTipConfig::new(None, None, None, None);
        let err = run(&mut wallet, &demo, false).expect_err("config missing");
        let tip_err = err.downcast_ref::<TipError>().expect("tip error");
        assert!(matches!(tip_err, TipError::ConfigMissing(keys) if keys.len() == 4));
    }

    #[test]
    fn unfunded_wallet_is_rejected_before_deposit() {
        let mut wallet = SimulatedWallet::new(Address::repeat_byte(0xaa), SEPOLIA);
        let err = run(&mut wallet, &demo_config(), false).expect_err("no funds");
        assert!(err.to_string().contains("exceeds wallet balance"));
        assert!(wallet.deposits().is_empty());
    }

    #[test]
    fn reverted_deposit_fails_the_demo() {
        let mut wallet = funded_wallet(SEPOLIA);
        wallet.connect().expect("connect");
        wallet.fail_next("gateway reverted");
        let err = run(&mut wallet, &demo_config(), false).expect_err("reverted");
        assert!(format!("{err:#}").contains("gateway reverted"));
    }
}
