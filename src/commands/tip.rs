use std::time::Instant;

use alloy_primitives::{Address, B256};
use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

use crate::catalog;
use crate::chain::wallet::{TxLifecycle, Wallet, wait_for_receipt};
use crate::config::AppConfig;
use crate::db::Db;
use crate::error::{TipError, ValidationError};
use crate::fees::{calculate_fees, validate_tip};
use crate::intent::{Action, TipIntent, plan_tip};
use crate::models::{NewReceipt, TipForm, TipRequest};
use crate::sequencer::{BuyOutcome, SequencerMode, TipSequencer};

pub struct TipArgs<'a> {
    pub project_id: i64,
    pub recipient: &'a str,
    pub amount: &'a str,
    pub target_chain: Option<u64>,
    pub message: Option<&'a str>,
}

pub fn run(db: &Db, config: &AppConfig, wallet: &mut dyn Wallet, args: &TipArgs) -> Result<()> {
    let project = catalog::find(args.project_id)
        .ok_or_else(|| anyhow!("project not found: id={}", args.project_id))?;

    let ctx = wallet.context();
    let owner = ctx
        .address
        .ok_or(TipError::from(ValidationError::WalletNotConnected))?;
    let token = config.usdc_for(ctx.chain_id)?;
    let decimals = wallet.decimals(token)?;
    let balance = wallet.balance_of(token, owner)?;

    let form = TipForm {
        recipient: args.recipient.to_string(),
        amount: args.amount.to_string(),
        message: args.message.unwrap_or_default().to_string(),
        target_chain_id: args.target_chain,
    };
    validate_tip(&form, &config.bounds, &ctx, Some(balance)).map_err(TipError::from)?;

    let recipient: Address = form
        .recipient
        .trim()
        .parse()
        .with_context(|| format!("invalid recipient: {}", form.recipient))?;
    let request = TipRequest {
        recipient,
        token,
        amount: form.amount.trim().to_string(),
        message: args.message.map(ToString::to_string),
        target_chain_id: form.target_chain_id.unwrap_or(ctx.chain_id),
    };

    let router = config.router_for(ctx.chain_id)?;
    let allowance = wallet.allowance(token, owner, router)?;
    let mut intent = plan_tip(&request, &ctx, Some(allowance), decimals, config)?;

    let fees = calculate_fees(&request.amount, config.fee_bps);
    println!(
        "tip {} USDC to {} ({}): fee {} / net {}",
        fees.total, project.title, intent.transfer().recipient, fees.platform_fee, fees.net_amount
    );
    if let TipIntent::CrossChain {
        target_chain_id,
        gas_hint,
        ..
    } = &intent
    {
        println!(
            "cross-chain {} -> {}, extra gas {gas_hint}",
            config.chain_name(ctx.chain_id),
            config.chain_name(*target_chain_id)
        );
    }

    if intent.next_action() == Action::Approve {
        intent = approve(wallet, intent)?;
    }

    let mut sequencer = TipSequencer::new(SequencerMode::Basic);
    let hash = submit(wallet, &mut sequencer, &intent)?;
    if db.receipt_exists(&hash.to_string())? {
        bail!("receipt already recorded: tx={hash}");
    }

    let receipt = NewReceipt {
        project_id: project.id,
        recipient: request.recipient.to_string(),
        token: "USDC".to_string(),
        amount: fees.total.clone(),
        platform_fee: fees.platform_fee.clone(),
        net_amount: fees.net_amount.clone(),
        source_chain_id: ctx.chain_id,
        target_chain_id: request.target_chain_id,
        tx_hash: hash,
        message: request.message.clone(),
    };
    db.insert_receipt(&receipt)?;

    println!("[{}] tx={hash}", sequencer.lcd());
    println!("next: history --project {}", project.id);
    sequencer.dispose();
    Ok(())
}

fn approve(wallet: &mut dyn Wallet, intent: TipIntent) -> Result<TipIntent> {
    let Some(step) = intent.approval().cloned() else {
        return Ok(intent);
    };
    println!("approving router {} for {}", step.spender, step.amount);

    let hash = wallet.approve(step.token, step.spender, step.amount)?;
    match wait_for_receipt(wallet, hash) {
        TxLifecycle::Success => {
            info!(%hash, "allowance granted");
            Ok(intent.approved())
        }
        TxLifecycle::Failed(reason) => Err(TipError::Transaction(reason))
            .with_context(|| format!("approval failed: tx={hash}")),
        other => bail!("approval did not settle: {other:?}"),
    }
}

/// Exactly one transfer is submitted per accepted `buy`.
fn submit(wallet: &mut dyn Wallet, sequencer: &mut TipSequencer, intent: &TipIntent) -> Result<B256> {
    if sequencer.buy(Instant::now(), &[]) != BuyOutcome::Submit {
        bail!("a tip is already in flight");
    }

    let transfer = intent.transfer();
    let sent = match intent {
        TipIntent::SameChain { .. } => wallet.tip_same_chain(transfer),
        TipIntent::CrossChain {
            target_chain_id, ..
        } => wallet.tip_cross_chain(transfer, *target_chain_id),
    };
    let hash = match sent {
        Ok(hash) => hash,
        Err(err) => {
            sequencer.on_error(&err.to_string());
            return Err(err.into());
        }
    };

    match wait_for_receipt(wallet, hash) {
        TxLifecycle::Success => {
            sequencer.on_success(Instant::now());
            info!(
                %hash,
                status = %sequencer.status(),
                cross_chain = intent.is_cross_chain(),
                "tip confirmed"
            );
            Ok(hash)
        }
        TxLifecycle::Failed(reason) => {
            sequencer.on_error(&reason);
            warn!(%hash, "tip reverted");
            Err(TipError::Transaction(reason)).with_context(|| format!("tip failed: tx={hash}"))
        }
        other => bail!("tip did not settle: {other:?}"),
    }
}
