use alloy_primitives::{Address, U256};

use crate::config::{AppConfig, CROSS_CHAIN_GAS_HINT};
use crate::error::{TipError, ValidationError};
use crate::fees::{needs_approval, to_base_units};
use crate::models::{TipRequest, WalletContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalStep {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    pub router: Address,
    pub recipient: Address,
    pub token: Address,
    pub amount: U256,
    pub message: String,
}

/// A planned tip. Approval, when present, must land before the transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipIntent {
    SameChain {
        approval: Option<ApprovalStep>,
        transfer: TransferCall,
    },
    CrossChain {
        approval: Option<ApprovalStep>,
        transfer: TransferCall,
        target_chain_id: u64,
        gas_hint: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Tip,
}

impl TipIntent {
    pub fn is_cross_chain(&self) -> bool {
        matches!(self, TipIntent::CrossChain { .. })
    }

    pub fn approval(&self) -> Option<&ApprovalStep> {
        match self {
            TipIntent::SameChain { approval, .. } | TipIntent::CrossChain { approval, .. } => {
                approval.as_ref()
            }
        }
    }

    pub fn transfer(&self) -> &TransferCall {
        match self {
            TipIntent::SameChain { transfer, .. } | TipIntent::CrossChain { transfer, .. } => {
                transfer
            }
        }
    }

    pub fn next_action(&self) -> Action {
        if self.approval().is_some() {
            Action::Approve
        } else {
            Action::Tip
        }
    }

    /// Drops the approval step once the allowance transaction has succeeded.
    pub fn approved(self) -> Self {
        match self {
            TipIntent::SameChain { transfer, .. } => TipIntent::SameChain {
                approval: None,
                transfer,
            },
            TipIntent::CrossChain {
                transfer,
                target_chain_id,
                gas_hint,
                ..
            } => TipIntent::CrossChain {
                approval: None,
                transfer,
                target_chain_id,
                gas_hint,
            },
        }
    }
}

/// Builds the intent from a validated request. `allowance` is the current
/// allowance granted to the router on the source chain, if it has been read.
pub fn plan_tip(
    request: &TipRequest,
    ctx: &WalletContext,
    allowance: Option<U256>,
    decimals: u8,
    config: &AppConfig,
) -> Result<TipIntent, TipError> {
    let router = config.router_for(ctx.chain_id)?;
    if config.network(request.target_chain_id).is_none() {
        return Err(TipError::UnsupportedChain(request.target_chain_id));
    }
    let amount = to_base_units(&request.amount, decimals)
        .ok_or_else(|| ValidationError::NotANumber(request.amount.clone()))?;

    let approval = needs_approval(&request.amount, allowance, decimals).then(|| ApprovalStep {
        token: request.token,
        spender: router,
        amount,
    });

    let transfer = TransferCall {
        router,
        recipient: request.recipient,
        token: request.token,
        amount,
        message: request.message.clone().unwrap_or_default(),
    };

    if request.target_chain_id != ctx.chain_id {
        Ok(TipIntent::CrossChain {
            approval,
            transfer,
            target_chain_id: request.target_chain_id,
            gas_hint: CROSS_CHAIN_GAS_HINT,
        })
    } else {
        Ok(TipIntent::SameChain { approval, transfer })
    }
}
