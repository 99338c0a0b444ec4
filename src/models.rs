use alloy_primitives::{Address, B256};
use serde::Serialize;

/// Wallet session state handed to validation and planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletContext {
    pub address: Option<Address>,
    pub chain_id: u64,
}

impl WalletContext {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }
}

/// Raw user input, validated before it becomes a [`TipRequest`].
#[derive(Debug, Clone, Default)]
pub struct TipForm {
    pub recipient: String,
    pub amount: String,
    pub message: String,
    pub target_chain_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipRequest {
    pub recipient: Address,
    pub token: Address,
    pub amount: String,
    pub message: Option<String>,
    pub target_chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeBreakdown {
    pub platform_fee: String,
    pub net_amount: String,
    pub total: String,
}

#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub project_id: i64,
    pub recipient: String,
    pub token: String,
    pub amount: String,
    pub platform_fee: String,
    pub net_amount: String,
    pub source_chain_id: u64,
    pub target_chain_id: u64,
    pub tx_hash: B256,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Receipt {
    pub id: i64,
    pub project_id: i64,
    pub recipient: String,
    pub amount: String,
    pub net_amount: String,
    pub source_chain_id: u64,
    pub target_chain_id: u64,
    pub tx_hash: String,
    pub message: Option<String>,
    pub created_at: String,
}
