use std::collections::HashMap;

use alloy_primitives::{Address, B256, U256, keccak256};
use tracing::debug;

use crate::error::{TipError, TipResult};
use crate::intent::TransferCall;
use crate::models::WalletContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxLifecycle {
    Pending,
    Confirming,
    Success,
    Failed(String),
}

impl TxLifecycle {
    pub fn is_settled(&self) -> bool {
        matches!(self, TxLifecycle::Success | TxLifecycle::Failed(_))
    }
}

/// Gateway `depositAndCall` for the demo: native value goes to the
/// universal swap app, which swaps into `target_zrc20` and withdraws to
/// `recipient` on the target chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoDeposit {
    pub gateway: Address,
    pub universal_swap_app: Address,
    pub target_zrc20: Address,
    pub recipient: Address,
    pub value: U256,
    pub target_chain_id: u64,
    pub withdraw: bool,
}

/// Wallet and contract bindings the tip flow consumes.
pub trait Wallet {
    fn connect(&mut self) -> TipResult<Address>;
    fn disconnect(&mut self);
    fn context(&self) -> WalletContext;
    fn switch_chain(&mut self, chain_id: u64) -> TipResult<()>;

    fn native_balance(&self) -> TipResult<U256>;
    fn balance_of(&self, token: Address, owner: Address) -> TipResult<U256>;
    fn allowance(&self, token: Address, owner: Address, spender: Address) -> TipResult<U256>;
    fn decimals(&self, token: Address) -> TipResult<u8>;

    fn approve(&mut self, token: Address, spender: Address, amount: U256) -> TipResult<B256>;
    fn tip_same_chain(&mut self, call: &TransferCall) -> TipResult<B256>;
    fn tip_cross_chain(&mut self, call: &TransferCall, target_chain_id: u64) -> TipResult<B256>;
    fn deposit_and_call(&mut self, deposit: &DemoDeposit) -> TipResult<B256>;

    fn tx_status(&mut self, hash: B256) -> TxLifecycle;
}

#[derive(Debug, Clone)]
enum Effect {
    Allowance {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Transfer {
        token: Address,
        spender: Address,
        amount: U256,
    },
    DebitNative(U256),
}

#[derive(Debug, Clone)]
struct SimTx {
    polls: u8,
    effect: Effect,
    failure: Option<String>,
}

/// In-memory wallet. Each submitted transaction is reported as pending,
/// then confirming, then settled on successive `tx_status` polls; effects
/// apply when the transaction succeeds.
#[derive(Debug)]
pub struct SimulatedWallet {
    address: Address,
    chain_id: u64,
    connected: bool,
    native: U256,
    tokens: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    txs: HashMap<B256, SimTx>,
    #[cfg(test)]
    deposits: Vec<DemoDeposit>,
    nonce: u64,
    fail_next: Option<String>,
}

impl SimulatedWallet {
    pub fn new(address: Address, chain_id: u64) -> Self {
        Self {
            address,
            chain_id,
            connected: false,
            native: U256::ZERO,
            tokens: HashMap::new(),
            allowances: HashMap::new(),
            txs: HashMap::new(),
            #[cfg(test)]
            deposits: Vec::new(),
            nonce: 0,
            fail_next: None,
        }
    }

    pub fn with_native(mut self, amount: U256) -> Self {
        self.native = amount;
        self
    }

    pub fn with_token(mut self, token: Address, amount: U256) -> Self {
        self.tokens.insert(token, amount);
        self
    }

    /// The next submitted transaction reverts with `reason`.
    #[cfg(test)]
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    #[cfg(test)]
    pub fn deposits(&self) -> &[DemoDeposit] {
        &self.deposits
    }

    fn require_connected(&self) -> TipResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(TipError::Wallet("wallet not connected".to_string()))
        }
    }

    fn submit(&mut self, effect: Effect) -> TipResult<B256> {
        self.require_connected()?;
        self.nonce += 1;

        let mut preimage = self.address.to_vec();
        preimage.extend_from_slice(&self.chain_id.to_be_bytes());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        let hash = keccak256(&preimage);

        debug!(%hash, nonce = self.nonce, "submitted simulated transaction");
        self.txs.insert(
            hash,
            SimTx {
                polls: 0,
                effect,
                failure: self.fail_next.take(),
            },
        );
        Ok(hash)
    }

    fn apply(&mut self, effect: Effect) -> Result<(), String> {
        match effect {
            Effect::Allowance {
                token,
                spender,
                amount,
            } => {
                self.allowances.insert((token, spender), amount);
            }
            Effect::Transfer {
                token,
                spender,
                amount,
            } => {
                let allowance = self
                    .allowances
                    .get(&(token, spender))
                    .copied()
                    .unwrap_or(U256::ZERO);
                if allowance < amount {
                    return Err("ERC20: insufficient allowance".to_string());
                }
                let balance = self.tokens.entry(token).or_insert(U256::ZERO);
                if *balance < amount {
                    return Err("ERC20: transfer amount exceeds balance".to_string());
                }
                *balance -= amount;
                self.allowances.insert((token, spender), allowance - amount);
            }
            Effect::DebitNative(value) => {
                if self.native < value {
                    return Err("insufficient funds for value".to_string());
                }
                self.native -= value;
            }
        }
        Ok(())
    }

    fn spend(&mut self, call: &TransferCall) -> TipResult<B256> {
        let allowance = self
            .allowances
            .get(&(call.token, call.router))
            .copied()
            .unwrap_or(U256::ZERO);
        if allowance < call.amount {
            return Err(TipError::Transaction(
                "ERC20: insufficient allowance".to_string(),
            ));
        }
        self.submit(Effect::Transfer {
            token: call.token,
            spender: call.router,
            amount: call.amount,
        })
    }
}

impl Wallet for SimulatedWallet {
    fn connect(&mut self) -> TipResult<Address> {
        self.connected = true;
        Ok(self.address)
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn context(&self) -> WalletContext {
        WalletContext {
            address: self.connected.then_some(self.address),
            chain_id: self.chain_id,
        }
    }

    fn switch_chain(&mut self, chain_id: u64) -> TipResult<()> {
        self.require_connected()?;
        self.chain_id = chain_id;
        Ok(())
    }

    fn native_balance(&self) -> TipResult<U256> {
        self.require_connected()?;
        Ok(self.native)
    }

    fn balance_of(&self, token: Address, owner: Address) -> TipResult<U256> {
        if owner != self.address {
            return Ok(U256::ZERO);
        }
        Ok(self.tokens.get(&token).copied().unwrap_or(U256::ZERO))
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> TipResult<U256> {
        if owner != self.address {
            return Ok(U256::ZERO);
        }
        Ok(self
            .allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    fn decimals(&self, _token: Address) -> TipResult<u8> {
        Ok(crate::config::USDC_DECIMALS)
    }

    fn approve(&mut self, token: Address, spender: Address, amount: U256) -> TipResult<B256> {
        self.submit(Effect::Allowance {
            token,
            spender,
            amount,
        })
    }

    fn tip_same_chain(&mut self, call: &TransferCall) -> TipResult<B256> {
        self.spend(call)
    }

    fn tip_cross_chain(&mut self, call: &TransferCall, target_chain_id: u64) -> TipResult<B256> {
        if target_chain_id == self.chain_id {
            return Err(TipError::Transaction(
                "target chain equals source chain".to_string(),
            ));
        }
        self.spend(call)
    }

    fn deposit_and_call(&mut self, deposit: &DemoDeposit) -> TipResult<B256> {
        debug!(
            gateway = %deposit.gateway,
            app = %deposit.universal_swap_app,
            zrc20 = %deposit.target_zrc20,
            recipient = %deposit.recipient,
            target_chain_id = deposit.target_chain_id,
            "gateway deposit"
        );
        let hash = self.submit(Effect::DebitNative(deposit.value))?;
        #[cfg(test)]
        self.deposits.push(deposit.clone());
        Ok(hash)
    }

    fn tx_status(&mut self, hash: B256) -> TxLifecycle {
        let Some(tx) = self.txs.get_mut(&hash) else {
            return TxLifecycle::Failed(format!("unknown transaction {hash}"));
        };
        tx.polls = tx.polls.saturating_add(1);
        match tx.polls {
            1 => return TxLifecycle::Pending,
            2 => return TxLifecycle::Confirming,
            3 => {}
            _ => {
                return match &tx.failure {
                    Some(reason) => TxLifecycle::Failed(reason.clone()),
                    None => TxLifecycle::Success,
                };
            }
        }

        let effect = tx.effect.clone();
        let failure = tx.failure.clone();
        let outcome = match failure {
            Some(reason) => Err(reason),
            None => self.apply(effect),
        };
        match outcome {
            Ok(()) => TxLifecycle::Success,
            Err(reason) => {
                if let Some(tx) = self.txs.get_mut(&hash) {
                    tx.failure = Some(reason.clone());
                }
                TxLifecycle::Failed(reason)
            }
        }
    }
}

/// Polls until the transaction settles.
pub fn wait_for_receipt(wallet: &mut dyn Wallet, hash: B256) -> TxLifecycle {
    loop {
        let status = wallet.tx_status(hash);
        debug!(%hash, ?status, "transaction status");
        if status.is_settled() {
            return status;
        }
    }
}
