use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, address};

use crate::chain::wallet::DemoDeposit;
use crate::error::{TipError, ValidationError};

/// Router fee in basis points (100 = 1%).
pub const PLATFORM_FEE_BPS: u32 = 100;
pub const BPS_DENOMINATOR: u32 = 10_000;

pub const USDC_DECIMALS: u8 = 6;

/// 0.1 USDC in base units.
pub const MIN_TIP_AMOUNT: u64 = 100_000;
/// 10,000 USDC in base units.
pub const MAX_TIP_AMOUNT: u64 = 10_000_000_000;

/// Advisory line shown for cross-chain tips. The router does not take msg.value.
pub const CROSS_CHAIN_GAS_HINT: &str = "~0.01 ETH";

pub const MAX_MESSAGE_LEN: usize = 200;

pub const SEPOLIA: u64 = 11_155_111;
pub const BSC_TESTNET: u64 = 97;
pub const ETHEREUM: u64 = 1;
pub const BSC: u64 = 56;
pub const BASE_SEPOLIA: u64 = 84_532;

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: &'static str,
    pub router: Address,
    pub usdc: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TipBounds {
    pub min: u64,
    pub max: u64,
    pub decimals: u8,
}

impl Default for TipBounds {
    fn default() -> Self {
        Self {
            min: MIN_TIP_AMOUNT,
            max: MAX_TIP_AMOUNT,
            decimals: USDC_DECIMALS,
        }
    }
}

impl TipBounds {
    pub fn min_display(&self) -> f64 {
        scale_down(self.min, self.decimals)
    }

    pub fn max_display(&self) -> f64 {
        scale_down(self.max, self.decimals)
    }
}

fn scale_down(value: u64, decimals: u8) -> f64 {
    value as f64 / 10f64.powi(i32::from(decimals))
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    networks: Vec<NetworkConfig>,
    pub bounds: TipBounds,
    pub fee_bps: u32,
}

impl AppConfig {
    pub fn load() -> Self {
        let networks = vec![
            NetworkConfig {
                chain_id: SEPOLIA,
                name: "Sepolia",
                router: Address::ZERO,
                usdc: address!("94a9D9AC8a22534E3FaCa9F4e7F2E2cf85d5E4C8"),
            },
            NetworkConfig {
                chain_id: BSC_TESTNET,
                name: "BSC Testnet",
                router: Address::ZERO,
                usdc: address!("64544969ed7EBf5f083679233325356EbE738930"),
            },
            NetworkConfig {
                chain_id: ETHEREUM,
                name: "Ethereum",
                router: Address::ZERO,
                usdc: address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            },
            NetworkConfig {
                chain_id: BSC,
                name: "BSC",
                router: Address::ZERO,
                usdc: address!("8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
            },
        ];

        Self {
            networks,
            bounds: TipBounds::default(),
            fee_bps: PLATFORM_FEE_BPS,
        }
    }

    /// Overrides the router address for one chain, e.g. from `--router`.
    pub fn with_router(mut self, chain_id: u64, router: Address) -> Self {
        if let Some(network) = self.networks.iter_mut().find(|n| n.chain_id == chain_id) {
            network.router = router;
        }
        self
    }

    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.chain_id == chain_id)
    }

    pub fn chain_name(&self, chain_id: u64) -> &'static str {
        match chain_id {
            BASE_SEPOLIA => "Base Sepolia",
            _ => self.network(chain_id).map(|n| n.name).unwrap_or("Unknown"),
        }
    }

    pub fn router_for(&self, chain_id: u64) -> Result<Address, TipError> {
        let network = self
            .network(chain_id)
            .ok_or(TipError::UnsupportedChain(chain_id))?;
        if network.router == Address::ZERO {
            return Err(TipError::ConfigMissing(vec![format!(
                "router address for {}",
                network.name
            )]));
        }
        Ok(network.router)
    }

    pub fn usdc_for(&self, chain_id: u64) -> Result<Address, TipError> {
        self.network(chain_id)
            .map(|n| n.usdc)
            .ok_or(TipError::UnsupportedChain(chain_id))
    }
}

/// Fixed Sepolia → Base Sepolia ETH tip used by the vending machine demo.
#[derive(Debug, Clone)]
pub struct DemoTipConfig {
    pub source_chain_id: u64,
    pub target_chain_id: u64,
    pub amount_eth: &'static str,
    pub recipient: Option<String>,
    pub universal_swap_app: Option<String>,
    pub target_zrc20: Option<String>,
    pub gateway: Option<String>,
}

impl DemoTipConfig {
    pub fn new(
        recipient: Option<String>,
        universal_swap_app: Option<String>,
        target_zrc20: Option<String>,
        gateway: Option<String>,
    ) -> Self {
        Self {
            source_chain_id: SEPOLIA,
            target_chain_id: BASE_SEPOLIA,
            amount_eth: "0.01",
            recipient,
            universal_swap_app,
            target_zrc20,
            gateway,
        }
    }

    /// Names of the settings that are unset, unparsable or zero.
    pub fn validate(&self) -> Vec<&'static str> {
        let checks = [
            ("COLA_DEMO_RECIPIENT", &self.recipient),
            ("COLA_UNIVERSAL_SWAP_APP", &self.universal_swap_app),
            ("COLA_TARGET_ZRC20", &self.target_zrc20),
            ("COLA_GATEWAY", &self.gateway),
        ];

        checks
            .into_iter()
            .filter(|(_, value)| parse_configured_address(value.as_deref()).is_none())
            .map(|(key, _)| key)
            .collect()
    }

    /// The gateway call for this demo. Fails with every missing setting.
    pub fn deposit(&self) -> Result<DemoDeposit, TipError> {
        let missing = self.validate();
        if !missing.is_empty() {
            return Err(TipError::ConfigMissing(
                missing.iter().map(ToString::to_string).collect(),
            ));
        }
        let value = parse_ether(self.amount_eth)
            .map_err(|_| ValidationError::NotANumber(self.amount_eth.to_string()))?;

        Ok(DemoDeposit {
            gateway: required(&self.gateway, "COLA_GATEWAY")?,
            universal_swap_app: required(&self.universal_swap_app, "COLA_UNIVERSAL_SWAP_APP")?,
            target_zrc20: required(&self.target_zrc20, "COLA_TARGET_ZRC20")?,
            recipient: required(&self.recipient, "COLA_DEMO_RECIPIENT")?,
            value,
            target_chain_id: self.target_chain_id,
            withdraw: true,
        })
    }
}

fn required(value: &Option<String>, key: &str) -> Result<Address, TipError> {
    parse_configured_address(value.as_deref())
        .ok_or_else(|| TipError::ConfigMissing(vec![key.to_string()]))
}

pub fn parse_configured_address(value: Option<&str>) -> Option<Address> {
    let parsed = value?.trim().parse::<Address>().ok()?;
    (parsed != Address::ZERO).then_some(parsed)
}
