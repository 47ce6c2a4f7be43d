//! Manager settings
//!
//! Optional TOML file carrying the sending account, the providers file,
//! the target network and transaction defaults. CLI flags override
//! individual values.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::manager::EndpointManager;
use crate::types::{TxParams, DEFAULT_GAS_PRICE_MULTIPLIER};

const SETTINGS_DIR: &str = "rpc-rotator";
const SETTINGS_FILENAME: &str = "settings.toml";

/// Request timeout used by the network presets (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// NETWORKS
// =============================================================================

/// Connection details for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Short network name (`mainnet`, `sepolia`, ...)
    pub name: String,
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Endpoint used when no providers file is configured
    pub url: String,
    /// Request timeout for the transport layer (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl NetworkConfig {
    pub fn mainnet() -> Self {
        Self::preset("mainnet", 1, "https://ethereum.publicnode.com")
    }

    pub fn goerli() -> Self {
        Self::preset("goerli", 5, "https://ethereum-goerli.publicnode.com")
    }

    pub fn sepolia() -> Self {
        Self::preset("sepolia", 11_155_111, "https://ethereum-sepolia.publicnode.com")
    }

    fn preset(name: &str, chain_id: u64, url: &str) -> Self {
        Self {
            name: name.to_string(),
            chain_id,
            url: url.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// All built-in presets
    pub fn presets() -> Vec<Self> {
        vec![Self::mainnet(), Self::goerli(), Self::sepolia()]
    }

    /// Look up a preset by name (case-insensitive) or chain id
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::presets().into_iter().find(|network| {
            network.name.eq_ignore_ascii_case(name) || network.chain_id.to_string() == name
        })
    }
}

impl FromStr for NetworkConfig {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            anyhow::anyhow!("Unknown network '{}' (expected mainnet, goerli or sepolia)", s)
        })
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Settings for building an [`EndpointManager`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerSettings {
    /// Sending account address
    pub account_address: String,

    /// JSON providers file (`{"nodes": [...]}`) loaded on startup
    pub providers_file: Option<PathBuf>,

    /// Testing mode: an omitted nonce becomes 1
    /// Leave off for anything that talks to a live chain
    pub placeholder_nonce: bool,

    /// Gas price multiplier used when a transaction does not set one
    pub gas_price_multiplier: f64,

    /// Gas limit used when a transaction does not set one
    pub default_gas: Option<u64>,

    /// Target network; its URL seeds the endpoint list when no providers file is set
    pub network: Option<NetworkConfig>,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            account_address: String::new(),
            providers_file: None,
            placeholder_nonce: false,
            gas_price_multiplier: DEFAULT_GAS_PRICE_MULTIPLIER,
            default_gas: None,
            network: None,
        }
    }
}

impl ManagerSettings {
    /// Default settings location (`<config dir>/rpc-rotator/settings.toml`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_DIR)
            .join(SETTINGS_FILENAME)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    // Builder-style methods for CLI overrides

    pub fn with_account_address(mut self, address: Option<String>) -> Self {
        if let Some(address) = address {
            self.account_address = address;
        }
        self
    }

    pub fn with_providers_file(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.providers_file = path;
        }
        self
    }

    pub fn with_placeholder_nonce(mut self, enabled: bool) -> Self {
        self.placeholder_nonce |= enabled;
        self
    }

    pub fn with_gas_price_multiplier(mut self, multiplier: Option<f64>) -> Self {
        if let Some(multiplier) = multiplier {
            self.gas_price_multiplier = multiplier;
        }
        self
    }

    pub fn with_network(mut self, network: Option<NetworkConfig>) -> Self {
        if network.is_some() {
            self.network = network;
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.account_address.trim().is_empty() {
            anyhow::bail!("account_address must be set");
        }

        if !self.gas_price_multiplier.is_finite() || self.gas_price_multiplier < 0.0 {
            anyhow::bail!(
                "gas_price_multiplier ({}) must be a finite, non-negative number",
                self.gas_price_multiplier
            );
        }

        if let Some(network) = &self.network {
            if network.url.trim().is_empty() {
                anyhow::bail!("network '{}' has no url", network.name);
            }
        }

        Ok(())
    }

    /// Populate `manager` from the providers file, or else from the network URL.
    ///
    /// Returns `false` when neither source is configured and the manager was
    /// left untouched.
    pub fn load_endpoints_into(&self, manager: &mut EndpointManager) -> anyhow::Result<bool> {
        if let Some(path) = &self.providers_file {
            manager
                .load_endpoints(path)
                .with_context(|| format!("Failed to load providers from {}", path.display()))?;
            return Ok(true);
        }

        if let Some(network) = &self.network {
            debug!("Using {} default endpoint {}", network.name, network.url);
            manager.set_endpoints(vec![network.url.clone()]);
            return Ok(true);
        }

        Ok(false)
    }

    /// Build a manager for these settings with its endpoint list populated
    pub fn build_manager(&self) -> anyhow::Result<EndpointManager> {
        self.validate()?;

        let mut manager = EndpointManager::new(self.account_address.clone())
            .with_placeholder_nonce(self.placeholder_nonce);
        self.load_endpoints_into(&mut manager)?;

        Ok(manager)
    }
}

impl TxParams {
    /// Fill the gas limit and multiplier from settings where the caller left them unset
    pub fn apply_settings(mut self, settings: &ManagerSettings) -> Self {
        if self.gas.is_none() {
            self.gas = settings.default_gas;
        }
        if self.gas_price_multiplier.is_none() {
            self.gas_price_multiplier = Some(settings.gas_price_multiplier);
        }
        self
    }
}
