//! RPC endpoint rotation and transaction parameter assembly
//!
//! A small client-side helper for wallet and automation tooling that
//! submits transactions through one of several interchangeable RPC nodes:
//!
//! - [`EndpointManager`] loads candidate endpoints from a JSON providers
//!   file (`{"nodes": [...]}`) and rotates through them round-robin.
//! - [`EndpointManager::build_transaction`] turns [`TxParams`] into a
//!   [`TransactionRecord`] with defaults and the gas price multiplier applied.
//!
//! Sending, signing and retry policy stay with the caller: a transport
//! layer typically calls [`EndpointManager::advance_endpoint`] from its own
//! retry loop after a failed request.
//!
//! ```no_run
//! use rpc_rotator::{EndpointManager, TxParams};
//!
//! let mut manager = EndpointManager::new("0x123");
//! manager.load_endpoints("providers.json")?;
//!
//! let tx = manager.build_transaction(
//!     TxParams::new("0x456").with_nonce(7).with_gas_price(100).with_gas_price_multiplier(1.5),
//! )?;
//! assert_eq!(tx.gas_price, Some(150));
//!
//! if let Some(url) = manager.current_endpoint() {
//!     println!("submitting through {url}");
//! }
//! # Ok::<(), rpc_rotator::EndpointError>(())
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod manager;
pub mod signature;
pub mod types;

pub use config::{ManagerSettings, NetworkConfig};
pub use error::{EndpointError, Result};
pub use hash::{hash, keccak256};
pub use manager::EndpointManager;
pub use signature::{split_rsv, RsvSignature, SignatureError};
pub use types::{
    checked_scale_gas_price, scale_gas_price, TransactionRecord, TxParams,
    DEFAULT_GAS_PRICE_MULTIPLIER, PLACEHOLDER_NONCE,
};
