// Endpoint manager
// - Loads candidate RPC endpoints from a providers file
// - Round-robin failover between them
// - Builds transaction parameter records for the sending account

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{EndpointError, Result};
use crate::types::{checked_scale_gas_price, TransactionRecord, TxParams, PLACEHOLDER_NONCE};

/// Key holding the endpoint list in a providers document
const NODES_KEY: &str = "nodes";

/// RPC endpoint list with a selection cursor, bound to one sending account
///
/// The manager holds no locks: loading and advancing take `&mut self`, so
/// sharing one instance between threads needs an outer `Mutex`.
#[derive(Debug, Clone)]
pub struct EndpointManager {
    /// Endpoint URLs in file order, duplicates allowed
    endpoints: Vec<String>,
    /// Index of the selected endpoint; only meaningful when `endpoints` is non-empty
    selection_index: usize,
    /// Sending account, fixed for the lifetime of the manager
    account_address: String,
    /// Substitute `PLACEHOLDER_NONCE` when the caller omits a nonce
    placeholder_nonce: bool,
}

impl EndpointManager {
    /// Create a manager with no endpoints for `account_address`.
    ///
    /// Transactions built by this manager must carry an explicit nonce.
    pub fn new(account_address: impl Into<String>) -> Self {
        Self {
            endpoints: Vec::new(),
            selection_index: 0,
            account_address: account_address.into(),
            placeholder_nonce: false,
        }
    }

    /// Create a manager in testing mode: an omitted nonce becomes `1`.
    ///
    /// Never use this against a live chain, the placeholder nonce is only
    /// correct for a fresh account.
    pub fn for_testing(account_address: impl Into<String>) -> Self {
        Self::new(account_address).with_placeholder_nonce(true)
    }

    /// Toggle the placeholder nonce (testing mode)
    pub fn with_placeholder_nonce(mut self, enabled: bool) -> Self {
        self.placeholder_nonce = enabled;
        self
    }

    /// Sending account address
    pub fn account_address(&self) -> &str {
        &self.account_address
    }

    /// Whether an omitted nonce falls back to the placeholder
    pub fn placeholder_nonce(&self) -> bool {
        self.placeholder_nonce
    }

    /// Loaded endpoint URLs
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Raw selection cursor
    pub fn selection_index(&self) -> usize {
        self.selection_index
    }

    /// Currently selected endpoint, `None` when no endpoints are loaded
    pub fn current_endpoint(&self) -> Option<&str> {
        self.endpoints
            .get(self.selection_index)
            .map(String::as_str)
    }

    // =========================================================================
    // ENDPOINT LOADING
    // =========================================================================

    /// Replace the endpoint list with the contents of a JSON providers file.
    ///
    /// The file is expected to look like `{"nodes": ["http://...", ...]}`.
    /// Non-string entries in `nodes` are dropped, and a document without
    /// `nodes` clears the list. On success the selection is reset to the
    /// first endpoint.
    pub fn load_endpoints(&mut self, source: impl AsRef<Path>) -> Result<()> {
        let path = source.as_ref();
        if path.as_os_str().is_empty() {
            return Err(EndpointError::InvalidArgument(
                "providers file cannot be empty".to_string(),
            ));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| EndpointError::from_io(path.to_path_buf(), e))?;

        debug!("Loading providers from {}", path.display());
        self.load_endpoints_from_str(&content)
    }

    /// Same as [`load_endpoints`](Self::load_endpoints) for an in-memory document
    pub fn load_endpoints_from_str(&mut self, content: &str) -> Result<()> {
        let document: Value = serde_json::from_str(content)?;
        let (endpoints, dropped) = extract_nodes(&document);

        if dropped > 0 {
            debug!("Dropped {} non-string provider entries", dropped);
        }

        self.set_endpoints(endpoints);
        Ok(())
    }

    /// Replace the endpoint list directly and reset the selection
    pub fn set_endpoints(&mut self, endpoints: Vec<String>) {
        if endpoints.is_empty() {
            warn!("Provider list is empty, endpoint rotation unavailable");
        } else {
            debug!("Loaded {} providers", endpoints.len());
        }

        self.endpoints = endpoints;
        self.selection_index = 0;
    }

    // =========================================================================
    // ROTATION
    // =========================================================================

    /// Move the selection to the next endpoint, wrapping after the last one.
    ///
    /// Returns the newly selected endpoint.
    pub fn advance_endpoint(&mut self) -> Result<&str> {
        if self.endpoints.is_empty() {
            return Err(EndpointError::OutOfRange);
        }

        self.selection_index = (self.selection_index + 1) % self.endpoints.len();
        let selected = &self.endpoints[self.selection_index];
        debug!("Switched to provider {} ({})", self.selection_index, selected);

        Ok(selected.as_str())
    }

    // =========================================================================
    // TRANSACTION ASSEMBLY
    // =========================================================================

    /// Build the parameter record for a transaction sent from this account.
    ///
    /// `data`, `gas` and `gas_price` appear in the record only when given;
    /// `gas_price` is scaled by the multiplier and truncated. Only the nonce
    /// requirement and gas price overflow are checked: address format and
    /// balance checks belong to the signer and the node.
    pub fn build_transaction(&self, params: TxParams) -> Result<TransactionRecord> {
        let multiplier = params.effective_multiplier();

        let nonce = match params.nonce {
            Some(nonce) => nonce,
            None if self.placeholder_nonce => PLACEHOLDER_NONCE,
            None => {
                return Err(EndpointError::InvalidArgument(
                    "nonce is required outside testing mode".to_string(),
                ))
            }
        };

        let gas_price = match params.gas_price {
            Some(base) => match checked_scale_gas_price(base, multiplier) {
                Some(scaled) => Some(scaled),
                None => {
                    warn!("Gas price {} x {} is out of range", base, multiplier);
                    return Err(EndpointError::InvalidArgument(format!(
                        "gas price {} x {} is out of range",
                        base, multiplier
                    )));
                }
            },
            None => None,
        };

        Ok(TransactionRecord {
            from: self.account_address.clone(),
            to: params.to,
            nonce,
            value: params.value,
            data: params.data,
            gas: params.gas,
            gas_price,
        })
    }
}

/// Collect the string entries of `nodes`, returning them with the number dropped.
///
/// A missing key, a non-object document or a non-array `nodes` value all
/// produce an empty list.
fn extract_nodes(document: &Value) -> (Vec<String>, usize) {
    let Some(nodes) = document.get(NODES_KEY).and_then(Value::as_array) else {
        return (Vec::new(), 0);
    };

    let endpoints: Vec<String> = nodes
        .iter()
        .filter_map(|node| node.as_str().map(str::to_string))
        .collect();
    let dropped = nodes.len() - endpoints.len();

    (endpoints, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn providers_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn two_nodes() -> EndpointManager {
        let mut manager = EndpointManager::for_testing("0x123");
        manager
            .load_endpoints_from_str(r#"{"nodes": ["http://node1", "http://node2"]}"#)
            .unwrap();
        manager
    }

    #[test]
    fn test_new_manager_is_empty() {
        let manager = EndpointManager::new("0x123");
        assert!(manager.endpoints().is_empty());
        assert_eq!(manager.selection_index(), 0);
        assert_eq!(manager.current_endpoint(), None);
        assert!(!manager.placeholder_nonce());
    }

    #[test]
    fn test_load_endpoints_valid_file() {
        let file = providers_file(r#"{"nodes": ["http://node1", "http://node2"]}"#);
        let mut manager = EndpointManager::new("0x123");

        manager.load_endpoints(file.path()).unwrap();

        assert_eq!(manager.endpoints(), ["http://node1", "http://node2"]);
        assert_eq!(manager.current_endpoint(), Some("http://node1"));
    }

    #[test]
    fn test_load_endpoints_no_nodes_key() {
        let file = providers_file(r#"{"invalid": "data"}"#);
        let mut manager = two_nodes();

        manager.load_endpoints(file.path()).unwrap();

        assert!(manager.endpoints().is_empty());
    }

    #[test]
    fn test_load_endpoints_invalid_json() {
        let file = providers_file("invalid json");
        let mut manager = EndpointManager::new("0x123");

        let result = manager.load_endpoints(file.path());
        assert!(matches!(result, Err(EndpointError::ParseError(_))));
    }

    #[test]
    fn test_load_endpoints_empty_path() {
        let mut manager = EndpointManager::new("0x123");

        let result = manager.load_endpoints("");
        assert!(matches!(result, Err(EndpointError::InvalidArgument(_))));
    }

    #[test]
    fn test_load_endpoints_file_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = EndpointManager::new("0x123");

        let result = manager.load_endpoints(dir.path().join("nonexistent.json"));
        assert!(matches!(result, Err(EndpointError::NotFound { .. })));
    }

    #[test]
    fn test_load_endpoints_drops_non_strings() {
        let mut manager = EndpointManager::new("0x123");
        manager
            .load_endpoints_from_str(
                r#"{"nodes": [1, "http://a", null, {"url": "x"}, "http://b", ["c"], "http://a"]}"#,
            )
            .unwrap();

        assert_eq!(manager.endpoints(), ["http://a", "http://b", "http://a"]);
    }

    #[test]
    fn test_load_endpoints_non_array_nodes() {
        let mut manager = EndpointManager::new("0x123");
        manager
            .load_endpoints_from_str(r#"{"nodes": "http://a"}"#)
            .unwrap();
        assert!(manager.endpoints().is_empty());

        manager.load_endpoints_from_str(r#"["nodes"]"#).unwrap();
        assert!(manager.endpoints().is_empty());
    }

    #[test]
    fn test_reload_replaces_and_resets_selection() {
        let mut manager = EndpointManager::new("0x123");
        manager
            .load_endpoints_from_str(r#"{"nodes": ["a", "b", "c"]}"#)
            .unwrap();
        manager.advance_endpoint().unwrap();
        manager.advance_endpoint().unwrap();
        assert_eq!(manager.selection_index(), 2);

        manager.load_endpoints_from_str(r#"{"nodes": ["d"]}"#).unwrap();

        assert_eq!(manager.endpoints(), ["d"]);
        assert_eq!(manager.selection_index(), 0);
        assert_eq!(manager.current_endpoint(), Some("d"));
    }

    #[test]
    fn test_reload_same_file_is_stable() {
        let file = providers_file(r#"{"nodes": ["http://node1", 5, "http://node2"]}"#);
        let mut manager = EndpointManager::new("0x123");

        manager.load_endpoints(file.path()).unwrap();
        let first = manager.endpoints().to_vec();
        manager.load_endpoints(file.path()).unwrap();

        assert_eq!(manager.endpoints(), first.as_slice());
    }

    #[test]
    fn test_failed_load_keeps_previous_list() {
        let mut manager = two_nodes();
        manager.advance_endpoint().unwrap();

        assert!(manager.load_endpoints_from_str("{").is_err());

        assert_eq!(manager.endpoints().len(), 2);
        assert_eq!(manager.selection_index(), 1);
    }

    #[test]
    fn test_advance_endpoint_no_providers() {
        let mut manager = EndpointManager::new("0x123");
        assert!(matches!(
            manager.advance_endpoint(),
            Err(EndpointError::OutOfRange)
        ));
    }

    #[test]
    fn test_advance_endpoint_valid_providers() {
        let mut manager = two_nodes();

        let selected = manager.advance_endpoint().unwrap().to_string();

        assert_eq!(selected, "http://node2");
        assert_eq!(manager.selection_index(), 1);
    }

    #[test]
    fn test_advance_endpoint_wraps() {
        let mut manager = two_nodes();
        manager.advance_endpoint().unwrap();
        manager.advance_endpoint().unwrap();

        assert_eq!(manager.selection_index(), 0);
        assert_eq!(manager.current_endpoint(), Some("http://node1"));
    }

    #[test]
    fn test_build_transaction_minimal_params() {
        let manager = EndpointManager::for_testing("0x123");

        let tx = manager.build_transaction(TxParams::new("0x456")).unwrap();

        assert_eq!(
            tx,
            TransactionRecord {
                from: "0x123".to_string(),
                to: "0x456".to_string(),
                nonce: 1,
                value: 0,
                data: None,
                gas: None,
                gas_price: None,
            }
        );
    }

    #[test]
    fn test_build_transaction_with_data() {
        let manager = EndpointManager::for_testing("0x123");

        let tx = manager
            .build_transaction(TxParams::new("0x456").with_data(b"test_data".to_vec()).with_nonce(5))
            .unwrap();

        assert_eq!(
            tx,
            TransactionRecord {
                from: "0x123".to_string(),
                to: "0x456".to_string(),
                nonce: 5,
                value: 0,
                data: Some(b"test_data".to_vec()),
                gas: None,
                gas_price: None,
            }
        );
    }

    #[test]
    fn test_build_transaction_gas_price_multiplier() {
        let manager = EndpointManager::for_testing("0x123");

        let tx = manager
            .build_transaction(
                TxParams::new("0x789")
                    .with_gas_price(100)
                    .with_gas_price_multiplier(1.5),
            )
            .unwrap();

        assert_eq!(tx.gas_price, Some(150));
    }

    #[test]
    fn test_build_transaction_gas_price_without_multiplier() {
        let manager = EndpointManager::new("0x123");

        let tx = manager
            .build_transaction(TxParams::new("0x789").with_nonce(0).with_gas(21_000).with_gas_price(7))
            .unwrap();

        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.gas, Some(21_000));
        assert_eq!(tx.gas_price, Some(7));
    }

    #[test]
    fn test_build_transaction_gas_price_overflow() {
        let manager = EndpointManager::for_testing("0x123");

        let result = manager.build_transaction(
            TxParams::new("0x789")
                .with_gas_price(u128::MAX)
                .with_gas_price_multiplier(2.0),
        );

        assert!(matches!(result, Err(EndpointError::InvalidArgument(_))));
    }

    #[test]
    fn test_multiplier_without_gas_price_is_ignored() {
        let manager = EndpointManager::for_testing("0x123");

        let tx = manager
            .build_transaction(TxParams::new("0x789").with_gas_price_multiplier(3.0))
            .unwrap();

        assert!(tx.gas_price.is_none());
    }

    #[test]
    fn test_build_transaction_requires_nonce_outside_testing() {
        let manager = EndpointManager::new("0x123");

        let result = manager.build_transaction(TxParams::new("0x456"));
        assert!(matches!(result, Err(EndpointError::InvalidArgument(_))));
    }

    #[test]
    fn test_build_transaction_leaves_selection_alone() {
        let mut manager = two_nodes();
        manager.advance_endpoint().unwrap();

        manager
            .build_transaction(TxParams::new("0x456").with_value(10))
            .unwrap();

        assert_eq!(manager.selection_index(), 1);
        assert_eq!(manager.endpoints().len(), 2);
    }

    fn node_entry() -> impl Strategy<Value = Option<String>> {
        prop::option::of("http://[a-z]{1,8}")
    }

    proptest! {
        #[test]
        fn prop_load_keeps_only_strings_in_order(entries in prop::collection::vec(node_entry(), 0..20)) {
            let nodes: Vec<Value> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| match e {
                    Some(url) => Value::String(url.clone()),
                    None if i % 2 == 0 => Value::from(i as u64),
                    None => Value::Null,
                })
                .collect();
            let document = serde_json::json!({ "nodes": nodes }).to_string();
            let expected: Vec<String> = entries.into_iter().flatten().collect();

            let mut manager = EndpointManager::new("0x123");
            manager.load_endpoints_from_str(&document).unwrap();

            prop_assert_eq!(manager.endpoints(), expected.as_slice());
        }

        #[test]
        fn prop_advance_cycles(len in 1usize..16, start in 0usize..16) {
            let mut manager = EndpointManager::new("0x123");
            manager.set_endpoints((0..len).map(|i| format!("http://node{}", i)).collect());
            for _ in 0..(start % len) {
                manager.advance_endpoint().unwrap();
            }
            let origin = manager.selection_index();

            manager.advance_endpoint().unwrap();
            prop_assert_eq!(manager.selection_index(), (origin + 1) % len);

            for _ in 1..len {
                manager.advance_endpoint().unwrap();
            }
            prop_assert_eq!(manager.selection_index(), origin);
        }
    }
}
