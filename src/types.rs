// Transaction parameter types

use serde::{Deserialize, Serialize};

/// Multiplier applied to a base gas price when the caller gives none
pub const DEFAULT_GAS_PRICE_MULTIPLIER: f64 = 1.0;

/// Nonce used when the manager runs in testing mode and the caller omits one
pub const PLACEHOLDER_NONCE: u64 = 1;

/// Helper module for serializing Option<Vec<u8>> as 0x-prefixed hex
mod option_hex_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(d) => serializer.serialize_str(&format!("0x{}", hex::encode(d))),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            Some(s) => {
                let s = s.strip_prefix("0x").unwrap_or(&s);
                hex::decode(s).map(Some).map_err(serde::de::Error::custom)
            }
            None => Ok(None),
        }
    }
}

/// Caller-supplied inputs for [`crate::EndpointManager::build_transaction`]
#[derive(Debug, Clone, PartialEq)]
pub struct TxParams {
    /// Destination address (not validated)
    pub to: String,
    /// Amount in the chain's smallest unit
    pub value: u128,
    /// Call data
    pub data: Option<Vec<u8>>,
    /// Account nonce; required unless the manager is in testing mode
    pub nonce: Option<u64>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Base gas price in the chain's smallest unit
    pub gas_price: Option<u128>,
    /// Scale factor for `gas_price`; `None` means 1.0
    pub gas_price_multiplier: Option<f64>,
}

impl TxParams {
    /// Create params for a plain transfer of zero value to `to`
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            value: 0,
            data: None,
            nonce: None,
            gas: None,
            gas_price: None,
            gas_price_multiplier: None,
        }
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_gas_price_multiplier(mut self, multiplier: f64) -> Self {
        self.gas_price_multiplier = Some(multiplier);
        self
    }

    /// Multiplier that will actually be applied
    pub fn effective_multiplier(&self) -> f64 {
        self.gas_price_multiplier
            .unwrap_or(DEFAULT_GAS_PRICE_MULTIPLIER)
    }
}

/// Scale a base gas price, truncating toward zero.
///
/// The float cast saturates: a negative or NaN product yields 0 and an
/// overflowing one yields `u128::MAX`.
pub fn scale_gas_price(base: u128, multiplier: f64) -> u128 {
    (base as f64 * multiplier) as u128
}

/// Like [`scale_gas_price`], but `None` when the product is NaN or does not
/// fit in a `u128`. A negative product still clamps to 0.
pub fn checked_scale_gas_price(base: u128, multiplier: f64) -> Option<u128> {
    let scaled = base as f64 * multiplier;
    // u128::MAX as f64 rounds up to 2^128, the first value that overflows
    if scaled.is_nan() || scaled >= u128::MAX as f64 {
        return None;
    }
    Some(scaled as u128)
}

/// Normalized transaction parameters, ready for a signer
///
/// Optional fields are omitted from the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Sending account (the manager's fixed address)
    pub from: String,
    /// Destination address
    pub to: String,
    /// Account nonce
    pub nonce: u64,
    /// Transfer amount
    pub value: u128,
    /// Call data, hex encoded on the wire
    #[serde(default, skip_serializing_if = "Option::is_none", with = "option_hex_serde")]
    pub data: Option<Vec<u8>>,
    /// Gas limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<u64>,
    /// Gas price after the multiplier was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u128>,
}
