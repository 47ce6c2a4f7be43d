// Signature helpers
// Splits a 65-byte recoverable signature into its r, s and v components

/// Hex length of a 65-byte signature (r || s || v)
const SIGNATURE_HEX_LEN: usize = 130;

/// Components of a recoverable signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvSignature {
    /// First 32 bytes, hex without prefix
    pub r: String,
    /// Second 32 bytes, hex without prefix
    pub s: String,
    /// Recovery byte
    pub v: u8,
}

/// Split a hex signature (with or without `0x`) into r, s and v
pub fn split_rsv(signature: &str) -> Result<RsvSignature, SignatureError> {
    let signature = signature.strip_prefix("0x").unwrap_or(signature);

    if signature.len() != SIGNATURE_HEX_LEN {
        return Err(SignatureError::InvalidLength(signature.len()));
    }

    let bytes = hex::decode(signature).map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

    Ok(RsvSignature {
        r: hex::encode(&bytes[..32]),
        s: hex::encode(&bytes[32..64]),
        v: bytes[64],
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Invalid signature length: {0} hex chars (expected 130)")]
    InvalidLength(usize),

    #[error("Invalid signature hex: {0}")]
    InvalidHex(String),
}
