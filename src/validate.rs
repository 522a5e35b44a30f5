//! Input validators.
//!
//! Each takes the raw string typed by the user and returns either the typed
//! value or the message to show before asking again.

use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::to_checksum;

use crate::types::PathTemplate;

pub type Validation<T> = Result<T, String>;

pub fn required(raw: &str) -> Validation<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Value is required".into());
    }
    Ok(trimmed.to_string())
}

/// 20-byte hex address, `0x` optional. Mixed case must be a valid EIP-55
/// checksum.
pub fn address(raw: &str) -> Validation<Address> {
    const MSG: &str = "Enter a valid address";

    let raw = raw.trim();
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(MSG.into());
    }
    let bytes = hex::decode(digits).map_err(|_| MSG)?;
    let address = Address::from_slice(&bytes);

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && to_checksum(&address, None)[2..] != *digits {
        return Err("Address checksum does not match, check the letter casing".into());
    }
    Ok(address)
}

/// Decimal integer >= 0. The parsed value must print back exactly as typed,
/// which rules out `1.5`, `1e3`, `01`, signs and trailing garbage.
pub fn non_negative(raw: &str) -> Validation<U256> {
    const MSG: &str = "Enter a positive number or zero (0, 1, 2, 3...)";

    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MSG.into());
    }
    let value = U256::from_dec_str(raw).map_err(|_| "Number is too large")?;
    if value.to_string() != raw {
        return Err(MSG.into());
    }
    Ok(value)
}

pub fn positive(raw: &str) -> Validation<U256> {
    let value = non_negative(raw).map_err(|_| "Enter a positive number (1, 2, 3...)")?;
    if value.is_zero() {
        return Err("Enter a positive number (1, 2, 3...)".into());
    }
    Ok(value)
}

/// Blank means zero, otherwise as [`non_negative`].
pub fn amount_or_zero(raw: &str) -> Validation<U256> {
    if raw.trim().is_empty() {
        return Ok(U256::zero());
    }
    non_negative(raw)
}

pub fn chain_id(raw: &str) -> Validation<u64> {
    let value = positive(raw)?;
    if value > U256::from(u64::MAX) {
        return Err("Chain id is too large".into());
    }
    Ok(value.as_u64())
}

/// `0x`-prefixed, even-length hex; `0x` alone is empty calldata.
pub fn calldata(raw: &str) -> Validation<Bytes> {
    const MSG: &str = "Enter hex calldata starting with 0x (e.g., 0x12dd34ff)";

    let digits = raw.trim().strip_prefix("0x").ok_or(MSG)?;
    let bytes = hex::decode(digits).map_err(|_| MSG)?;
    Ok(bytes.into())
}

pub fn path_template(raw: &str) -> Validation<PathTemplate> {
    let raw = required(raw)?;
    PathTemplate::parse(&raw).map_err(|e| e.to_string())
}

/// Index substituted into the path; must stay below the hardened bit.
pub fn path_index(raw: &str) -> Validation<u32> {
    let value = non_negative(raw)?;
    if value >= U256::from(0x8000_0000u32) {
        return Err("Index must be below 2147483648".into());
    }
    Ok(value.as_u32())
}
