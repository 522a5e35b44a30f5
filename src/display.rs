//! Plain-text rendering of transactions for the terminal.

use std::fmt::Write as _;

use ethers_core::types::{Address, Bytes};
use ethers_core::utils::to_checksum;

use crate::tx::{signature_hex, SignedTransaction, UnsignedTransaction};

pub const WRAP_WIDTH: usize = 60;

/// Split `s` into lines of at most `width` characters.
pub fn wrap(s: &str, width: usize) -> String {
    if width == 0 || s.is_empty() {
        return s.to_string();
    }
    s.chars()
        .collect::<Vec<_>>()
        .chunks(width)
        .map(|line| line.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn hex_bytes(bytes: &Bytes) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Summary shown before the user is asked to sign.
pub fn display_transaction(tx: &UnsignedTransaction, from: Address) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Chain ID: {}", tx.chain_id);
    let _ = writeln!(out, "Type: {}", tx.tx_type.label());
    let _ = writeln!(out, "From: {}", to_checksum(&from, None));
    let _ = writeln!(out, "To: {}", to_checksum(&tx.to(), None));
    let _ = writeln!(out, "Nonce: {}", tx.nonce);
    let _ = writeln!(out, "Value: {}", tx.value());
    let _ = writeln!(out, "Max priority fee per gas: {}", tx.max_priority_fee_per_gas);
    let _ = writeln!(out, "Max fee per gas: {}", tx.max_fee_per_gas);
    let _ = writeln!(out, "Gas limit: {}", tx.gas_limit);
    let _ = write!(out, "Data:\n{}", wrap(&hex_bytes(&tx.data()), WRAP_WIDTH));
    out
}

pub fn display_unsigned(unsigned: &Bytes) -> String {
    wrap(&hex_bytes(unsigned), WRAP_WIDTH)
}

/// The broadcast bytes stay on one line so they can be copied as is.
pub fn display_signed(signed: &SignedTransaction) -> String {
    let (r, s, v) = signature_hex(&signed.signature);
    format!(
        "r: {r}\ns: {s}\nv: {v}\n\nSigned transaction (bytes to broadcast):\n{}\n\nTransaction hash: {:#x}",
        hex_bytes(&signed.encode()),
        signed.hash()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{Payload, TxType};
    use ethers_core::types::{Signature, U256};

    fn tx() -> UnsignedTransaction {
        UnsignedTransaction {
            chain_id: 1,
            tx_type: TxType::Eip1559,
            nonce: U256::from(4u64),
            max_priority_fee_per_gas: U256::from(100_000_000u64),
            max_fee_per_gas: U256::from(1_100_000_000u64),
            gas_limit: U256::from(120_000u64),
            payload: Payload::Erc20Transfer {
                token: Address::repeat_byte(0xA0),
                recipient: Address::repeat_byte(0x02),
                amount: U256::from(5u64),
            },
        }
    }

    #[test]
    fn wrap_splits_at_width() {
        assert_eq!(wrap("abcdef", 4), "abcd\nef");
        assert_eq!(wrap("abcd", 4), "abcd");
        assert_eq!(wrap("", 4), "");
        let long = "a".repeat(130);
        let lines: Vec<_> = wrap(&long, WRAP_WIDTH).lines().map(str::len).collect();
        assert_eq!(lines, vec![60, 60, 10]);
    }

    #[test]
    fn summary_lists_every_field() {
        let out = display_transaction(&tx(), Address::repeat_byte(0x11));
        for needle in [
            "Chain ID: 1",
            "Type: EIP-1559",
            "From: 0x1111111111111111111111111111111111111111",
            "Nonce: 4",
            "Value: 0",
            "Max priority fee per gas: 100000000",
            "Max fee per gas: 1100000000",
            "Gas limit: 120000",
            "Data:\n0xa9059cbb",
        ] {
            assert!(out.contains(needle), "missing {needle:?} in\n{out}");
        }
        assert!(out.lines().all(|l| l.len() <= WRAP_WIDTH));
    }

    #[test]
    fn signed_output_has_bytes_and_hash() {
        let signed = tx().with_signature(Signature {
            r: U256::one(),
            s: U256::from(2u64),
            v: 1,
        });
        let out = display_signed(&signed);
        assert!(out.contains("v: 0x01"));
        assert!(out.contains(&format!("Transaction hash: {:#x}", signed.hash())));
    }

    #[test]
    fn broadcast_bytes_are_not_wrapped() {
        let signed = tx().with_signature(Signature {
            r: U256::MAX,
            s: U256::MAX,
            v: 0,
        });
        let wire = hex_bytes(&signed.encode());
        assert!(wire.len() > WRAP_WIDTH);

        let out = display_signed(&signed);
        assert!(out.lines().any(|line| line == wire), "wire hex not on one line in\n{out}");
    }
}
