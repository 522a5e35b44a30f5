//! EIP-1559 transaction model and its wire encoding.
//!
//! RLP, ABI and keccak come from `ethers-core`; this module decides what
//! goes into the transaction and how the device's `(v, r, s)` is attached.

use ethers_core::abi::{self, Token};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{
    Address, Bytes, Eip1559TransactionRequest, Signature, H256, U256,
};
use ethers_core::utils::{id, keccak256};

use crate::types::DeviceSignature;

pub const TRANSFER_SIGNATURE: &str = "transfer(address,uint256)";

/// Transaction envelope. Only the fee-market format is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TxType {
    #[default]
    Eip1559 = 2,
}

impl TxType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Eip1559 => "EIP-1559",
        }
    }
}

/// What the transaction does; each variant carries only its own fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Plain value transfer, empty calldata.
    Native { to: Address, value: U256 },
    /// `transfer(recipient, amount)` on `token`, zero value.
    Erc20Transfer {
        token: Address,
        recipient: Address,
        amount: U256,
    },
    /// Arbitrary calldata (possibly empty) sent to `to`.
    RawCustom { to: Address, value: U256, data: Bytes },
}

impl Payload {
    pub fn to(&self) -> Address {
        match self {
            Self::Native { to, .. } | Self::RawCustom { to, .. } => *to,
            Self::Erc20Transfer { token, .. } => *token,
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            Self::Native { value, .. } | Self::RawCustom { value, .. } => *value,
            Self::Erc20Transfer { .. } => U256::zero(),
        }
    }

    pub fn data(&self) -> Bytes {
        match self {
            Self::Native { .. } => Bytes::default(),
            Self::Erc20Transfer {
                recipient, amount, ..
            } => transfer_calldata(*recipient, *amount),
            Self::RawCustom { data, .. } => data.clone(),
        }
    }

    pub fn is_token_transfer(&self) -> bool {
        matches!(self, Self::Erc20Transfer { .. })
    }
}

/// `transfer(address,uint256)` selector followed by the ABI-encoded arguments.
pub fn transfer_calldata(recipient: Address, amount: U256) -> Bytes {
    let mut data = id(TRANSFER_SIGNATURE).to_vec();
    data.extend(abi::encode(&[Token::Address(recipient), Token::Uint(amount)]));
    data.into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub tx_type: TxType,
    pub nonce: U256,
    pub max_priority_fee_per_gas: U256,
    /// Always `max_priority_fee_per_gas + base fee`; see [`max_fee_per_gas`].
    pub max_fee_per_gas: U256,
    pub gas_limit: U256,
    pub payload: Payload,
}

/// Checked sum; `None` on overflow rather than a truncated fee.
pub fn max_fee_per_gas(priority_fee: U256, base_fee: U256) -> Option<U256> {
    priority_fee.checked_add(base_fee)
}

impl UnsignedTransaction {
    pub fn to(&self) -> Address {
        self.payload.to()
    }

    pub fn value(&self) -> U256 {
        self.payload.value()
    }

    pub fn data(&self) -> Bytes {
        self.payload.data()
    }

    pub fn typed(&self) -> TypedTransaction {
        Eip1559TransactionRequest::new()
            .chain_id(self.chain_id)
            .nonce(self.nonce)
            .to(self.to())
            .value(self.value())
            .data(self.data())
            .max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .max_fee_per_gas(self.max_fee_per_gas)
            .gas(self.gas_limit)
            .into()
    }

    /// `0x02 || rlp([chainId, nonce, ..., accessList])`, what the device signs.
    pub fn encode(&self) -> Bytes {
        self.typed().rlp()
    }

    /// Hash the device signs over.
    pub fn sighash(&self) -> H256 {
        self.typed().sighash()
    }

    pub fn with_signature(self, signature: Signature) -> SignedTransaction {
        SignedTransaction {
            tx: self,
            signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub tx: UnsignedTransaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Bytes to broadcast.
    pub fn encode(&self) -> Bytes {
        self.tx.typed().rlp_signed(&self.signature)
    }

    pub fn hash(&self) -> H256 {
        H256::from(keccak256(self.encode()))
    }

    pub fn recover_signer(&self) -> Result<Address, ethers_core::types::SignatureError> {
        self.signature.recover(self.tx.sighash())
    }
}

/// Reduce the device's one-byte `v` to the y-parity (0 or 1).
///
/// For typed transactions the app answers with the parity itself, so 0 and 1
/// are always returned unchanged, whatever the chain id. Older apps answered
/// `27 + parity`, or the EIP-155 value, truncated to a byte when
/// `chain_id * 2 + 36` does not fit; the parity is then taken against the
/// truncated base. Only bytes above 1 are read that way: a legacy value that
/// truncates to 0 or 1 (chain 110, odd parity) is indistinguishable from a
/// typed answer and is left to the signer's recovery check.
pub fn normalize_v(v: u8, chain_id: u64) -> u64 {
    let v = u64::from(v);
    if v <= 1 {
        return v;
    }
    let base = u128::from(chain_id) * 2 + 35;
    if base + 1 > 255 {
        let truncated = (base % 256) as u64;
        return v.abs_diff(truncated) % 2;
    }
    match v {
        27 | 28 => v - 27,
        _ => v.saturating_sub(35) % 2,
    }
}

/// Normalized signature ready to attach: `r` and `s` as 32-byte words,
/// `v` as the y-parity.
pub fn signature_from_device(raw: &DeviceSignature, chain_id: u64) -> Signature {
    Signature {
        r: U256::from_big_endian(&raw.r),
        s: U256::from_big_endian(&raw.s),
        v: normalize_v(raw.v, chain_id),
    }
}

/// `(r, s, v)` as fixed-width hex: 32-byte `r` and `s`, one-byte `v`.
pub fn signature_hex(signature: &Signature) -> (String, String, String) {
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    signature.r.to_big_endian(&mut r);
    signature.s.to_big_endian(&mut s);
    (
        format!("0x{}", hex::encode(r)),
        format!("0x{}", hex::encode(s)),
        format!("0x{:02x}", signature.v),
    )
}
