use ethers_core::types::Address;
use ethers_core::utils::keccak256;

use crate::apdu::{ApduCommand, Instruction, P1_NO_DISPLAY, P2_NO_CHAINCODE};
use crate::commands::send;
use crate::error::LedgerError;
use crate::transport::Transport;
use crate::types::DerivationPath;

const PUBKEY_LEN: usize = 65;
const ADDRESS_HEX_LEN: usize = 40;

/// Response: `[65][uncompressed pubkey][40][address as ASCII hex]`
///
/// The address is cross-checked against the keccak-256 of the public key.
pub fn exec(transport: &dyn Transport, path: &DerivationPath) -> Result<Address, LedgerError> {
    let cmd = ApduCommand::with_data(
        Instruction::GetAddress,
        P1_NO_DISPLAY,
        P2_NO_CHAINCODE,
        path.serialize(),
    );
    let data = send(transport, &cmd)?;
    parse_address_response(&data)
}

pub(crate) fn parse_address_response(data: &[u8]) -> Result<Address, LedgerError> {
    if data.is_empty() {
        return Err(LedgerError::InvalidResponse("empty address response".into()));
    }

    let pk_len = data[0] as usize;
    if pk_len != PUBKEY_LEN || data.len() < 1 + pk_len + 1 {
        return Err(LedgerError::InvalidResponse(format!(
            "unexpected pubkey length: {pk_len}"
        )));
    }
    let pubkey = &data[1..1 + PUBKEY_LEN];

    let addr_len = data[1 + PUBKEY_LEN] as usize;
    let addr_start = 2 + PUBKEY_LEN;
    if addr_len != ADDRESS_HEX_LEN || data.len() < addr_start + addr_len {
        return Err(LedgerError::InvalidResponse(format!(
            "unexpected address length: {addr_len}"
        )));
    }

    let ascii = std::str::from_utf8(&data[addr_start..addr_start + addr_len])
        .map_err(|_| LedgerError::InvalidResponse("address is not ASCII".into()))?;
    let bytes = hex::decode(ascii)
        .map_err(|e| LedgerError::InvalidResponse(format!("address is not hex: {e}")))?;
    let address = Address::from_slice(&bytes);

    let derived = Address::from_slice(&keccak256(&pubkey[1..])[12..]);
    if derived != address {
        return Err(LedgerError::InvalidResponse(format!(
            "address {address:?} does not match public key ({derived:?})"
        )));
    }

    Ok(address)
}
