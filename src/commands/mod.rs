//! Individual command implementations.
//!
//! You probably want [`LedgerEth`](crate::api::LedgerEth) instead.

pub mod get_address;
pub mod get_configuration;
pub mod sign_tx;

use crate::apdu::ApduCommand;
use crate::error::{LedgerError, StatusWord};
use crate::transport::Transport;

/// Exchange one APDU and map a non-success status word to an error.
pub(crate) fn send(transport: &dyn Transport, command: &ApduCommand) -> Result<Vec<u8>, LedgerError> {
    let answer = transport.exchange(command)?;
    if !StatusWord::is_success(answer.status()) {
        log::debug!("{:?} failed with status 0x{:04X}", command.ins, answer.status());
        return Err(LedgerError::from_status(answer.status()));
    }
    Ok(answer.into_data())
}
