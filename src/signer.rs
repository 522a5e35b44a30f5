//! Signing coordinator: reconnect, check the account, hand the payload to the
//! device and verify what comes back.

use ethers_core::types::Address;

use crate::api::EthDevice;
use crate::error::{Error, LedgerError};
use crate::session::{Backoff, Connect, RetryingConnector, Sleep};
use crate::tx::{signature_from_device, SignedTransaction, UnsignedTransaction};
use crate::types::DerivationPath;

/// Where the last [`Signer::sign`] call got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignerState {
    #[default]
    Idle,
    Connecting,
    AwaitingDeviceApproval,
    Signed,
    Declined,
    Failed,
}

pub struct Signer<'a, C, B, S> {
    connector: &'a RetryingConnector<C, B, S>,
    state: SignerState,
}

impl<'a, C: Connect, B: Backoff, S: Sleep> Signer<'a, C, B, S> {
    pub fn new(connector: &'a RetryingConnector<C, B, S>) -> Self {
        Self {
            connector,
            state: SignerState::Idle,
        }
    }

    pub fn state(&self) -> SignerState {
        self.state
    }

    /// Sign `tx` with the key at `path`.
    ///
    /// When `expected` is set the device must report that address at `path`,
    /// otherwise nothing is sent for signing.
    pub fn sign(
        &mut self,
        path: &DerivationPath,
        tx: &UnsignedTransaction,
        expected: Option<Address>,
    ) -> Result<SignedTransaction, Error> {
        let result = self.run(path, tx, expected);
        self.state = match &result {
            Ok(_) => SignerState::Signed,
            Err(Error::Declined) => SignerState::Declined,
            Err(_) => SignerState::Failed,
        };
        result
    }

    fn run(
        &mut self,
        path: &DerivationPath,
        tx: &UnsignedTransaction,
        expected: Option<Address>,
    ) -> Result<SignedTransaction, Error> {
        self.state = SignerState::Connecting;
        let session = self.connector.connect(path);
        let address = session.address();
        if let Some(expected) = expected {
            if expected != address {
                return Err(Error::AddressMismatch {
                    expected,
                    actual: address,
                });
            }
        }

        self.state = SignerState::AwaitingDeviceApproval;
        let payload = tx.encode();
        log::info!("waiting for approval of {} byte payload on device", payload.len());
        let raw = match session.device().sign_transaction(path, &payload) {
            Ok(raw) => raw,
            Err(LedgerError::UserRejected) => return Err(Error::Declined),
            Err(e) => return Err(e.into()),
        };
        log::debug!("device signature {raw}");

        let signed = tx.clone().with_signature(signature_from_device(&raw, tx.chain_id));
        let recovered = signed.recover_signer()?;
        if recovered != address {
            return Err(Error::SignatureMismatch {
                expected: address,
                recovered,
            });
        }
        Ok(signed)
    }
}
