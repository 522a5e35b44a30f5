//! High-level API - [`LedgerEth`] wraps a transport connection to the
//! Ethereum app, and [`EthDevice`] is the seam the workflow signs through.

use ethers_core::types::Address;

use crate::commands;
use crate::error::LedgerError;
use crate::transport::{self, Transport, TransportType};
use crate::types::{AppConfiguration, DerivationPath, DeviceSignature};

/// First release with EIP-1559 typed transaction support.
const MIN_VERSION: (u8, u8, u8) = (1, 9, 0);

/// What the workflow needs from a signing device.
pub trait EthDevice {
    /// Address derived at `path`, without on-device confirmation.
    fn address(&self, path: &DerivationPath) -> Result<Address, LedgerError>;

    /// Sign a raw EIP-2718 payload. No resolution metadata is ever passed.
    fn sign_transaction(
        &self,
        path: &DerivationPath,
        payload: &[u8],
    ) -> Result<DeviceSignature, LedgerError>;
}

/// High-level interface to the Ledger Ethereum app.
pub struct LedgerEth {
    transport: Box<dyn Transport>,
}

impl LedgerEth {
    /// Connect to a Ledger device and verify the Ethereum app is open.
    pub fn new(transport_type: &TransportType) -> Result<Self, LedgerError> {
        let transport = transport::open(transport_type)?;
        let ledger = Self { transport };

        let config = ledger.get_configuration()?;
        if !version_ok(&config) {
            return Err(LedgerError::InvalidResponse(format!(
                "app {config} is too old - update to at least {}.{}.{}",
                MIN_VERSION.0, MIN_VERSION.1, MIN_VERSION.2,
            )));
        }
        log::info!("Ledger {config} ready");

        Ok(ledger)
    }

    /// Useful for testing or injecting a custom transport.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Query the app version and flags.
    pub fn get_configuration(&self) -> Result<AppConfiguration, LedgerError> {
        commands::get_configuration::exec(self.transport.as_ref())
    }

    pub fn get_address(&self, path: &DerivationPath) -> Result<Address, LedgerError> {
        commands::get_address::exec(self.transport.as_ref(), path)
    }

    pub fn sign_transaction(
        &self,
        path: &DerivationPath,
        payload: &[u8],
    ) -> Result<DeviceSignature, LedgerError> {
        log::debug!("sending {} byte payload for {path}", payload.len());
        commands::sign_tx::exec(self.transport.as_ref(), path, payload)
    }
}

impl EthDevice for LedgerEth {
    fn address(&self, path: &DerivationPath) -> Result<Address, LedgerError> {
        self.get_address(path)
    }

    fn sign_transaction(
        &self,
        path: &DerivationPath,
        payload: &[u8],
    ) -> Result<DeviceSignature, LedgerError> {
        LedgerEth::sign_transaction(self, path, payload)
    }
}

fn version_ok(c: &AppConfiguration) -> bool {
    (c.major, c.minor, c.patch) >= MIN_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::{ok, MockTransport};

    fn config(major: u8, minor: u8, patch: u8) -> AppConfiguration {
        AppConfiguration {
            flags: 0,
            major,
            minor,
            patch,
        }
    }

    #[test]
    fn version_ok_exact_minimum() {
        assert!(version_ok(&config(1, 9, 0)));
    }

    #[test]
    fn version_ok_above_minimum() {
        assert!(version_ok(&config(1, 9, 19)));
        assert!(version_ok(&config(1, 10, 0)));
        assert!(version_ok(&config(2, 0, 0)));
    }

    #[test]
    fn version_ok_below_minimum() {
        assert!(!version_ok(&config(1, 8, 255)));
        assert!(!version_ok(&config(0, 0, 0)));
    }

    #[test]
    fn with_transport_reads_configuration() {
        let transport = MockTransport::new(vec![ok(vec![0x0F, 1, 12, 0])]);
        let ledger = LedgerEth::with_transport(Box::new(transport));
        assert_eq!(ledger.get_configuration().unwrap(), config_with_flags());
    }

    fn config_with_flags() -> AppConfiguration {
        AppConfiguration {
            flags: 0x0F,
            ..config(1, 12, 0)
        }
    }
}
