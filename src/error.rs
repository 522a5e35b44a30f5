//! Error types and Ledger status word mapping.

use ethers_core::types::{Address, SignatureError};
use thiserror::Error;

/// Raw status words returned by the Ethereum app (and the dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusWord {
    Ok = 0x9000,
    DeviceLocked = 0x5515,
    AppNotOpen = 0x6511,
    SecurityStatusNotSatisfied = 0x6982,
    /// `CONDITIONS_OF_USE_NOT_SATISFIED` -- the user declined on the device.
    ConditionsOfUseNotSatisfied = 0x6985,
    InvalidData = 0x6A80,
    IncorrectParameters = 0x6B00,
    InsNotSupported = 0x6D00,
    ClaNotSupported = 0x6E00,
    AppNotOpenLegacy = 0x6E01,
}

impl StatusWord {
    const ALL: [Self; 10] = [
        Self::Ok,
        Self::DeviceLocked,
        Self::AppNotOpen,
        Self::SecurityStatusNotSatisfied,
        Self::ConditionsOfUseNotSatisfied,
        Self::InvalidData,
        Self::IncorrectParameters,
        Self::InsNotSupported,
        Self::ClaNotSupported,
        Self::AppNotOpenLegacy,
    ];

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|sw| *sw as u16 == code)
    }

    pub(crate) fn is_success(code: u16) -> bool {
        code == Self::Ok as u16
    }
}

/// Errors returned by the device layer.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("device returned status 0x{0:04X}: {1}")]
    DeviceStatus(u16, &'static str),

    #[error("device is locked or asleep, unlock it and open the Ethereum app")]
    DeviceLocked,

    #[error("Ethereum app is not open, open it and try again")]
    AppNotOpen,

    #[error("wrong app open on device (status 0x{0:04X}), open the Ethereum app")]
    WrongApp(u16),

    #[error("user rejected the request on device")]
    UserRejected,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid derivation path: {0}")]
    InvalidPath(String),
}

impl LedgerError {
    /// Map a non-success status word to the error the user can act on.
    pub fn from_status(code: u16) -> Self {
        use StatusWord as Sw;
        match Sw::from_code(code) {
            Some(Sw::DeviceLocked | Sw::SecurityStatusNotSatisfied) => Self::DeviceLocked,
            Some(Sw::AppNotOpen | Sw::AppNotOpenLegacy) => Self::AppNotOpen,
            Some(Sw::ConditionsOfUseNotSatisfied) => Self::UserRejected,
            Some(Sw::InsNotSupported | Sw::ClaNotSupported) => Self::WrongApp(code),
            Some(Sw::InvalidData) => Self::DeviceStatus(code, "invalid data"),
            Some(Sw::IncorrectParameters) => Self::DeviceStatus(code, "incorrect parameters"),
            Some(Sw::Ok) | None => Self::DeviceStatus(code, "unknown"),
        }
    }
}

/// Transport-level errors (USB, TCP, IO).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no Ledger device found, is it plugged in?")]
    DeviceNotFound,

    #[error("communication error: {0}")]
    Comm(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end the assemble-and-sign workflow.
///
/// [`Error::Cancelled`] and [`Error::Declined`] are clean exits; see
/// [`Error::is_cancellation`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("operation cancelled")]
    Cancelled,

    #[error("the request was cancelled by the user on the device")]
    Declined,

    #[error("address mismatch: expected {expected:?}, device reports {actual:?}")]
    AddressMismatch { expected: Address, actual: Address },

    #[error("signature recovers to {recovered:?}, expected {expected:?}")]
    SignatureMismatch {
        expected: Address,
        recovered: Address,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),

    #[error("invalid signature: {0}")]
    Signature(#[from] SignatureError),
}

impl Error {
    /// User-initiated aborts, which exit with status 0.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_success_ok() {
        assert!(StatusWord::is_success(0x9000));
    }

    #[test]
    fn is_success_rejects_other_codes() {
        assert!(!StatusWord::is_success(0x5515));
        assert!(!StatusWord::is_success(0x6985));
        assert!(!StatusWord::is_success(0x0000));
    }

    #[test]
    fn from_code_round_trips() {
        for sw in StatusWord::ALL {
            assert_eq!(StatusWord::from_code(sw as u16), Some(sw));
        }
        assert_eq!(StatusWord::from_code(0x1234), None);
    }

    #[test]
    fn from_status_mapping() {
        let cases: [(u16, fn(&LedgerError) -> bool); 9] = [
            (0x5515, |e| matches!(e, LedgerError::DeviceLocked)),
            (0x6982, |e| matches!(e, LedgerError::DeviceLocked)),
            (0x6511, |e| matches!(e, LedgerError::AppNotOpen)),
            (0x6E01, |e| matches!(e, LedgerError::AppNotOpen)),
            (0x6985, |e| matches!(e, LedgerError::UserRejected)),
            (0x6D00, |e| matches!(e, LedgerError::WrongApp(0x6D00))),
            (0x6E00, |e| matches!(e, LedgerError::WrongApp(0x6E00))),
            (0x6A80, |e| matches!(e, LedgerError::DeviceStatus(0x6A80, "invalid data"))),
            (0xFFFF, |e| matches!(e, LedgerError::DeviceStatus(0xFFFF, "unknown"))),
        ];
        for (code, check) in cases {
            let err = LedgerError::from_status(code);
            assert!(check(&err), "0x{code:04X} mapped to {err:?}");
        }
    }

    #[test]
    fn cancellation_variants() {
        assert!(Error::Cancelled.is_cancellation());
        assert!(Error::Declined.is_cancellation());
        assert!(!Error::Ledger(LedgerError::AppNotOpen).is_cancellation());
        assert!(!Error::AddressMismatch {
            expected: Address::zero(),
            actual: Address::repeat_byte(1),
        }
        .is_cancellation());
    }
}
