//! Ways of reaching the device.
//!
//! - [`hid::HidTransport`]: USB HID, real hardware (feature `hid`, default)
//! - [`tcp::TcpTransport`]: the Speculos simulator (feature `tcp`)
//!
//! Neither waits with a timeout. Signing blocks until the user has reviewed
//! the transaction on the device.

#[cfg(feature = "hid")]
pub mod hid;
#[cfg(feature = "tcp")]
pub mod tcp;

use std::fmt;

use crate::apdu::{ApduAnswer, ApduCommand};
use crate::error::TransportError;

/// One request, one reply. Implementations serialise concurrent callers.
pub trait Transport: Send + Sync {
    fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportType {
    #[cfg(feature = "hid")]
    NativeHID,
    /// `(host, port)` of a Speculos instance.
    #[cfg(feature = "tcp")]
    TCP(String, u16),
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "hid")]
            Self::NativeHID => f.write_str("USB"),
            #[cfg(feature = "tcp")]
            Self::TCP(host, port) => write!(f, "Speculos at {host}:{port}"),
            #[allow(unreachable_patterns)]
            _ => f.write_str("no transport"),
        }
    }
}

/// Open a fresh connection. Nothing is cached between calls.
pub fn open(transport_type: &TransportType) -> Result<Box<dyn Transport>, TransportError> {
    log::debug!("opening {transport_type}");
    let transport: Box<dyn Transport> = match transport_type {
        #[cfg(feature = "hid")]
        TransportType::NativeHID => Box::new(hid::HidTransport::new()?),
        #[cfg(feature = "tcp")]
        TransportType::TCP(host, port) => Box::new(tcp::TcpTransport::new(host, *port)?),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(TransportError::Comm(
                "no transport enabled, build with the `hid` or `tcp` feature".into(),
            ))
        }
    };
    Ok(transport)
}
