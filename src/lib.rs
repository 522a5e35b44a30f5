//! Offline EIP-1559 transaction assembly and Ledger signing.
//!
//! Collects a transaction interactively, one validated field at a time,
//! shows it for review and has the Ledger Ethereum app sign it over USB HID
//! or TCP (Speculos simulator). Nothing is fetched from the network: nonce
//! and fees are whatever the user types.
//!
//! # Quick start
//!
//! ```no_run
//! # #[cfg(feature = "hid")] {
//! use ledger_offline_sign::session::{LedgerConnector, RetryingConnector};
//! use ledger_offline_sign::terminal::TerminalPrompter;
//! use ledger_offline_sign::{workflow, TransportType};
//!
//! let connector = RetryingConnector::new(LedgerConnector::new(TransportType::NativeHID));
//! let signed = workflow::run(&mut TerminalPrompter::new(), &connector)?;
//! println!("0x{}", hex::encode(signed.encode()));
//! # }
//! # Ok::<(), ledger_offline_sign::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`api`] -- [`LedgerEth`] facade and the [`EthDevice`] seam
//! - [`transport`] -- device communication (USB HID, TCP)
//! - [`session`] -- [`RetryingConnector`] and device sessions
//! - [`prompt`] -- question steps and the [`Prompter`] trait
//! - [`assembler`], [`signer`], [`workflow`] -- the signing flow
//! - [`tx`] -- EIP-1559 model and encoding
//! - [`validate`], [`chains`], [`display`], [`terminal`]
//!
//! # Feature flags
//!
//! - `hid` (default) -- USB HID transport for real Ledger devices
//! - `tcp` -- TCP transport for the Speculos simulator

pub(crate) mod apdu;
pub mod api;
pub mod assembler;
pub mod chains;
pub(crate) mod commands;
pub mod display;
pub mod error;
pub mod prompt;
pub mod session;
pub mod signer;
pub mod terminal;
pub mod transport;
pub mod tx;
pub mod types;
pub mod validate;
pub mod workflow;

pub use api::{EthDevice, LedgerEth};
pub use error::{Error, LedgerError, TransportError};
pub use prompt::Prompter;
pub use session::RetryingConnector;
pub use transport::TransportType;
pub use tx::{Payload, SignedTransaction, UnsignedTransaction};
pub use types::{DerivationPath, PathTemplate};
