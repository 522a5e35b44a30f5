//! Device sessions and the retrying connector.
//!
//! [`RetryingConnector::connect`] never gives up: the user may still be
//! plugging the device in, unlocking it or opening the Ethereum app. Between
//! attempts it sleeps for whatever the [`Backoff`] policy says, through an
//! injectable [`Sleep`] so tests run without real delays.

use std::time::Duration;

use ethers_core::types::Address;

use crate::api::{EthDevice, LedgerEth};
use crate::error::LedgerError;
use crate::transport::TransportType;
use crate::types::DerivationPath;

pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Opens a fresh device handle. One call, one transport.
pub trait Connect {
    type Device: EthDevice;

    fn connect(&self) -> Result<Self::Device, LedgerError>;
}

/// Opens [`LedgerEth`] over a real transport.
#[derive(Debug, Clone)]
pub struct LedgerConnector {
    transport_type: TransportType,
}

impl LedgerConnector {
    pub fn new(transport_type: TransportType) -> Self {
        Self { transport_type }
    }
}

impl Connect for LedgerConnector {
    type Device = LedgerEth;

    fn connect(&self) -> Result<LedgerEth, LedgerError> {
        LedgerEth::new(&self.transport_type)
    }
}

/// Delay before the next attempt; `attempt` counts failures so far, from 1.
pub trait Backoff {
    fn delay(&self, attempt: u32) -> Duration;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff(pub Duration);

impl Default for FixedBackoff {
    fn default() -> Self {
        Self(DEFAULT_RETRY_INTERVAL)
    }
}

impl Backoff for FixedBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

pub trait Sleep {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// One live connection plus the address resolved at `path`.
pub struct DeviceSession<D> {
    device: D,
    path: DerivationPath,
    address: Address,
}

impl<D: EthDevice> DeviceSession<D> {
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

pub struct RetryingConnector<C, B = FixedBackoff, S = ThreadSleep> {
    connector: C,
    backoff: B,
    sleeper: S,
}

impl<C: Connect> RetryingConnector<C> {
    /// Fixed one-second backoff with real sleeps.
    pub fn new(connector: C) -> Self {
        Self::with_policy(connector, FixedBackoff::default(), ThreadSleep)
    }
}

impl<C: Connect, B: Backoff, S: Sleep> RetryingConnector<C, B, S> {
    pub fn with_policy(connector: C, backoff: B, sleeper: S) -> Self {
        Self {
            connector,
            backoff,
            sleeper,
        }
    }

    /// Connect, bind the app and resolve the address at `path`, retrying
    /// forever. Errors are logged and swallowed.
    pub fn connect(&self, path: &DerivationPath) -> DeviceSession<C::Device> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_connect(path) {
                Ok(session) => {
                    log::info!(
                        "connected after {} attempt(s), address {:?}",
                        attempt + 1,
                        session.address
                    );
                    return session;
                }
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    let delay = self.backoff.delay(attempt);
                    log::debug!("device not ready (attempt {attempt}): {e}; retrying in {delay:?}");
                    self.sleeper.sleep(delay);
                }
            }
        }
    }

    fn try_connect(&self, path: &DerivationPath) -> Result<DeviceSession<C::Device>, LedgerError> {
        let device = self.connector.connect()?;
        let address = device.address(path)?;
        Ok(DeviceSession {
            device,
            path: path.clone(),
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::types::DeviceSignature;
    use std::cell::{Cell, RefCell};

    struct FakeDevice {
        address: Result<Address, u16>,
    }

    impl EthDevice for FakeDevice {
        fn address(&self, _path: &DerivationPath) -> Result<Address, LedgerError> {
            self.address.map_err(LedgerError::from_status)
        }

        fn sign_transaction(
            &self,
            _path: &DerivationPath,
            _payload: &[u8],
        ) -> Result<DeviceSignature, LedgerError> {
            Err(LedgerError::UserRejected)
        }
    }

    /// Fails to open `absent` times, then opens a device whose app answers
    /// `locked` times with a locked status before returning the address.
    struct FlakyConnector {
        absent: Cell<u32>,
        locked: Cell<u32>,
        opened: Cell<u32>,
    }

    impl FlakyConnector {
        fn new(absent: u32, locked: u32) -> Self {
            Self {
                absent: Cell::new(absent),
                locked: Cell::new(locked),
                opened: Cell::new(0),
            }
        }
    }

    impl Connect for FlakyConnector {
        type Device = FakeDevice;

        fn connect(&self) -> Result<FakeDevice, LedgerError> {
            if self.absent.get() > 0 {
                self.absent.set(self.absent.get() - 1);
                return Err(TransportError::DeviceNotFound.into());
            }
            self.opened.set(self.opened.get() + 1);
            let address = if self.locked.get() > 0 {
                self.locked.set(self.locked.get() - 1);
                Err(0x5515)
            } else {
                Ok(Address::repeat_byte(0xAB))
            };
            Ok(FakeDevice { address })
        }
    }

    #[derive(Default)]
    struct RecordingSleep(RefCell<Vec<Duration>>);

    impl Sleep for &RecordingSleep {
        fn sleep(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    fn path() -> DerivationPath {
        "44'/60'/0'/0/0".parse().unwrap()
    }

    #[test]
    fn connects_first_time_without_sleeping() {
        let sleeps = RecordingSleep::default();
        let connector =
            RetryingConnector::with_policy(FlakyConnector::new(0, 0), FixedBackoff::default(), &sleeps);

        let session = connector.connect(&path());
        assert_eq!(session.address(), Address::repeat_byte(0xAB));
        assert_eq!(session.path(), &path());
        assert!(sleeps.0.borrow().is_empty());
    }

    #[test]
    fn retries_until_device_appears_and_unlocks() {
        let sleeps = RecordingSleep::default();
        let connector = RetryingConnector::with_policy(
            FlakyConnector::new(3, 2),
            FixedBackoff(Duration::from_millis(250)),
            &sleeps,
        );

        let session = connector.connect(&path());
        assert_eq!(session.address(), Address::repeat_byte(0xAB));
        assert_eq!(*sleeps.0.borrow(), vec![Duration::from_millis(250); 5]);
        // every retry after the device appeared opened a fresh handle
        assert_eq!(connector.connector.opened.get(), 3);
    }

    #[test]
    fn backoff_sees_attempt_numbers() {
        struct Linear;
        impl Backoff for Linear {
            fn delay(&self, attempt: u32) -> Duration {
                Duration::from_millis(u64::from(attempt) * 10)
            }
        }

        let sleeps = RecordingSleep::default();
        let connector = RetryingConnector::with_policy(FlakyConnector::new(3, 0), Linear, &sleeps);
        connector.connect(&path());
        assert_eq!(
            *sleeps.0.borrow(),
            vec![
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(30)
            ]
        );
    }

    #[test]
    fn repeated_connects_are_independent() {
        let sleeps = RecordingSleep::default();
        let connector =
            RetryingConnector::with_policy(FlakyConnector::new(0, 0), FixedBackoff::default(), &sleeps);
        let first = connector.connect(&path());
        drop(first);
        let second = connector.connect(&path());
        assert_eq!(second.address(), Address::repeat_byte(0xAB));
        assert_eq!(connector.connector.opened.get(), 2);
    }

    #[test]
    fn default_backoff_is_one_second() {
        assert_eq!(FixedBackoff::default().delay(7), Duration::from_secs(1));
    }
}
