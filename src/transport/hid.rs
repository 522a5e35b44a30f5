use std::sync::Mutex;

use crate::apdu::{ApduAnswer, ApduCommand};
use crate::error::TransportError;
use crate::transport::Transport;

const LEDGER_VID: u16 = 0x2c97;
const LEDGER_USAGE_PAGE: u16 = 0xFFA0;
const LEDGER_CHANNEL: u16 = 0x0101;
const LEDGER_TAG: u8 = 0x05;
const LEDGER_PACKET_WRITE_SIZE: usize = 65;
const LEDGER_PACKET_READ_SIZE: usize = 64;
/// Report id byte + channel (2) + tag + sequence (2).
const CHUNK_SIZE: usize = LEDGER_PACKET_WRITE_SIZE - 6;

/// Detected from the upper byte of the USB product ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    NanoS,
    NanoSPlus,
    NanoX,
    Flex,
    Stax,
    Unknown(u16),
}

impl DeviceType {
    /// `0x10` = Nano S, `0x40` = Nano X, `0x50` = Nano S+,
    /// `0x60` = Stax, `0x70` = Flex.
    pub fn from_product_id(pid: u16) -> Self {
        match pid >> 8 {
            0x10 => Self::NanoS,
            0x40 => Self::NanoX,
            0x50 => Self::NanoSPlus,
            0x60 => Self::Stax,
            0x70 => Self::Flex,
            _ => Self::Unknown(pid),
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NanoS => write!(f, "Nano S"),
            Self::NanoSPlus => write!(f, "Nano S+"),
            Self::NanoX => write!(f, "Nano X"),
            Self::Flex => write!(f, "Flex"),
            Self::Stax => write!(f, "Stax"),
            Self::Unknown(pid) => write!(f, "Unknown (0x{pid:04X})"),
        }
    }
}

/// Split a serialized APDU into HID output reports.
///
/// Payload is `[len: u16 BE][apdu]`; each report is
/// `[0x00][channel: u16 BE][tag][seq: u16 BE][up to 59 bytes, zero padded]`.
pub(crate) fn frame_apdu(apdu: &[u8]) -> Vec<[u8; LEDGER_PACKET_WRITE_SIZE]> {
    let mut payload = Vec::with_capacity(2 + apdu.len());
    payload.extend_from_slice(&(apdu.len() as u16).to_be_bytes());
    payload.extend_from_slice(apdu);

    payload
        .chunks(CHUNK_SIZE)
        .enumerate()
        .map(|(seq_idx, chunk)| {
            let mut report = [0u8; LEDGER_PACKET_WRITE_SIZE];
            report[1..3].copy_from_slice(&LEDGER_CHANNEL.to_be_bytes());
            report[3] = LEDGER_TAG;
            report[4..6].copy_from_slice(&(seq_idx as u16).to_be_bytes());
            report[6..6 + chunk.len()].copy_from_slice(chunk);
            report
        })
        .collect()
}

/// Reassembles a response from HID input reports (no report id byte).
#[derive(Debug, Default)]
pub(crate) struct Reassembler {
    expected_len: Option<usize>,
    seq_idx: u16,
    data: Vec<u8>,
}

impl Reassembler {
    /// Feed one report. Returns the full response once all bytes arrived.
    pub(crate) fn push(&mut self, packet: &[u8]) -> Result<Option<Vec<u8>>, TransportError> {
        if packet.len() < 5 {
            return Err(TransportError::Comm(format!(
                "HID short read: got {} bytes",
                packet.len()
            )));
        }

        let channel = u16::from_be_bytes([packet[0], packet[1]]);
        if channel != LEDGER_CHANNEL {
            return Err(TransportError::Comm("HID channel mismatch".into()));
        }
        if packet[2] != LEDGER_TAG {
            return Err(TransportError::Comm("HID tag mismatch".into()));
        }

        let pkt_seq = u16::from_be_bytes([packet[3], packet[4]]);
        if pkt_seq != self.seq_idx {
            return Err(TransportError::Comm(format!(
                "sequence mismatch: expected {}, got {pkt_seq}",
                self.seq_idx
            )));
        }

        let (expected_len, body) = match self.expected_len {
            Some(len) => (len, &packet[5..]),
            None => {
                // First packet has a 2-byte length prefix before the data
                if packet.len() < 7 {
                    return Err(TransportError::Comm(
                        "HID short read: missing length prefix".into(),
                    ));
                }
                let len = u16::from_be_bytes([packet[5], packet[6]]) as usize;
                self.expected_len = Some(len);
                (len, &packet[7..])
            }
        };

        let take = (expected_len - self.data.len()).min(body.len());
        self.data.extend_from_slice(&body[..take]);
        self.seq_idx = self.seq_idx.wrapping_add(1);

        if self.data.len() >= expected_len {
            return Ok(Some(std::mem::take(&mut self.data)));
        }
        Ok(None)
    }
}

pub struct HidTransport {
    device: Mutex<hidapi::HidDevice>,
}

impl HidTransport {
    /// Opens the first Ledger interface found on the bus.
    pub fn new() -> Result<Self, TransportError> {
        let api = hidapi::HidApi::new().map_err(|e| TransportError::Comm(e.to_string()))?;

        let info = api
            .device_list()
            .find(|info| info.vendor_id() == LEDGER_VID && info.usage_page() == LEDGER_USAGE_PAGE)
            .ok_or(TransportError::DeviceNotFound)?;

        let device_type = DeviceType::from_product_id(info.product_id());
        let device = info
            .open_device(&api)
            .map_err(|e| TransportError::Comm(e.to_string()))?;
        log::debug!("opened Ledger {device_type} over HID");

        Ok(Self {
            device: Mutex::new(device),
        })
    }
}

impl Transport for HidTransport {
    fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, TransportError> {
        let device = self
            .device
            .lock()
            .map_err(|e| TransportError::Comm(format!("mutex poisoned: {e}")))?;

        for report in frame_apdu(&command.encode()?) {
            device
                .write(&report)
                .map_err(|e| TransportError::Comm(e.to_string()))?;
        }

        let mut buffer = [0u8; LEDGER_PACKET_READ_SIZE];
        let mut reassembler = Reassembler::default();
        loop {
            // Blocking read: the device may wait on the user indefinitely.
            let n = device
                .read(&mut buffer)
                .map_err(|e| TransportError::Comm(e.to_string()))?;
            if let Some(response) = reassembler.push(&buffer[..n])? {
                return ApduAnswer::from_raw(response);
            }
        }
    }
}
