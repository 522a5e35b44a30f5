//! APDU framing for the Ethereum app.
//!
//! Every command goes out as a short APDU under CLA `0xE0`; every reply ends
//! with a big-endian status word.

use byteorder::{BigEndian, ByteOrder};

use crate::error::TransportError;

pub const CLA: u8 = 0xE0;

/// Short APDU LC limit.
pub const MAX_DATA_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Instruction {
    GetAddress = 0x02,
    SignTransaction = 0x04,
    GetConfiguration = 0x06,
}

/// P1 for `SignTransaction`.
pub const P1_FIRST_CHUNK: u8 = 0x00;
pub const P1_MORE_CHUNKS: u8 = 0x80;

/// P1/P2 for `GetAddress`: return silently, no chain code.
pub const P1_NO_DISPLAY: u8 = 0x00;
pub const P2_NO_CHAINCODE: u8 = 0x00;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    pub ins: Instruction,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl ApduCommand {
    pub fn new(ins: Instruction) -> Self {
        Self::with_data(ins, 0x00, 0x00, Vec::new())
    }

    pub fn with_data(ins: Instruction, p1: u8, p2: u8, data: Vec<u8>) -> Self {
        Self { ins, p1, p2, data }
    }

    /// `[CLA][INS][P1][P2][LC][DATA]`. Longer payloads must be split by the
    /// caller first (see `commands::sign_tx`).
    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        let lc = u8::try_from(self.data.len()).map_err(|_| {
            TransportError::Comm(format!(
                "APDU data too long: {} bytes (max {MAX_DATA_LEN})",
                self.data.len()
            ))
        })?;
        let mut buf = Vec::with_capacity(5 + self.data.len());
        buf.extend_from_slice(&[CLA, self.ins as u8, self.p1, self.p2, lc]);
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }
}

/// A reply split into payload and status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduAnswer {
    data: Vec<u8>,
    status: u16,
}

impl ApduAnswer {
    /// Fails on replies too short to carry a status word.
    pub fn from_raw(mut raw: Vec<u8>) -> Result<Self, TransportError> {
        if raw.len() < 2 {
            return Err(TransportError::Comm(format!(
                "reply of {} byte(s) has no status word",
                raw.len()
            )));
        }
        let status = BigEndian::read_u16(&raw[raw.len() - 2..]);
        raw.truncate(raw.len() - 2);
        Ok(Self { data: raw, status })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
