//! Speculos simulator transport.
//!
//! Requests go out as `[len: u32 BE][APDU]`. Replies come back as
//! `[len: u32 BE][payload][SW1 SW2]`, the status word sitting outside the
//! length that prefixes it.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Mutex;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::apdu::{ApduAnswer, ApduCommand};
use crate::error::TransportError;
use crate::transport::Transport;

/// Replies from the Ethereum app are a few hundred bytes at most.
const MAX_REPLY_LEN: u32 = 0x1_0000;

pub struct TcpTransport {
    addr: String,
    stream: Mutex<TcpStream>,
}

impl TcpTransport {
    /// Connect to Speculos' APDU port (9999 by default).
    pub fn new(host: &str, port: u16) -> Result<Self, TransportError> {
        let addr = format!("{host}:{port}");
        let stream = TcpStream::connect(&addr)
            .map_err(|e| TransportError::ConnectionFailed(format!("{addr}: {e}")))?;
        stream.set_nodelay(true)?;
        // no read timeout: signing waits for the simulated user
        stream.set_read_timeout(None)?;
        log::debug!("connected to Speculos at {addr}");
        Ok(Self {
            addr,
            stream: Mutex::new(stream),
        })
    }
}

fn write_request<W: Write>(w: &mut W, apdu: &[u8]) -> Result<(), TransportError> {
    w.write_u32::<BigEndian>(apdu.len() as u32)?;
    w.write_all(apdu)?;
    w.flush()?;
    Ok(())
}

fn read_reply<R: Read>(r: &mut R) -> Result<Vec<u8>, TransportError> {
    let len = r.read_u32::<BigEndian>()?;
    if len > MAX_REPLY_LEN {
        return Err(TransportError::Comm(format!(
            "reply too large: {len} bytes (max {MAX_REPLY_LEN})"
        )));
    }
    let mut reply = vec![0u8; len as usize + 2];
    r.read_exact(&mut reply)?;
    Ok(reply)
}

impl Transport for TcpTransport {
    fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, TransportError> {
        let apdu = command.encode()?;
        let mut stream = self
            .stream
            .lock()
            .map_err(|e| TransportError::Comm(format!("mutex poisoned: {e}")))?;

        log::trace!("{} <= {}", self.addr, hex::encode(&apdu));
        write_request(&mut *stream, &apdu)?;
        let reply = read_reply(&mut *stream)?;
        log::trace!("{} => {}", self.addr, hex::encode(&reply));
        ApduAnswer::from_raw(reply)
    }
}
