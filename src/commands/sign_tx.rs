use crate::apdu::{
    ApduCommand, Instruction, MAX_DATA_LEN, P1_FIRST_CHUNK, P1_MORE_CHUNKS,
};
use crate::commands::send;
use crate::error::LedgerError;
use crate::transport::Transport;
use crate::types::{DerivationPath, DeviceSignature};

/// Sends the raw transaction (EIP-2718 envelope, type byte included) in
/// 255-byte APDUs; the first one is prefixed with the derivation path.
///
/// No ERC-20 or plugin resolution APDUs are sent beforehand, so the device
/// never needs external metadata. Returns `[v][r (32)][s (32)]` from the
/// last chunk's reply. Blocks until the user approves or rejects.
pub fn exec(
    transport: &dyn Transport,
    path: &DerivationPath,
    tx: &[u8],
) -> Result<DeviceSignature, LedgerError> {
    let mut reply = Vec::new();
    for cmd in build_chunks(path, tx) {
        reply = send(transport, &cmd)?;
    }
    parse_signature(&reply)
}

pub(crate) fn build_chunks(path: &DerivationPath, tx: &[u8]) -> Vec<ApduCommand> {
    let mut first = path.serialize();
    let first_take = tx.len().min(MAX_DATA_LEN - first.len());
    first.extend_from_slice(&tx[..first_take]);

    let mut chunks = vec![ApduCommand::with_data(
        Instruction::SignTransaction,
        P1_FIRST_CHUNK,
        0x00,
        first,
    )];
    chunks.extend(tx[first_take..].chunks(MAX_DATA_LEN).map(|chunk| {
        ApduCommand::with_data(
            Instruction::SignTransaction,
            P1_MORE_CHUNKS,
            0x00,
            chunk.to_vec(),
        )
    }));
    chunks
}

pub(crate) fn parse_signature(data: &[u8]) -> Result<DeviceSignature, LedgerError> {
    if data.len() < 65 {
        return Err(LedgerError::InvalidResponse(format!(
            "expected 65-byte signature, got {} bytes",
            data.len()
        )));
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&data[1..33]);
    s.copy_from_slice(&data[33..65]);
    Ok(DeviceSignature { v: data[0], r, s })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::{ok, MockTransport};

    fn path() -> DerivationPath {
        "44'/60'/0'/0/0".parse().unwrap()
    }

    #[test]
    fn parse_valid_signature() {
        let mut data = vec![0x01];
        data.extend_from_slice(&[0xAA; 32]);
        data.extend_from_slice(&[0xBB; 32]);
        let sig = parse_signature(&data).unwrap();
        assert_eq!(sig.v, 1);
        assert_eq!(sig.r, [0xAA; 32]);
        assert_eq!(sig.s, [0xBB; 32]);
    }

    #[test]
    fn parse_too_short_signature() {
        let err = parse_signature(&[0x00; 64]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse(_)));
        assert!(parse_signature(&[]).is_err());
    }

    #[test]
    fn small_payload_fits_in_first_chunk() {
        let tx = vec![0x02, 0xEF, 0x01];
        let chunks = build_chunks(&path(), &tx);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].p1, P1_FIRST_CHUNK);
        assert_eq!(&chunks[0].data[..21], path().serialize().as_slice());
        assert_eq!(&chunks[0].data[21..], tx.as_slice());
    }

    #[test]
    fn large_payload_is_split() {
        // 234 bytes fit next to the 21-byte path, then 255 + 11
        let tx: Vec<u8> = (0..500u32).map(|i| i as u8).collect();
        let chunks = build_chunks(&path(), &tx);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].data.len(), 255);
        assert_eq!(chunks[1].p1, P1_MORE_CHUNKS);
        assert_eq!(chunks[1].data.len(), 255);
        assert_eq!(chunks[2].data.len(), 11);

        let rebuilt: Vec<u8> = chunks[0].data[21..]
            .iter()
            .chain(&chunks[1].data)
            .chain(&chunks[2].data)
            .copied()
            .collect();
        assert_eq!(rebuilt, tx);
    }

    #[test]
    fn exec_returns_signature_from_last_reply() {
        let mut sig = vec![0x00];
        sig.extend_from_slice(&[0x11; 64]);
        let transport = MockTransport::new(vec![ok(vec![]), ok(sig)]);
        let tx = vec![0x55; 300];

        let out = exec(&transport, &path(), &tx).unwrap();
        assert_eq!(out.v, 0);
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn exec_maps_user_rejection() {
        let transport = MockTransport::new(vec![vec![0x69, 0x85]]);
        let err = exec(&transport, &path(), &[0x02, 0xC0]).unwrap_err();
        assert!(matches!(err, LedgerError::UserRejected));
    }
}
