use crate::apdu::{ApduCommand, Instruction};
use crate::commands::send;
use crate::error::LedgerError;
use crate::transport::Transport;
use crate::types::AppConfiguration;

/// Response: `[flags][major][minor][patch]`
pub fn exec(transport: &dyn Transport) -> Result<AppConfiguration, LedgerError> {
    let data = send(transport, &ApduCommand::new(Instruction::GetConfiguration))?;
    parse_configuration_response(&data)
}

pub(crate) fn parse_configuration_response(data: &[u8]) -> Result<AppConfiguration, LedgerError> {
    if data.len() < 4 {
        return Err(LedgerError::InvalidResponse(
            "configuration response too short - is the Ethereum app running?".into(),
        ));
    }

    Ok(AppConfiguration {
        flags: data[0],
        major: data[1],
        minor: data[2],
        patch: data[3],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::mock::{ok, MockTransport};

    #[test]
    fn parse_valid_configuration() {
        let cfg = parse_configuration_response(&[0x0F, 1, 10, 3]).unwrap();
        assert_eq!(cfg.flags, 0x0F);
        assert_eq!((cfg.major, cfg.minor, cfg.patch), (1, 10, 3));
        assert_eq!(cfg.to_string(), "Ethereum v1.10.3");
    }

    #[test]
    fn parse_too_short_response() {
        for len in 0..4 {
            let err = parse_configuration_response(&vec![0x01; len]).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidResponse(_)));
        }
    }

    #[test]
    fn dashboard_status_maps_to_app_not_open() {
        let transport = MockTransport::new(vec![vec![0x65, 0x11]]);
        let err = exec(&transport).unwrap_err();
        assert!(matches!(err, LedgerError::AppNotOpen));
        assert_eq!(transport.sent(), vec![vec![0xE0, 0x06, 0x00, 0x00, 0x00]]);
    }

    #[test]
    fn exec_reads_configuration() {
        let transport = MockTransport::new(vec![ok(vec![0x00, 1, 9, 17])]);
        let cfg = exec(&transport).unwrap();
        assert_eq!((cfg.major, cfg.minor, cfg.patch), (1, 9, 17));
    }
}
