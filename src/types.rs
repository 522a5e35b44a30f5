//! Core types: derivation path templates and paths, app configuration,
//! raw device signature.

use std::str::FromStr;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::LedgerError;

const HARDENED: u32 = 0x8000_0000;
/// The Ethereum app refuses deeper paths.
const MAX_DEPTH: usize = 10;
const PLACEHOLDER: char = 'i';

pub const DEFAULT_TEMPLATE: &str = "44'/60'/i'/0/0";

/// A derivation path with at most one `i` placeholder for the account index,
/// e.g. `44'/60'/i'/0/0` (Ledger Live) or `44'/60'/0'/0/i` (legacy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate(String);

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, LedgerError> {
        let template = template.trim();
        if template.is_empty() {
            return Err(LedgerError::InvalidPath("path is required".into()));
        }
        if template.matches(PLACEHOLDER).count() > 1 {
            return Err(LedgerError::InvalidPath(
                "only one `i` placeholder is allowed".into(),
            ));
        }
        let parsed = Self(template.to_string());
        parsed.resolve(0)?;
        Ok(parsed)
    }

    pub fn has_placeholder(&self) -> bool {
        self.0.contains(PLACEHOLDER)
    }

    /// Substitute `index` for the placeholder and parse the result.
    pub fn resolve(&self, index: u32) -> Result<DerivationPath, LedgerError> {
        self.0
            .replacen(PLACEHOLDER, &index.to_string(), 1)
            .parse()
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self(DEFAULT_TEMPLATE.to_string())
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// BIP32 derivation path, hardened and non-hardened components mixed
/// (`m/44'/60'/0'/0/0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    pub fn new(components: Vec<u32>) -> Result<Self, LedgerError> {
        if components.is_empty() || components.len() > MAX_DEPTH {
            return Err(LedgerError::InvalidPath(format!(
                "path must have between 1 and {MAX_DEPTH} components"
            )));
        }
        Ok(Self(components))
    }

    /// Wire format: `[n: u8][path[0]: u32 BE]...[path[n-1]: u32 BE]`
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.0.len() * 4);
        buf.push(self.0.len() as u8);
        for &component in &self.0 {
            // Writing into a Vec cannot fail.
            let _ = buf.write_u32::<BigEndian>(component);
        }
        buf
    }
}

impl FromStr for DerivationPath {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix("m/").unwrap_or(s);

        let components = s
            .split('/')
            .enumerate()
            .map(|(i, part)| parse_component(part).map_err(|msg| {
                LedgerError::InvalidPath(format!("component {i} (`{part}`): {msg}"))
            }))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(components)
    }
}

fn parse_component(part: &str) -> Result<u32, &'static str> {
    let (digits, hardened) = match part.strip_suffix(['\'', 'h', 'H']) {
        Some(digits) => (digits, true),
        None => (part, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected a number");
    }
    let value: u32 = digits.parse().map_err(|_| "number too large")?;
    if value >= HARDENED {
        return Err("number must be below 2^31");
    }
    Ok(if hardened { value | HARDENED } else { value })
}

impl std::fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m")?;
        for &c in &self.0 {
            let val = c & !HARDENED;
            let h = if c & HARDENED != 0 { "'" } else { "" };
            write!(f, "/{val}{h}")?;
        }
        Ok(())
    }
}

/// Reply to `GET_APP_CONFIGURATION`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfiguration {
    pub flags: u8,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl std::fmt::Display for AppConfiguration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ethereum v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Raw `(v, r, s)` as returned by `SIGN_ETH_TRANSACTION`.
///
/// `v` is a single byte; see [`crate::tx::normalize_v`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSignature {
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

impl std::fmt::Display for DeviceSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "v=0x{:02x} r=0x{} s=0x{}",
            self.v,
            hex::encode(self.r),
            hex::encode(self.s)
        )
    }
}
