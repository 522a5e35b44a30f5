//! Integration tests. Requires a running Speculos instance with the Ethereum app:
//!
//! ```sh
//! speculos --model nanosp /path/to/app-ethereum.elf
//! ```
//!
//! Then: `cargo test --features tcp -- --ignored`

#![cfg(feature = "tcp")]

use ethers_core::types::{Address, U256};

use ledger_offline_sign::tx::{signature_from_device, Payload, TxType};
use ledger_offline_sign::{DerivationPath, LedgerEth, TransportType, UnsignedTransaction};

fn connect() -> LedgerEth {
    let host = std::env::var("LEDGER_TCP_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let transport = TransportType::TCP(host, 9999);
    LedgerEth::new(&transport).expect("failed to connect to Speculos, is it running?")
}

fn path(index: u32) -> DerivationPath {
    format!("44'/60'/{index}'/0/0").parse().unwrap()
}

#[test]
#[ignore = "requires Speculos"]
fn get_configuration() {
    let ledger = connect();
    let config = ledger.get_configuration().unwrap();
    assert!((config.major, config.minor) >= (1, 9));
}

#[test]
#[ignore = "requires Speculos"]
fn get_address_default_path() {
    let ledger = connect();
    let address = ledger.get_address(&path(0)).unwrap();
    assert_ne!(address, Address::zero());
    // same path, same address
    assert_eq!(ledger.get_address(&path(0)).unwrap(), address);
}

#[test]
#[ignore = "requires Speculos"]
fn different_indexes_differ() {
    let ledger = connect();
    let a = ledger.get_address(&path(0)).unwrap();
    let b = ledger.get_address(&path(1)).unwrap();
    assert_ne!(a, b);
}

#[test]
#[ignore = "requires Speculos and approving the transaction in its UI"]
fn sign_native_transfer() {
    let ledger = connect();
    let path = path(0);
    let signer = ledger.get_address(&path).unwrap();

    let tx = UnsignedTransaction {
        chain_id: 1,
        tx_type: TxType::Eip1559,
        nonce: U256::zero(),
        max_priority_fee_per_gas: U256::from(100_000_000u64),
        max_fee_per_gas: U256::from(1_100_000_000u64),
        gas_limit: U256::from(21_000u64),
        payload: Payload::Native {
            to: Address::from_low_u64_be(1),
            value: U256::exp10(15),
        },
    };
    let raw = ledger.sign_transaction(&path, &tx.encode()).unwrap();
    let signed = tx.clone().with_signature(signature_from_device(&raw, tx.chain_id));
    assert_eq!(signed.recover_signer().unwrap(), signer);
}
