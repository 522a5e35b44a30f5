//! Collects the transaction, one validated step at a time.

use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::to_checksum;

use crate::chains::{self, CHAINS};
use crate::error::Error;
use crate::prompt::{ask, choose, choose_or_custom, Prompter, SelectStep, TextStep};
use crate::session::{Backoff, Connect, RetryingConnector, Sleep};
use crate::tx::{self, Payload, TxType, UnsignedTransaction};
use crate::types::{DerivationPath, DEFAULT_TEMPLATE};
use crate::validate;

pub const DEFAULT_PRIORITY_FEE: &str = "100000000";
pub const DEFAULT_BASE_FEE: &str = "1000000000";
pub const DEFAULT_NATIVE_GAS_LIMIT: &str = "21000";
pub const DEFAULT_TOKEN_GAS_LIMIT: &str = "120000";

const ADDRESS_PLACEHOLDER: &str = "e.g., 0x0000000000000000000000000000000000000000";

/// Output of [`assemble`].
#[derive(Debug, Clone)]
pub struct Assembled {
    pub path: DerivationPath,
    /// Address shown to the user; signing must happen with the same one.
    pub address: Address,
    pub tx: UnsignedTransaction,
    pub unsigned: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CalldataChoice {
    Native,
    Erc20,
    Raw(Bytes),
}

pub fn assemble<P, C, B, S>(
    prompter: &mut P,
    connector: &RetryingConnector<C, B, S>,
) -> Result<Assembled, Error>
where
    P: Prompter + ?Sized,
    C: Connect,
    B: Backoff,
    S: Sleep,
{
    let path = ask_path(prompter)?;

    prompter.waiting("Connect your Ledger and open the Ethereum app");
    let address = connector.connect(&path).address();
    prompter.done_waiting("Connected to Ledger");
    prompter.note(
        "Account",
        &format!("Your account has been found: {}", to_checksum(&address, None)),
    );

    let tx = ask_transaction(prompter)?;
    let unsigned = tx.encode();
    log::debug!("assembled {} byte unsigned transaction", unsigned.len());

    Ok(Assembled {
        path,
        address,
        tx,
        unsigned,
    })
}

fn ask_path<P: Prompter + ?Sized>(prompter: &mut P) -> Result<DerivationPath, Error> {
    let template = ask(
        prompter,
        &TextStep::new("Enter the derivation path format", validate::path_template)
            .placeholder(format!("e.g., {DEFAULT_TEMPLATE}"))
            .default(DEFAULT_TEMPLATE),
    )?;
    if !template.has_placeholder() {
        log::warn!("derivation path {template} has no `i` placeholder, the index is ignored");
    }

    let index_step = TextStep::new("Enter an index for the derivation path", move |raw| {
        let index = validate::path_index(raw)?;
        template.resolve(index).map_err(|e| e.to_string())
    })
    .placeholder("e.g., 0")
    .default("0");
    ask(prompter, &index_step)
}

/// Steps 3 to 9: everything after the device has told us the address.
pub fn ask_transaction<P: Prompter + ?Sized>(prompter: &mut P) -> Result<UnsignedTransaction, Error> {
    let chain_id = ask_chain_id(prompter)?;

    let tx_type = choose(
        prompter,
        &SelectStep::new(
            "Select the transaction type (EIP-1559 only, for now)",
            vec![(TxType::Eip1559.label().to_string(), TxType::Eip1559)],
        ),
    )?;

    let nonce = ask(
        prompter,
        &TextStep::new("Enter the nonce", validate::non_negative)
            .placeholder("e.g., 0")
            .default("0"),
    )?;

    let payload = ask_payload(prompter, chain_id)?;

    let max_priority_fee_per_gas = ask(
        prompter,
        &TextStep::new("Enter the max priority fee per gas", validate::non_negative)
            .placeholder("e.g., 100000000 (0.1 gwei)")
            .default(DEFAULT_PRIORITY_FEE),
    )?;

    // The base fee only exists to compute the fee cap.
    let max_fee_per_gas = ask(
        prompter,
        &TextStep::new("Enter the base fee per gas", move |raw| {
            let base_fee = validate::non_negative(raw)?;
            tx::max_fee_per_gas(max_priority_fee_per_gas, base_fee)
                .ok_or_else(|| "Priority fee plus base fee overflows 256 bits".to_string())
        })
        .placeholder("e.g., 1000000000 (1 gwei)")
        .default(DEFAULT_BASE_FEE),
    )?;

    let default_gas_limit = if payload.is_token_transfer() {
        DEFAULT_TOKEN_GAS_LIMIT
    } else {
        DEFAULT_NATIVE_GAS_LIMIT
    };
    let gas_limit = ask(
        prompter,
        &TextStep::new("Enter the gas limit", validate::positive)
            .placeholder(format!("e.g., {default_gas_limit}"))
            .default(default_gas_limit),
    )?;

    Ok(UnsignedTransaction {
        chain_id,
        tx_type,
        nonce,
        max_priority_fee_per_gas,
        max_fee_per_gas,
        gas_limit,
        payload,
    })
}

fn ask_chain_id<P: Prompter + ?Sized>(prompter: &mut P) -> Result<u64, Error> {
    let mut options: Vec<(String, Option<u64>)> =
        CHAINS.iter().map(|c| (c.label(), Some(c.id))).collect();
    options.push(("Custom".into(), None));

    choose_or_custom(
        prompter,
        &SelectStep::new("Select the chain id", options),
        &TextStep::new(
            "Enter the custom chain id (see chainlist.org)",
            validate::chain_id,
        )
        .default("1"),
    )
}

fn ask_payload<P: Prompter + ?Sized>(prompter: &mut P, chain_id: u64) -> Result<Payload, Error> {
    let choice = choose_or_custom(
        prompter,
        &SelectStep::new(
            "Select the calldata type",
            vec![
                ("Native transfer".into(), Some(CalldataChoice::Native)),
                ("ERC20 transfer".into(), Some(CalldataChoice::Erc20)),
                ("Empty calldata".into(), Some(CalldataChoice::Raw(Bytes::default()))),
                ("Custom".into(), None),
            ],
        ),
        &TextStep::new("Enter the custom calldata (or leave 0x to skip)", |raw| {
            validate::calldata(raw).map(CalldataChoice::Raw)
        })
        .placeholder("e.g., 0x12dd34ff")
        .default("0x"),
    )?;

    if choice == CalldataChoice::Erc20 {
        return ask_token_transfer(prompter, chain_id);
    }

    let to = ask(prompter, &recipient_step())?;
    let value = ask(
        prompter,
        &TextStep::new("Enter the value", validate::amount_or_zero)
            .placeholder("e.g., 1000000000000000000 (1 ether)"),
    )?;

    Ok(match choice {
        CalldataChoice::Raw(data) => Payload::RawCustom { to, value, data },
        _ => Payload::Native { to, value },
    })
}

fn ask_token_transfer<P: Prompter + ?Sized>(prompter: &mut P, chain_id: u64) -> Result<Payload, Error> {
    let mut options: Vec<(String, Option<Address>)> = chains::tokens(chain_id)
        .iter()
        .map(|t| (t.label(), Some(t.address())))
        .collect();
    options.push(("Custom".into(), None));

    let token = choose_or_custom(
        prompter,
        &SelectStep::new("Select the ERC20 token", options),
        &TextStep::new("Enter the token address", validate::address).placeholder(ADDRESS_PLACEHOLDER),
    )?;
    let recipient = ask(prompter, &recipient_step())?;
    let amount: U256 = ask(
        prompter,
        &TextStep::new("Enter the ERC20 transfer amount", validate::amount_or_zero)
            .placeholder("e.g., 1000000000000000000 (1 token with 18 decimals)"),
    )?;

    Ok(Payload::Erc20Transfer {
        token,
        recipient,
        amount,
    })
}

fn recipient_step() -> TextStep<Address> {
    TextStep::new("Enter the receiver address", validate::address).placeholder(ADDRESS_PLACEHOLDER)
}
