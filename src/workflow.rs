//! The whole run: assemble, review, confirm, sign.

use crate::assembler::{assemble, Assembled};
use crate::display::{display_transaction, display_unsigned};
use crate::error::Error;
use crate::prompt::{confirm, Prompter};
use crate::session::{Backoff, Connect, RetryingConnector, Sleep};
use crate::signer::Signer;
use crate::tx::SignedTransaction;

pub const CONFIRM_MESSAGE: &str = "Do you want to sign the transaction?";

pub fn run<P, C, B, S>(
    prompter: &mut P,
    connector: &RetryingConnector<C, B, S>,
) -> Result<SignedTransaction, Error>
where
    P: Prompter + ?Sized,
    C: Connect,
    B: Backoff,
    S: Sleep,
{
    let Assembled {
        path,
        address,
        tx,
        unsigned,
    } = assemble(prompter, connector)?;

    prompter.note("Transaction", &display_transaction(&tx, address));
    prompter.note("Unsigned transaction", &display_unsigned(&unsigned));
    confirm(prompter, CONFIRM_MESSAGE)?;

    prompter.waiting("Review and approve the transaction on your Ledger");
    let result = Signer::new(connector).sign(&path, &tx, Some(address));
    prompter.done_waiting(match &result {
        Ok(_) => "Transaction signed",
        Err(Error::Declined) => "Transaction rejected on device",
        Err(_) => "Signing failed",
    });
    result
}
