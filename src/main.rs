use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use dialoguer::console::Term;

use ledger_offline_sign::display::display_signed;
use ledger_offline_sign::session::{FixedBackoff, LedgerConnector, RetryingConnector, ThreadSleep};
use ledger_offline_sign::terminal::TerminalPrompter;
use ledger_offline_sign::{workflow, Error, TransportType};

/// Assemble an EIP-1559 transaction offline and sign it on a Ledger device.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Talk to a Speculos simulator at HOST:PORT instead of a USB device.
    #[cfg(feature = "tcp")]
    #[arg(long, env = "LEDGER_SPECULOS", value_name = "HOST:PORT")]
    speculos: Option<String>,

    /// Delay between device connection attempts.
    #[arg(long, env = "LEDGER_RETRY_INTERVAL_MS", default_value_t = 1000)]
    retry_interval_ms: u64,

    /// More logging (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn transport_type(&self) -> anyhow::Result<TransportType> {
        #[cfg(feature = "tcp")]
        if let Some(addr) = &self.speculos {
            let (host, port) = addr
                .rsplit_once(':')
                .with_context(|| format!("expected HOST:PORT, got `{addr}`"))?;
            let port = port
                .parse()
                .with_context(|| format!("invalid port in `{addr}`"))?;
            return Ok(TransportType::TCP(host.to_string(), port));
        }
        #[cfg(feature = "hid")]
        let transport_type = Ok(TransportType::NativeHID);
        #[cfg(not(feature = "hid"))]
        let transport_type = Err(anyhow::anyhow!(
            "no transport enabled, build with the `hid` or `tcp` feature"
        ));
        transport_type
    }
}

fn set_sigint_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        // dialoguer hides the cursor while a select is open
        let _ = Term::stderr().show_cursor();
        println!("\nOperation cancelled.");
        std::process::exit(0);
    })
    .context("failed to install the Ctrl-C handler")
}

fn run(args: &Args) -> anyhow::Result<ExitCode> {
    let transport_type = args.transport_type()?;
    set_sigint_handler()?;

    let mut prompter = TerminalPrompter::new();
    prompter.ensure_terminal()?;

    let connector = RetryingConnector::with_policy(
        LedgerConnector::new(transport_type),
        FixedBackoff(Duration::from_millis(args.retry_interval_ms)),
        ThreadSleep,
    );

    println!("Welcome to the Ledger Offline Sign (free of charge and telemetry)!");
    match workflow::run(&mut prompter, &connector) {
        Ok(signed) => {
            println!("\n{}", display_signed(&signed));
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Declined) => {
            println!("The request was cancelled by the user.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_cancellation() => {
            println!("Operation cancelled.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
