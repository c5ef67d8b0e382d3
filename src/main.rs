//! # Novitus CLI
//!
//! Command-line interface for Novitus fiscal printers.
//!
//! ## Usage
//!
//! ```bash
//! # Mechanism and transaction status
//! novitus --device /dev/ttyUSB0 status
//!
//! # Cash register data as JSON
//! novitus info --json
//!
//! # Programmed tax rates
//! novitus tax-rates
//!
//! # Put cash into the drawer
//! novitus cash-in 100
//!
//! # Serial ports on this machine
//! novitus ports
//!
//! # Show a frame without opening a device
//! novitus frame '#i' --param 0 --text 100/
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use novitus::{
    CodePage, NovitusError, Printer, PrinterConfig,
    printer::ConfigLoadResult,
    protocol::{
        commands::{self, Command, ErrorHandling},
        frame::to_hex,
        grammar::yes_no,
    },
    transport::serial::available_ports,
};

/// Novitus - Fiscal printer utility
#[derive(Parser, Debug)]
#[command(name = "novitus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./novitus.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Printer device path
    #[arg(long, global = true)]
    device: Option<String>,

    /// Serial baud rate
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// Code page: mazovia or cp1250
    #[arg(long, global = true)]
    code_page: Option<CodePage>,

    /// Log frames and replies
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show device (DLE) and transaction (ENQ) status
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Show the error number of the last command
    Error,

    /// Read cash register data
    Info {
        /// Report mode
        #[arg(long, default_value_t = commands::CASH_REGISTER_MODE)]
        mode: u8,

        #[arg(long)]
        json: bool,
    },

    /// List programmed tax rates
    TaxRates,

    /// Sound the buzzer
    Bell,

    /// Abort the command being received
    Cancel,

    /// Open the cash drawer
    Drawer,

    /// Record cash put into the drawer
    CashIn { amount: f64 },

    /// Record cash taken from the drawer
    CashOut { amount: f64 },

    /// Set error handling: display, silent, auto-with-display, auto-without-display
    ErrorMode { mode: ErrorHandling },

    /// List serial ports present on this machine
    Ports,

    /// Print the hex frame for a command without opening a device
    Frame {
        /// Two-character opcode, e.g. '#i'
        opcode: String,

        /// Parameter token (repeatable, in order)
        #[arg(long = "param")]
        params: Vec<String>,

        /// Text token (repeatable, in order)
        #[arg(long = "text")]
        texts: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), NovitusError> {
    let config = resolve_config(&cli)?;

    if let Commands::Frame {
        opcode,
        params,
        texts,
    } = &cli.command
    {
        let mut command = Command::new(opcode.as_str());
        for param in params {
            command.push_param(param.as_str());
        }
        for text in texts {
            command.push_text(text.as_str());
        }
        println!("{}", to_hex(&command.encode(config.code_page)?));
        return Ok(());
    }

    if let Commands::Ports = cli.command {
        for port in available_ports()? {
            println!("{}", port);
        }
        return Ok(());
    }

    let mut printer = Printer::open(config)?;

    match cli.command {
        Commands::Status { json } => {
            let device = printer.device_status()?;
            let transaction = printer.transaction_status()?;
            if json {
                let value = serde_json::json!({
                    "device": device,
                    "transaction": transaction,
                });
                println!("{}", to_json(&value)?);
            } else {
                println!("online: {}", yes_no(device.online));
                println!("papererror: {}", yes_no(device.paper_error));
                println!("printererror: {}", yes_no(device.printer_error));
                println!("fiscal: {}", yes_no(transaction.fiscal));
                println!("lastcommanderror: {}", yes_no(transaction.last_command_error));
                println!("intransaction: {}", yes_no(transaction.in_transaction));
                println!(
                    "lasttransactioncorrect: {}",
                    yes_no(transaction.last_transaction_correct)
                );
            }
        }
        Commands::Error => {
            let code = printer.last_error()?;
            if code == 0 {
                println!("0 (no error)");
            } else {
                println!("{}", novitus::error::lookup_error(code));
            }
        }
        Commands::Info { mode, json } => {
            let snapshot = printer.cash_register_data(mode)?;
            if json {
                println!("{}", to_json(&snapshot)?);
            } else {
                for (name, value) in snapshot.fields() {
                    println!("{}: {}", name, value);
                }
            }
        }
        Commands::TaxRates => {
            for (slot, rate) in printer.tax_rates()? {
                println!("{}: {}", slot, rate);
            }
        }
        Commands::Bell => printer.bell()?,
        Commands::Cancel => printer.cancel()?,
        Commands::Drawer => printer.open_drawer()?,
        Commands::CashIn { amount } => printer.cash_in(amount)?,
        Commands::CashOut { amount } => printer.cash_out(amount)?,
        Commands::ErrorMode { mode } => printer.set_error_handling(mode)?,
        Commands::Frame { .. } | Commands::Ports => {}
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides.
fn resolve_config(cli: &Cli) -> Result<PrinterConfig, NovitusError> {
    let mut config = match &cli.config {
        Some(path) => PrinterConfig::load(path)?,
        None => match PrinterConfig::try_load(&PrinterConfig::default_path()) {
            ConfigLoadResult::Loaded(config) => config,
            ConfigLoadResult::Missing => PrinterConfig::default(),
            ConfigLoadResult::Invalid(e) => return Err(e.into()),
        },
    };

    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    if let Some(code_page) = cli.code_page {
        config.code_page = code_page;
    }

    config.validate()?;
    Ok(config)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, NovitusError> {
    serde_json::to_string_pretty(value).map_err(|e| NovitusError::Io(e.into()))
}
