//! Fides CLI - Main entry point

use clap::{Args, Parser, Subcommand};
use fides_cli::{commands, AppContext, FidesConfig};
use fides_ledger::{NewDecision, NewRevocation, Payment};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fides")]
#[command(about = "Fides - no record, no payment", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory path (overrides config and FIDES_DATA_DIR)
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PaymentArgs {
    /// Decision the payment executes
    decision_id: String,
    #[arg(long)]
    beneficiary: String,
    /// ISO 4217 currency code
    #[arg(long)]
    currency: String,
    /// Decimal amount, e.g. 50000.00
    #[arg(long)]
    value: String,
    /// Payment date (ISO 8601)
    #[arg(long)]
    date: String,
}

impl PaymentArgs {
    fn into_payment(self) -> Payment {
        Payment::new(
            self.decision_id,
            self.beneficiary,
            self.currency,
            self.value,
            self.date,
        )
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Record a decision (DR, or SDR with --maximum-term)
    Decide {
        #[arg(long)]
        authority: String,
        /// Decider id, once per decider
        #[arg(long = "decider", required = true)]
        deciders: Vec<String>,
        /// Signature, one per decider, in the same order
        #[arg(long = "signature", required = true)]
        signatures: Vec<String>,
        #[arg(long)]
        act_type: String,
        #[arg(long)]
        currency: String,
        #[arg(long)]
        max_value: String,
        #[arg(long)]
        beneficiary: String,
        #[arg(long)]
        legal_basis: String,
        #[arg(long)]
        decision_date: String,
        #[arg(long)]
        decision_id: Option<String>,
        #[arg(long)]
        record_timestamp: Option<String>,
        /// Expiry; makes the decision term-limited
        #[arg(long)]
        maximum_term: Option<String>,
    },

    /// Revoke a decision
    Revoke {
        decision_id: String,
        #[arg(long)]
        authority: String,
        #[arg(long = "decider", required = true)]
        deciders: Vec<String>,
        #[arg(long = "signature", required = true)]
        signatures: Vec<String>,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        revocation_date: Option<String>,
        #[arg(long)]
        record_timestamp: Option<String>,
    },

    /// Authorize and record a payment
    Pay {
        #[command(flatten)]
        payment: PaymentArgs,
        #[arg(long)]
        payment_id: Option<String>,
    },

    /// Authorize a payment without recording it
    Check {
        #[command(flatten)]
        payment: PaymentArgs,
    },

    /// Audit the ledger (verify hash chain)
    Audit,

    /// Run the in-memory demo scenario
    Demo,
}

fn main() -> anyhow::Result<()> {
    // Reject reasons stay out of the requester's terminal unless RUST_LOG asks for them
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config_path, data) = (cli.config, cli.data);
    let open = || -> anyhow::Result<AppContext> {
        AppContext::new(FidesConfig::resolve(config_path.as_deref(), data.clone())?)
    };

    match cli.command {
        Commands::Decide {
            authority,
            deciders,
            signatures,
            act_type,
            currency,
            max_value,
            beneficiary,
            legal_basis,
            decision_date,
            decision_id,
            record_timestamp,
            maximum_term,
        } => {
            commands::decide(
                &open()?,
                NewDecision {
                    authority_id: authority,
                    deciders_id: deciders,
                    act_type,
                    currency,
                    maximum_value: max_value,
                    beneficiary,
                    legal_basis,
                    decision_date,
                    signatures,
                    decision_id,
                    record_timestamp,
                    maximum_term,
                },
            )?;
        }

        Commands::Revoke {
            decision_id,
            authority,
            deciders,
            signatures,
            reason,
            revocation_date,
            record_timestamp,
        } => {
            commands::revoke(
                &open()?,
                NewRevocation {
                    target_decision_id: decision_id,
                    authority_id: authority,
                    deciders_id: deciders,
                    revocation_reason: reason,
                    signatures,
                    revocation_id: None,
                    revocation_date,
                    record_timestamp,
                },
            )?;
        }

        Commands::Pay {
            payment,
            payment_id,
        } => {
            commands::pay(&open()?, payment_id.as_deref(), &payment.into_payment())?;
        }

        Commands::Check { payment } => {
            commands::check(&open()?, &payment.into_payment());
        }

        Commands::Audit => {
            let integrity = commands::audit(&open()?)?;
            if !integrity.valid {
                std::process::exit(1);
            }
        }

        Commands::Demo => {
            commands::demo()?;
        }
    }

    Ok(())
}
