use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use paywise_auth::FileSessionStore;
use paywise_sdk::{ApiError, PayWiseClient};

mod commands;
mod config;
mod logging;
mod output;

use commands::{auth, expenses, overview};
use config::CliConfig;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(name = "paywise")]
struct Cli {
    /// YAML config file; `./paywise.yaml` is read when present.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Each -v raises the configured log level one step.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session.
    Login(auth::LoginArgs),
    /// Create an account and sign in.
    Register(auth::RegisterArgs),
    /// Revoke the refresh token and forget the session.
    Logout,
    /// Show the signed-in user.
    Whoami(auth::WhoamiArgs),
    /// Totals, category breakdown and groups.
    Dashboard,
    Categories,
    Groups,
    Expenses(expenses::ExpensesArgs),
    /// Suggest a category for an expense description.
    Detect(overview::DetectArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML -> env
    let config = CliConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging, cli.verbose);

    let store = Arc::new(FileSessionStore::new(&config.session_file));
    let client = PayWiseClient::new(config.auth_client_config()?, store)
        .context("failed to create the PayWise client")?;
    tracing::debug!(
        api = %client.http().config().api_base_url,
        session_file = %config.session_file.display(),
        "client ready"
    );

    let mut stdout = std::io::stdout();
    let out = &mut stdout;
    let result = match &cli.command {
        Commands::Login(args) => args.run(&client, out).await,
        Commands::Register(args) => args.run(&client, out).await,
        Commands::Logout => auth::logout(&client, out).await,
        Commands::Whoami(args) => args.run(&client, out).await,
        Commands::Dashboard => overview::dashboard(&client, out).await,
        Commands::Categories => overview::categories(&client, out).await,
        Commands::Groups => overview::groups(&client, out).await,
        Commands::Expenses(args) => args.run(&client, out).await,
        Commands::Detect(args) => args.run(&client, out).await,
    };

    result.map_err(surface_session_expiry)
}

/// A session that could not be refreshed is reported on its own, without the
/// command context wrapped around it.
fn surface_session_expiry(err: anyhow::Error) -> anyhow::Error {
    let expired = err
        .chain()
        .any(|cause| matches!(cause.downcast_ref::<ApiError>(), Some(ApiError::SessionExpired)));
    if expired {
        anyhow::Error::new(ApiError::SessionExpired)
    } else {
        err
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_expense_add() {
        let cli = Cli::try_parse_from([
            "paywise",
            "-vv",
            "expenses",
            "add",
            "--description",
            "Cab to office",
            "--amount",
            "350",
            "--date",
            "2026-03-14",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Expenses(_)));
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(
            Cli::try_parse_from(["paywise", "expenses", "list", "--from", "14/03/2026"]).is_err()
        );
    }

    #[test]
    fn session_expiry_drops_context() {
        let err = anyhow::Error::new(ApiError::SessionExpired).context("could not save expense");
        assert_eq!(
            surface_session_expiry(err).to_string(),
            "session expired, please login again"
        );

        let other = anyhow::anyhow!("boom").context("could not save expense");
        assert_eq!(
            surface_session_expiry(other).to_string(),
            "could not save expense"
        );
    }
}
