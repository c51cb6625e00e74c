//! prepdesk-session - drive the client session from a terminal.
//!
//! Uses the same file store as the desktop client, so a `login` here is
//! visible to the next `whoami` (and vice versa).
//!
//! ```bash
//! prepdesk-session register alice --password pw --name "Alice A." --contact +1555
//! prepdesk-session whoami
//! prepdesk-session logout
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use prepdesk::prelude::*;

#[derive(Parser)]
#[command(name = "prepdesk-session")]
#[command(about = "Sign in to prepdesk and inspect the stored session")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file (defaults apply when absent)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overriding config and PREPDESK_API_URL
    #[arg(long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with an existing account
    Login {
        user_id: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        user_id: String,
        #[arg(long)]
        password: String,
        /// Display name shown in the app
        #[arg(long)]
        name: String,
        /// WhatsApp number for interview reminders
        #[arg(long)]
        contact: String,
    },

    /// Sign out and delete the stored session
    Logout,

    /// Print the signed-in user, if any
    Whoami,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), PrepdeskError> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.api_base_url = server;
    }
    prepdesk::logging::init(&config.log_filter)?;

    let context = SessionContext::builder().config(config).build()?;
    let session = context.session();

    match cli.command {
        Command::Login { user_id, password } => {
            let identity = session.login(user_id, &password).await?;
            println!("Signed in as {}", identity.label());
        }
        Command::Register {
            user_id,
            password,
            name,
            contact,
        } => {
            let identity = session
                .register(user_id, &password, &name, &contact)
                .await?;
            println!("Welcome, {}", identity.label());
        }
        Command::Logout => {
            let was = context.identity();
            session.logout()?;
            match was {
                Some(identity) => println!("Signed out {}", identity.user_id),
                None => println!("Not signed in"),
            }
        }
        Command::Whoami => match require_auth(&context) {
            Access::Granted(identity) => {
                tracing::debug!(user_id = %identity.user_id, "session present");
                println!("{}", identity.label());
            }
            Access::Redirect(route) => {
                println!("Not signed in (the app would redirect to {route})");
                return Err(SessionError::NotAuthenticated.into());
            }
        },
    }

    Ok(())
}
