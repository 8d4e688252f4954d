//! Command-line front end for the Wayfarer tourism marketplace.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use clap::error::ErrorKind;
use wayfarer_core::navigation::LOGIN_ROUTE;

mod account;
mod backend;
mod config;
mod error;
mod listings;
mod output;
mod trips;

pub use backend::{Backend, HOME_ROUTE};
pub use config::{ClientSettings, DEFAULT_SESSION_FILE, DEFAULT_TIMEOUT_SECS};
pub use error::CliError;

use account::RegisterArgs;
use config::{GlobalArgs, LoginArgs};
use listings::{
    CreateArgs, DeleteArgs, ListArgs, RemoveImageArgs, SearchCabsArgs, ShowArgs, UpdateArgs,
};
use trips::TripsCommand;

/// Run the Wayfarer CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => return Err(CliError::ArgumentParsing(err)),
    };
    let settings = cli.global.into_settings()?;
    let backend = Backend::http(&settings)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(cli.command, &backend, &mut out)
}

/// Execute `command` against `backend`, writing results to `out`.
fn run_with(command: Command, backend: &Backend<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let signs_out = matches!(command, Command::Logout);
    let result = runtime.block_on(dispatch(command, backend, out));
    if !signs_out && backend.navigator.redirects().iter().any(|route| route == LOGIN_ROUTE) {
        output::line(out, "Session expired or missing; run `wayfarer login`.")?;
    }
    result
}

async fn dispatch(
    command: Command,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Login(args) => account::login(args, backend, out).await,
        Command::Register(args) => account::register(args, backend, out).await,
        Command::Logout => account::logout(backend, out),
        Command::Whoami => account::whoami(backend, out).await,
        Command::List(args) => listings::list(args, backend, out).await,
        Command::Show(args) => listings::show(args, backend, out).await,
        Command::Create(args) => listings::create(args, backend, out).await,
        Command::Update(args) => listings::update(args, backend, out).await,
        Command::RemoveImage(args) => listings::remove_image(args, backend, out).await,
        Command::Delete(args) => listings::delete(args, backend, out).await,
        Command::SearchCabs(args) => listings::search_cabs(args, backend, out).await,
        Command::Trips(command) => trips::run(command, backend, out).await,
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    about = "Browse listings and plan trips on the Wayfarer marketplace",
    version
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and keep the session token.
    Login(LoginArgs),
    /// Create an account and sign in.
    Register(RegisterArgs),
    /// Forget the session token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List hotels, restaurants, cab services or guides.
    List(ListArgs),
    /// Show one listing.
    Show(ShowArgs),
    /// Create a listing from a JSON form.
    Create(CreateArgs),
    /// Update a listing you own.
    Update(UpdateArgs),
    /// Delete one stored image of a listing you own.
    RemoveImage(RemoveImageArgs),
    /// Delete a listing.
    Delete(DeleteArgs),
    /// Find cab services operating in an area.
    SearchCabs(SearchCabsArgs),
    /// Manage trip plans.
    #[command(subcommand)]
    Trips(TripsCommand),
}

#[cfg(test)]
mod tests;
