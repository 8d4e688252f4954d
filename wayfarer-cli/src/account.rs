//! Sign-in, registration and session inspection.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use wayfarer_core::{AuthService, Credentials, Registration, Role, Session, User};

use crate::backend::Backend;
use crate::config::LoginArgs;
use crate::output::line;
use crate::CliError;

/// CLI arguments for the `register` subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct RegisterArgs {
    /// Display name.
    #[arg(long, value_name = "name")]
    pub(crate) name: String,
    /// Login e-mail.
    #[arg(long, value_name = "email")]
    pub(crate) email: String,
    /// Account password.
    #[arg(long, value_name = "password")]
    pub(crate) password: String,
    /// Account role, e.g. "tourist" or "hotel_owner".
    #[arg(long, value_name = "role", default_value = "tourist")]
    pub(crate) role: Role,
}

impl From<RegisterArgs> for Registration {
    fn from(args: RegisterArgs) -> Self {
        Self {
            name: args.name.trim().to_owned(),
            email: args.email.trim().to_owned(),
            password: args.password,
            role: args.role,
        }
    }
}

fn session<'b>(backend: &'b Backend<'_>) -> Session<&'b dyn AuthService> {
    Session::new(
        &*backend.auth,
        Arc::clone(&backend.tokens),
        backend.navigator.clone(),
    )
}

fn describe(user: &User) -> String {
    let role = user.role.map_or("no role", Role::as_str);
    format!("{} <{}> ({role})", user.name, user.email)
}

/// User restored from the stored token, if any.
pub(crate) async fn current_user(backend: &Backend<'_>) -> Option<User> {
    session(backend).init().await.cloned()
}

/// [`current_user`] for commands that cannot run signed out.
pub(crate) async fn require_user(backend: &Backend<'_>) -> Result<User, CliError> {
    current_user(backend).await.ok_or(CliError::NotSignedIn)
}

pub(crate) async fn login(
    args: LoginArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let credentials = Credentials::from(args.into_config()?);
    let user = session(backend).login(&credentials).await?;
    line(out, format!("Signed in as {}", describe(&user)))
}

pub(crate) async fn register(
    args: RegisterArgs,
    backend: &Backend<'_>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let registration = Registration::from(args);
    let user = session(backend).register(&registration).await?;
    line(out, format!("Registered and signed in as {}", describe(&user)))
}

pub(crate) fn logout(backend: &Backend<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    session(backend).logout();
    line(out, "Signed out.")
}

pub(crate) async fn whoami(backend: &Backend<'_>, out: &mut dyn Write) -> Result<(), CliError> {
    match current_user(backend).await {
        Some(user) => line(out, describe(&user)),
        None => line(out, "Not signed in."),
    }
}
