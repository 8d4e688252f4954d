//! Error types emitted by the Wayfarer CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wayfarer_client::ClientBuildError;
use wayfarer_core::{BuilderError, EntityKind, FormError, ServiceError, SessionError};
use wayfarer_export::ExportError;

/// Errors emitted by the Wayfarer CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// CLI values could not be turned into a configuration layer.
    #[error("failed to collect command-line configuration: {0}")]
    CollectArguments(#[source] serde_json::Error),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The async runtime could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// The HTTP client could not be built.
    #[error(transparent)]
    BuildClient(#[from] ClientBuildError),
    /// A backend call failed.
    #[error("failed to {action}: {source}")]
    Service {
        action: String,
        #[source]
        source: ServiceError,
    },
    /// Signing in or registering failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The command needs a signed-in user.
    #[error("not signed in (run `wayfarer login`)")]
    NotSignedIn,
    /// An entity form rejected the operation.
    #[error(transparent)]
    Form(#[from] FormError),
    /// The trip plan builder rejected the operation.
    #[error(transparent)]
    Builder(#[from] BuilderError),
    /// A listing filter flag does not apply to the chosen kind.
    #[error("--{flag} does not apply to {}", .kind.plural_label())]
    UnsupportedFilter { flag: &'static str, kind: EntityKind },
    /// A destructive command ran without `--yes`.
    #[error("refusing to delete {what} without --yes")]
    ConfirmationRequired { what: String },
    /// Reading a form file failed.
    #[error("failed to read form {path:?}: {source}")]
    ReadForm {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A form file is not valid JSON for the chosen kind.
    #[error("failed to parse form {path:?}: {source}")]
    ParseForm {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Reading an image file failed.
    #[error("failed to read image {path:?}: {source}")]
    ReadImage {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Rendering or saving an export failed.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// Serializing a record for display failed.
    #[error("failed to serialize record: {0}")]
    SerializeRecord(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    pub(crate) fn service(action: impl Into<String>) -> impl FnOnce(ServiceError) -> Self {
        let action = action.into();
        move |source| Self::Service { action, source }
    }
}
