//! Error types for addon-core.

use std::path::PathBuf;

use addon_config::error::ConfigError;
use addon_utils::error::{FileSystemError, UrlError};
use miette::Diagnostic;
use thiserror::Error;

use crate::types::RepositoryHandle;

/// Core error type for add-on integration.
#[derive(Error, Diagnostic, Debug)]
pub enum AddOnError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Unable to add product {url}.")]
    #[diagnostic(
        code(addon::registration),
        help("Check that the medium is inserted and the URL is correct")
    )]
    RegistrationFailure { url: String },

    #[error("Repository {repo} provides `{found}` instead of `{expected}`")]
    #[diagnostic(
        code(addon::name_mismatch),
        help("Insert the medium that carries the expected product")
    )]
    NameMismatch {
        repo: RepositoryHandle,
        expected: String,
        found: String,
    },

    #[error("License of repository {repo} was not accepted")]
    #[diagnostic(code(addon::license_rejected))]
    LicenseRejected { repo: RepositoryHandle },

    #[error("Product {0} not found on media.")]
    #[diagnostic(code(addon::product_not_found), severity(warning))]
    ProductNotFound(String),

    #[error("Failed to parse add-on list {}: {reason}", path.display())]
    #[diagnostic(
        code(addon::malformed_descriptor_source),
        help("Check the add-on list syntax")
    )]
    MalformedDescriptorSource { path: PathBuf, reason: String },

    #[error("Unsupported add-on list type `{kind}` for {}", path.display())]
    #[diagnostic(
        code(addon::unsupported_descriptor_source),
        help("Supported add-on list types are `xml` and `plain`")
    )]
    UnsupportedDescriptorSource { path: PathBuf, kind: String },

    #[error("Media request for {url} was cancelled")]
    #[diagnostic(code(addon::media_cancelled))]
    MediaCancelled { url: String },

    #[error("Repository {url} could not be reached")]
    #[diagnostic(
        code(addon::network_unavailable),
        help("Check the network configuration and try again")
    )]
    NetworkUnavailable { url: String },

    #[error("Installer extension failed: {0}")]
    #[diagnostic(code(addon::extension))]
    Extension(String),

    #[error(transparent)]
    #[diagnostic(
        code(addon::archive),
        help("The extension archive may be corrupted")
    )]
    Archive(#[from] compak::error::ArchiveError),

    #[error("Error while {action}")]
    #[diagnostic(code(addon::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(addon::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(addon::url))]
    Url(#[from] UrlError),

    #[error(transparent)]
    #[diagnostic(code(addon::filesystem))]
    FileSystem(#[from] FileSystemError),

    #[error("Thread lock poison error")]
    #[diagnostic(
        code(addon::poison),
        help("This is an internal error, please report it")
    )]
    PoisonError,
}

impl<T> From<std::sync::PoisonError<T>> for AddOnError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::PoisonError
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, AddOnError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, AddOnError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            AddOnError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
