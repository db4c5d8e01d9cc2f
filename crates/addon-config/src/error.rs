use addon_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(addon_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(addon_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(addon_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid URL scheme in network_schemes: `{0}`")]
    #[diagnostic(
        code(addon_config::invalid_scheme),
        help("Schemes start with a letter and contain only letters, digits, `+`, `-` or `.`")
    )]
    InvalidScheme(String),

    #[error("Invalid rename rule `{from}` -> `{to}`")]
    #[diagnostic(
        code(addon_config::invalid_rename),
        help("Both product names must be non-empty and differ from each other")
    )]
    InvalidRename { from: String, to: String },

    #[error("`{0}` must not be empty")]
    #[diagnostic(code(addon_config::empty_value))]
    EmptyValue(&'static str),

    #[error("Extension archive must be a file name, got `{0}`")]
    #[diagnostic(
        code(addon_config::invalid_extension_archive),
        help("Use a plain file name such as `y2update.tgz`")
    )]
    InvalidExtensionArchive(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(addon_config::io))]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(addon_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(addon_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("Failed to annotate first table in array: {0}")]
    #[diagnostic(code(addon_config::annotate_first_table))]
    AnnotateFirstTable(String),

    #[error(transparent)]
    #[diagnostic(code(addon_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
