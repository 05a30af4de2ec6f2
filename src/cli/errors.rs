//! CLI error type
//!
//! Every CLI error ends the process with a non-zero exit code.

use thiserror::Error;

use crate::config::ConfigError;
use crate::entity::EntityError;
use crate::schema::SchemaError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Entity(#[from] EntityError),

    // Input / output
    #[error("Empty input")]
    EmptyInput,

    #[error("Invalid input JSON: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(err) => err.code(),
            CliError::Schema(err) => err.code().code(),
            CliError::Entity(err) => err.code().code(),
            CliError::EmptyInput => "WEFT_CLI_EMPTY_INPUT",
            CliError::InvalidInput(_) => "WEFT_CLI_INVALID_INPUT",
            CliError::Io(_) => "WEFT_CLI_IO_ERROR",
        }
    }
}
