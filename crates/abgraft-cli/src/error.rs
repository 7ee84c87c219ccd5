use abgraft::core::germlines::registry::GermlineLoadError;
use abgraft::engine::error::PipelineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Germlines(#[from] GermlineLoadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{failed} of {total} record(s) could not be humanized")]
    RecordsFailed { failed: usize, total: usize },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
