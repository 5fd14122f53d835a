use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
/// Errors raised while configuring or driving a rotating CSV writer.
pub enum WriterError {
    /// Invalid directory, file name or option value. Raised at construction only.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("The file {0} is already open")]
    AlreadyOpen(String),

    /// A row was written after the writer was closed.
    #[error("Handle does not exist. File {0}")]
    NotOpen(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl WriterError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        WriterError::Io {
            context: context.into(),
            source,
        }
    }
}
