use std::path::PathBuf;
use thiserror::Error;

/// Why an uploaded file could not be turned into a [`crate::WideFrame`].
///
/// The presentation layer is expected to branch on the variant to choose the message it
/// shows; loading never panics and never returns a partially parsed table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No bytes, only blank lines, or a header without any data rows.
    #[error("The file is empty or contains no data rows")]
    EmptyInput,

    /// Rows and columns are structurally inconsistent, or a temperature column is not numeric.
    #[error("The file is not a valid CSV table: {0}")]
    MalformedInput(String),

    /// Any other parse failure, with the parser's diagnostic.
    #[error("Failed to parse the file: {0}")]
    OtherInput(String),

    #[error("Failed to read file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),
}
