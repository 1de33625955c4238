use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy shared by the codec, generator and services
// ---------------------------------------------------------------------------

/// Everything that can go wrong while turning request bytes into a dataset,
/// a prediction table or a plot.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    /// The bytes are not delimited text, or a cell is not a number.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Required columns are absent or misnamed.
    #[error("schema error: {0}")]
    Schema(String),

    /// A caller-supplied argument is outside its accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The plot could not be encoded as PNG.
    #[error("render error: {0}")]
    Render(String),
}

impl DataError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        DataError::MalformedInput(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        DataError::Schema(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        DataError::InvalidArgument(msg.into())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::MalformedInput(err.to_string())
    }
}

impl From<image::ImageError> for DataError {
    fn from(err: image::ImageError) -> Self {
        DataError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
