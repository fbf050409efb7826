//! Error types shared by the decoder and the transport helpers.
use crate::Code;
use thiserror::Error;

/// Everything that can go wrong while decompressing.
///
/// Compression never fails, so this only shows up on the decoding side and in the transport
/// helpers wrapping it.
#[derive(Debug, Error)]
pub enum LzError {
    /// An empty text was given to the base64 transport.
    #[error("empty input")]
    EmptyInput,

    /// The base64 transport framing could not be decoded.
    #[error("invalid base64 framing: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The data ended in the middle of a field.
    #[error("compressed data ends in the middle of a field")]
    TruncatedStream,

    /// The data ended on a field boundary without an end marker.
    #[error("compressed data ends without an end marker")]
    EndOfStream,

    /// A code referenced a dictionary entry that was never created.
    #[error("input not decodable: code {code} with only {entries} dictionary entries")]
    CorruptStream { code: Code, entries: usize },
}

impl LzError {
    /// Whether the error is caused by the data running out before the end marker.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, LzError::TruncatedStream | LzError::EndOfStream)
    }
}

/// A convenience `Result` type alias using [`LzError`].
pub type Result<T> = std::result::Result<T, LzError>;

#[cfg(feature = "std")]
impl From<LzError> for std::io::Error {
    fn from(err: LzError) -> Self {
        let kind = if err.is_exhausted() {
            std::io::ErrorKind::UnexpectedEof
        } else {
            std::io::ErrorKind::InvalidData
        };
        std::io::Error::new(kind, err)
    }
}
