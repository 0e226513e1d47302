//! Error types for the VP9 syntax parser

use thiserror::Error;

/// Result type alias for parser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the VP9 syntax parser
///
/// Every variant that corresponds to a bitstream failure carries the
/// absolute bit offset at which the failure was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stream violates the VP9 syntax (bad marker, bad sync code,
    /// reserved bit set, illegal enum value, unclosed arithmetic section)
    #[error("corrupt bitstream at bit {position}: {reason}")]
    CorruptBitstream { position: usize, reason: String },

    /// A read ran past the end of the frame buffer
    #[error("end of stream at bit {position}")]
    EndOfStream { position: usize },

    /// Feature or combination rejected by caller policy
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Frame dimensions of zero or exceeding the configured caps
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl Error {
    /// Create a corrupt-bitstream error at the given bit position
    pub fn corrupt<S: Into<String>>(position: usize, reason: S) -> Self {
        Error::CorruptBitstream {
            position,
            reason: reason.into(),
        }
    }

    /// Create an unsupported-feature error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Error::Unsupported(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::corrupt(17, "bad frame marker");
        assert_eq!(
            err.to_string(),
            "corrupt bitstream at bit 17: bad frame marker"
        );

        let err = Error::EndOfStream { position: 64 };
        assert_eq!(err.to_string(), "end of stream at bit 64");
    }
}
