use thiserror::Error;

/// Errors raised while decoding bytes received from the network
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader ran out of bytes before the value was complete
    #[error("Unexpected end of stream: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A boolean byte held something other than 0 or 1
    #[error("Invalid boolean byte {value}")]
    InvalidBool { value: u8 },

    /// An enum discriminant byte did not match any known variant
    #[error("Invalid {kind} index {index}")]
    InvalidVariant { kind: &'static str, index: u8 },

    /// A string length prefix ran longer than five bytes
    #[error("Malformed string length prefix")]
    MalformedLength,

    /// A string's bytes were not valid UTF-8
    #[error("String payload of {length} bytes is not valid UTF-8")]
    InvalidUtf8 { length: usize },
}
