use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed package description: {0}")]
    Grammar(String),
    #[error("Field {field} must be {expected} bytes long, got {actual}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Stream ended in the middle of field {0}")]
    Truncated(&'static str),
    #[error("Field {field} has {len} elements, at most 255 can be stored")]
    Overflow { field: &'static str, len: usize },
    #[error("Value of field {0} contains the record terminator")]
    EmbeddedTerminator(&'static str),
    #[error("Variable length integer in field {0} does not fit in 64 bits")]
    VarintTooLong(&'static str),
    #[error("Field {0} is not valid UTF-8")]
    Utf8(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map a failed read of `field`: running out of bytes is a truncated stream,
    /// everything else is passed through.
    pub fn from_read(field: &'static str, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::Truncated(field)
        } else {
            Error::Io(e)
        }
    }
}
