pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by matrix construction, element access and the
/// operations layered on top of them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Failed to create matrix: {0}")]
    Allocation(String),

    #[error("Invalid depth: {0}")]
    InvalidDepth(i32),

    #[error("Index out of range: {0}")]
    OutOfRange(String),

    #[error("Channel mismatch: {0}")]
    ChannelMismatch(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Coarse grouping of [`Error`] variants, as seen by callers that only
/// distinguish a handful of failure classes (the Python binding maps each
/// one onto a built-in exception).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested shape could not be allocated.
    Allocation,
    /// An index or depth code outside the valid range.
    Index,
    /// An operand of the wrong kind.
    Type,
    /// An argument with an unusable value.
    Value,
    Io,
    /// Anything the operation itself rejected.
    Computation,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Allocation(_) => ErrorKind::Allocation,
            Error::OutOfRange(_) | Error::InvalidDepth(_) => ErrorKind::Index,
            Error::Type(_) => ErrorKind::Type,
            Error::Argument(_) | Error::ChannelMismatch(_) => ErrorKind::Value,
            Error::Io(_) => ErrorKind::Io,
            Error::Computation(_) => ErrorKind::Computation,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_a_kind() {
        let cases = [
            (Error::Allocation("0x0".into()), ErrorKind::Allocation),
            (Error::OutOfRange("(9, 9)".into()), ErrorKind::Index),
            (Error::InvalidDepth(7), ErrorKind::Index),
            (Error::Type("number".into()), ErrorKind::Type),
            (Error::Argument("ksize".into()), ErrorKind::Value),
            (Error::ChannelMismatch("5 channels".into()), ErrorKind::Value),
            (Error::Io("missing.png".into()), ErrorKind::Io),
            (Error::Computation("shape".into()), ErrorKind::Computation),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn foreign_errors_are_io() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(e.kind(), ErrorKind::Io);
        assert!(e.to_string().contains("gone"));
    }
}
