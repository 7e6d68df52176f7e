//! Error types for RecurrenceXML / TimeZoneXML encoding and decoding.

use thiserror::Error;

/// Errors that can occur while encoding or decoding the protocol XML fragments.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The input was not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// A required element was absent.
    #[error("missing <{0}> element")]
    MissingElement(&'static str),

    /// The `<repeat>` element held something outside the closed set of patterns.
    #[error("unknown recurrence pattern <{0}>")]
    UnknownPattern(String),

    /// A rule must carry exactly one of `windowEnd`, `repeatForever`, `repeatInstances`.
    #[error("expected exactly one terminator (windowEnd, repeatForever, repeatInstances), found {0}")]
    TerminatorCount(usize),

    /// An attribute or element value could not be parsed or is out of range.
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    /// A structurally invalid value was handed to an encoder.
    #[error("Encoding error: {0}")]
    Encode(String),
}

/// Decoding failures are reported with the same enum as encoding failures.
pub type DecodeError = CodecError;

/// Convenience alias used throughout outsps-xml.
pub type Result<T> = std::result::Result<T, CodecError>;

pub(crate) fn invalid(field: &'static str, value: impl Into<String>) -> CodecError {
    CodecError::InvalidValue {
        field,
        value: value.into(),
    }
}
