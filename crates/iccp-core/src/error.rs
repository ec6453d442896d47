//! Error and warning types for iccp

use std::fmt;

use thiserror::Error;

use crate::icc::types::{TagSignature, TypeSignature};

/// Result type for iccp operations
pub type Result<T> = std::result::Result<T, IccError>;

/// Fatal errors: the current decode or encode call is abandoned.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IccError {
    /// Profile data is too small for a structure the codec cannot do without
    #[error("Profile too small: expected {expected} bytes, got {actual}")]
    TooSmall { expected: usize, actual: usize },

    /// A registered decoder found a payload it cannot interpret
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// Encoding was requested for a type with no registered encoder
    #[error("No encoder for type '{0}'")]
    NoEncoder(TypeSignature),

    /// The tag has no default wire type, so its encoding cannot be implied
    #[error("No default type for tag '{0}'")]
    NoDefaultType(TagSignature),

    /// The encoder for `type_sig` does not accept the supplied value
    #[error("Invalid input for type '{type_sig}': {reason}")]
    InvalidInput {
        type_sig: TypeSignature,
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal anomalies found while decoding.
///
/// These are collected on the decoded profile and logged; decoding
/// always continues past them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StructuralWarning {
    /// Header bytes 36..40 are not 'acsp'
    MissingAcsp(u32),
    /// Header declares more bytes than the buffer holds
    SizeMismatch { declared: u32, actual: usize },
    /// A second directory entry reused a signature; it was dropped
    DuplicateTag(TagSignature),
    /// A directory entry reaches past the end of the buffer; its payload was cut short
    TagOutOfBounds {
        tag: TagSignature,
        offset: u32,
        size: u32,
        profile_size: usize,
    },
    /// A registered decoder rejected the payload; the tag stays raw-only
    UndecodableTag { tag: TagSignature, reason: String },
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAcsp(sig) => {
                write!(
                    f,
                    "acsp field not present (found 0x{:08X}); not an ICC profile?",
                    sig
                )
            }
            Self::SizeMismatch { declared, actual } => {
                write!(
                    f,
                    "Profile size declared to be {} bytes, but only got {}",
                    declared, actual
                )
            }
            Self::DuplicateTag(tag) => write!(f, "Duplicate tag '{}' found; ignoring", tag),
            Self::TagOutOfBounds {
                tag,
                offset,
                size,
                profile_size,
            } => {
                write!(
                    f,
                    "Tag '{}' out of bounds: offset {} + size {} > profile size {}",
                    tag, offset, size, profile_size
                )
            }
            Self::UndecodableTag { tag, reason } => {
                write!(f, "Tag '{}' could not be decoded: {}", tag, reason)
            }
        }
    }
}
