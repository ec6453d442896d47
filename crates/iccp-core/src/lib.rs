//! # iccp - ICC profile codec
//!
//! Reads and writes ICC color profiles (ICC.1:2001-04 / ICC.1:2004-10)
//! at the byte level: a 128-byte header, a tag directory and the tag
//! elements it points at.
//!
//! Every tag is kept as raw bytes so that unknown types survive a round
//! trip unchanged. Tags whose type has a registered decoder are also
//! available as typed values; see [`TypeRegistry`] for the supported set.
//!
//! ## Quick Start
//!
//! ```
//! use iccp_core::{CurveSpec, Profile, TagSignature, blackshift};
//!
//! // A greyscale scanner profile whose tone curve crushes the darkest 7%
//! let mut profile = Profile::new();
//! profile.greyscale_input();
//! profile.add_tags([(TagSignature::GRAY_TRC, CurveSpec::sampled(blackshift(0.07)))])?;
//!
//! let mut out = Vec::new();
//! profile.write(&mut out)?;
//! # Ok::<(), iccp_core::IccError>(())
//! ```
//!
//! Decoding never fails on a malformed tag: problems that leave the
//! profile usable are reported through [`Profile::warnings`].

pub mod container;
pub mod error;
pub mod icc;
pub mod profile;

pub use container::ProfileContainer;
pub use error::{IccError, Result, StructuralWarning};
pub use icc::{
    CurveData, CurveSpec, D50, DateTimeNumber, IccHeader, ProfileVersion, RawTags, S15Fixed16,
    SampleFn, Signature, SignatureMap, TagInput, TagSignature, TagValue, TypeRegistry,
    TypeSignature, VcgtData, XyzNumber, blackshift, decode_date_time, decode_fixed16, decode_xyz,
    encode_date_time, encode_fixed16, encode_xyz,
};
pub use profile::{Profile, UNKNOWN_NAME};

/// Version of iccp
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
