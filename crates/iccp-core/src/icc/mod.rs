//! ICC Profile Codec
//!
//! Reads and writes the binary layout of ICC.1:2001-04 / ICC.1:2004-10
//! profiles.
//!
//! # Structure
//!
//! An ICC profile consists of:
//! 1. A 128-byte header
//! 2. A tag table listing all tags
//! 3. Tag data (may overlap)
//!
//! Only a subset of tag types is decoded (see [`TypeRegistry`]); every
//! tag remains available as raw bytes.

pub mod header;
pub mod tag_table;
pub mod tags;
pub mod types;

pub use header::{HEADER_SIZE, IccHeader, MIN_PROFILE_SIZE, ProfileVersion};
pub use tag_table::{RawTags, SignatureMap, TagEntry, encode_tag_table, parse_tag_table};
pub use tags::{
    CurveData, CurveSpec, SampleFn, TagInput, TagValue, TypeRegistry, VcgtData, blackshift,
};
pub use types::{
    D50, DateTimeNumber, S15Fixed16, Signature, TagSignature, TypeSignature, XyzNumber,
    decode_date_time, decode_fixed16, decode_xyz, encode_date_time, encode_fixed16, encode_xyz,
};
