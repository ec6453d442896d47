//! XYZ Tag Type
//!
//! Used for colorant tags, white point, black point, etc. Only the first
//! XYZNumber of the element is read.
//!
//! See ICC.1:2001-04 Section 6.5.26

use super::{TagInput, TagValue, mismatched_input, type_data};
use crate::error::{IccError, Result};
use crate::icc::types::{TypeSignature, XyzNumber};

pub(super) fn decode_xyz(element: &[u8]) -> Result<TagValue> {
    let data = type_data(element, TypeSignature::XYZ)?;
    XyzNumber::from_bytes(data)
        .map(TagValue::Xyz)
        .ok_or_else(|| IccError::CorruptedData("XYZ tag too small".to_string()))
}

pub(super) fn encode_xyz(input: &TagInput) -> Result<Vec<u8>> {
    match input {
        TagInput::Xyz(xyz) => Ok(xyz.to_bytes().to_vec()),
        _ => Err(mismatched_input(TypeSignature::XYZ, input)),
    }
}
