//! s15Fixed16ArrayType (sf32), ICC.1:2004-10 Section 10.18
//!
//! `chad` stores its 3x3 matrix this way, row-major.

use super::{TagInput, TagValue, mismatched_input, type_data};
use crate::error::Result;
use crate::icc::types::{TypeSignature, read_fixed16_array, write_fixed16_array};

pub(super) fn decode_sf32(element: &[u8]) -> Result<TagValue> {
    let data = type_data(element, TypeSignature::SF32)?;
    Ok(TagValue::Fixed16Array(read_fixed16_array(data)))
}

pub(super) fn encode_sf32(input: &TagInput) -> Result<Vec<u8>> {
    match input {
        TagInput::Fixed16Array(values) => Ok(write_fixed16_array(values)),
        _ => Err(mismatched_input(TypeSignature::SF32, input)),
    }
}
