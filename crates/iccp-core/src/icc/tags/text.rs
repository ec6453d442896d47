//! Text Tag Types
//!
//! - text: NUL-terminated ASCII, ICC.1:2001-04 Section 6.5.18
//! - desc: profile description (v2), ICC.1:2001-04 Section 6.5.17
//!
//! `mluc` (v4 multi-localized Unicode) is not handled and stays raw.

use super::{TagInput, TagValue, mismatched_input, type_data};
use crate::error::{IccError, Result};
use crate::icc::types::{TypeSignature, be_u32};

/// Zero ScriptCode bytes closing a `desc` element
const SCRIPTCODE_SIZE: usize = 67;

pub(super) fn decode_text(element: &[u8]) -> Result<TagValue> {
    let data = type_data(element, TypeSignature::TEXT)?;
    let data = data.strip_suffix(&[0]).unwrap_or(data);
    Ok(TagValue::Text(String::from_utf8_lossy(data).into_owned()))
}

pub(super) fn encode_text(input: &TagInput) -> Result<Vec<u8>> {
    let TagInput::Text(text) = input else {
        return Err(mismatched_input(TypeSignature::TEXT, input));
    };
    let mut out = Vec::with_capacity(text.len() + 1);
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    Ok(out)
}

/// Only the ASCII part is read; the Unicode and ScriptCode parts are
/// rarely populated and often broken in real profiles.
pub(super) fn decode_desc(element: &[u8]) -> Result<TagValue> {
    let data = type_data(element, TypeSignature::DESC)?;
    if data.len() < 4 {
        return Err(IccError::CorruptedData(
            "Description tag too small".to_string(),
        ));
    }

    // ASCII description count (includes null)
    let ascii_count = be_u32(data, 0) as usize;
    let ascii = data
        .get(4..)
        .and_then(|rest| rest.get(..ascii_count))
        .ok_or_else(|| IccError::CorruptedData("Description ASCII data truncated".to_string()))?;

    let text: Vec<u8> = ascii.iter().copied().take_while(|&b| b != 0).collect();
    Ok(TagValue::Text(String::from_utf8_lossy(&text).into_owned()))
}

/// The ASCII part holds `text`; the Unicode and ScriptCode parts are empty
pub(super) fn encode_desc(input: &TagInput) -> Result<Vec<u8>> {
    let TagInput::Text(text) = input else {
        return Err(mismatched_input(TypeSignature::DESC, input));
    };
    let ascii_count = u32::try_from(text.len() + 1).map_err(|_| IccError::InvalidInput {
        type_sig: TypeSignature::DESC,
        reason: "description too long".to_string(),
    })?;

    let mut out = Vec::with_capacity(4 + text.len() + 1 + 8 + 3 + SCRIPTCODE_SIZE);
    out.extend_from_slice(&ascii_count.to_be_bytes());
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    // Unicode language code and count
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    // ScriptCode code and count
    out.extend_from_slice(&0u16.to_be_bytes());
    out.push(0);
    out.extend_from_slice(&[0u8; SCRIPTCODE_SIZE]);
    Ok(out)
}
