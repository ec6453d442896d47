//! ICC Profile Tag Types
//!
//! Tags contain the actual profile data. Each tag element has:
//! - A 4-byte type signature identifying the data format
//! - 4 reserved bytes
//! - Type-specific data
//!
//! Decoders take the whole element (signature included). Encoders produce
//! only the type-specific data; [`TypeRegistry::encode`] adds the prefix.
//!
//! See ICC.1:2004-10 Section 10.

mod curves;
mod fixed;
mod registry;
mod text;
mod vcgt;
mod xyz;

use std::fmt;

pub use curves::{CurveData, CurveSpec, SampleFn, blackshift};
pub use registry::{DecodeFn, EncodeFn, TypeRegistry};
pub use vcgt::VcgtData;

use super::types::{TypeSignature, XyzNumber};
use crate::error::{IccError, Result};

/// Length of the type signature plus reserved field
pub const ELEMENT_PREFIX_SIZE: usize = 8;

/// A decoded tag value
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// `text` or the ASCII part of `desc`
    Text(String),
    /// `XYZ `
    Xyz(XyzNumber),
    /// `curv`
    Curve(CurveData),
    /// Apple `vcgt`
    VideoCardGamma(VcgtData),
    /// `sf32`
    Fixed16Array(Vec<f64>),
}

impl TagValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_xyz(&self) -> Option<&XyzNumber> {
        match self {
            TagValue::Xyz(xyz) => Some(xyz),
            _ => None,
        }
    }

    pub fn as_curve(&self) -> Option<&CurveData> {
        match self {
            TagValue::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn as_vcgt(&self) -> Option<&VcgtData> {
        match self {
            TagValue::VideoCardGamma(vcgt) => Some(vcgt),
            _ => None,
        }
    }

    pub fn as_fixed16_array(&self) -> Option<&[f64]> {
        match self {
            TagValue::Fixed16Array(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::Xyz(xyz) => write!(f, "{}", xyz),
            TagValue::Curve(curve) => write!(f, "{}", curve),
            TagValue::VideoCardGamma(vcgt) => write!(f, "{}", vcgt),
            TagValue::Fixed16Array(values) => write!(f, "{:?}", values),
        }
    }
}

/// A value to encode, one variant per shape an encoder accepts
#[derive(Debug, Clone)]
pub enum TagInput {
    /// For `text` and `desc`
    Text(String),
    /// For `XYZ `
    Xyz(XyzNumber),
    /// For `curv`
    Curve(CurveSpec),
    /// For `sf32`
    Fixed16Array(Vec<f64>),
}

impl TagInput {
    /// The input that re-encodes a decoded value, if its type has an encoder
    pub fn from_value(value: &TagValue) -> Option<Self> {
        match value {
            TagValue::Text(text) => Some(TagInput::Text(text.clone())),
            TagValue::Xyz(xyz) => Some(TagInput::Xyz(*xyz)),
            TagValue::Curve(curve) => Some(TagInput::Curve(CurveSpec::from(curve))),
            TagValue::Fixed16Array(values) => Some(TagInput::Fixed16Array(values.clone())),
            TagValue::VideoCardGamma(_) => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            TagInput::Text(_) => "text",
            TagInput::Xyz(_) => "XYZ triple",
            TagInput::Curve(_) => "curve",
            TagInput::Fixed16Array(_) => "fixed-point array",
        }
    }
}

impl From<&str> for TagInput {
    fn from(text: &str) -> Self {
        TagInput::Text(text.to_string())
    }
}

impl From<String> for TagInput {
    fn from(text: String) -> Self {
        TagInput::Text(text)
    }
}

impl From<XyzNumber> for TagInput {
    fn from(xyz: XyzNumber) -> Self {
        TagInput::Xyz(xyz)
    }
}

impl From<CurveSpec> for TagInput {
    fn from(curve: CurveSpec) -> Self {
        TagInput::Curve(curve)
    }
}

/// Check the element's type signature and return the data after the prefix
fn type_data(element: &[u8], expected: TypeSignature) -> Result<&[u8]> {
    if element.len() < ELEMENT_PREFIX_SIZE {
        return Err(IccError::CorruptedData(format!(
            "'{}' element too small for header: {} bytes",
            expected,
            element.len()
        )));
    }
    if element[0..4] != expected.to_bytes() {
        return Err(IccError::CorruptedData(format!(
            "expected type '{}', found '{}'",
            expected,
            TypeSignature::from_bytes([element[0], element[1], element[2], element[3]])
        )));
    }
    Ok(&element[ELEMENT_PREFIX_SIZE..])
}

/// Error for an encoder handed the wrong shape of input
fn mismatched_input(type_sig: TypeSignature, input: &TagInput) -> IccError {
    IccError::InvalidInput {
        type_sig,
        reason: format!("cannot encode a {} value", input.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_data_checks_signature() {
        let element = b"text\0\0\0\0abc\0";
        assert_eq!(type_data(element, TypeSignature::TEXT).unwrap(), b"abc\0");
        assert!(type_data(element, TypeSignature::CURVE).is_err());
        assert!(type_data(b"text", TypeSignature::TEXT).is_err());
    }

    #[test]
    fn test_vcgt_has_no_input() {
        let value = TagValue::VideoCardGamma(VcgtData::Opaque(vec![1, 2, 3]));
        assert!(TagInput::from_value(&value).is_none());

        let value = TagValue::Text("hi".to_string());
        assert!(matches!(TagInput::from_value(&value), Some(TagInput::Text(t)) if t == "hi"));
    }
}
