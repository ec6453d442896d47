//! Curve Tag Type (curv)
//!
//! A curveType holds a tone reproduction curve in one of three forms,
//! chosen by the entry count that follows the reserved field:
//! - 0 entries: identity response
//! - 1 entry: a u8Fixed8 gamma exponent
//! - n entries: a lookup table of u16 samples over [0, 1]
//!
//! See ICC.1:2001-04 Section 6.5.3

use std::fmt;
use std::sync::Arc;

use super::{TagInput, TagValue, mismatched_input, type_data};
use crate::error::{IccError, Result};
use crate::icc::types::{TypeSignature, be_u16, be_u32};

/// Table size used when sampling a function
pub const DEFAULT_SAMPLES: usize = 256;

/// Curve tag data (curv type)
#[derive(Debug, Clone, PartialEq)]
pub enum CurveData {
    /// Identity curve (count = 0), equivalent to gamma 1.0
    Identity,
    /// Simple gamma (count = 1, value is u8Fixed8)
    Gamma(f64),
    /// Lookup table (count > 1, values are u16)
    Table(Vec<u16>),
}

impl CurveData {
    /// Parse curve data from bytes (after type signature and reserved bytes)
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 4 {
            return Err(IccError::CorruptedData("Curve tag too small".to_string()));
        }

        let count = be_u32(data, 0) as usize;

        match count {
            0 => Ok(CurveData::Identity),
            1 => {
                if data.len() < 6 {
                    return Err(IccError::CorruptedData(
                        "Curve gamma value missing".to_string(),
                    ));
                }
                Ok(CurveData::Gamma(be_u16(data, 4) as f64 / 256.0))
            }
            _ => {
                let required_len = count
                    .checked_mul(2)
                    .and_then(|n| n.checked_add(4))
                    .filter(|&n| n <= data.len())
                    .ok_or_else(|| {
                        IccError::CorruptedData(format!(
                            "Curve table too small: {} entries in {} bytes",
                            count,
                            data.len()
                        ))
                    })?;

                let table = data[4..required_len]
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                Ok(CurveData::Table(table))
            }
        }
    }

    /// Gamma exponent, if this curve is a pure power law
    pub fn gamma(&self) -> Option<f64> {
        match self {
            CurveData::Identity => Some(1.0),
            CurveData::Gamma(g) => Some(*g),
            CurveData::Table(_) => None,
        }
    }
}

impl fmt::Display for CurveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveData::Identity => f.write_str("{gamma: 1}"),
            CurveData::Gamma(g) => write!(f, "{{gamma: {}}}", g),
            CurveData::Table(table) => write!(f, "{:?}", table),
        }
    }
}

/// Function sampled over [0, 1] to build a curve table
pub type SampleFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// How to build a `curv` element
#[derive(Clone)]
pub enum CurveSpec {
    /// Count 0: linear response
    Linear,
    /// Count 1: gamma stored as `round(g * 256)`
    Gamma(f64),
    /// Count `n`: `f(i / (n - 1))` quantized as `round(f(x) * 65535)`.
    /// Encoding fails if any sample falls outside `[0, 1]`.
    Sampled { f: SampleFn, n: usize },
    /// Count `len`: samples written as given
    Table(Vec<u16>),
}

impl CurveSpec {
    /// Sample `f` at the default table size
    pub fn sampled<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        CurveSpec::Sampled {
            f: Arc::new(f),
            n: DEFAULT_SAMPLES,
        }
    }
}

impl fmt::Debug for CurveSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveSpec::Linear => f.write_str("Linear"),
            CurveSpec::Gamma(g) => f.debug_tuple("Gamma").field(g).finish(),
            CurveSpec::Sampled { n, .. } => f
                .debug_struct("Sampled")
                .field("n", n)
                .finish_non_exhaustive(),
            CurveSpec::Table(table) => f.debug_tuple("Table").field(&table.len()).finish(),
        }
    }
}

impl From<&CurveData> for CurveSpec {
    fn from(curve: &CurveData) -> Self {
        match curve {
            CurveData::Identity => CurveSpec::Linear,
            CurveData::Gamma(g) => CurveSpec::Gamma(*g),
            CurveData::Table(table) => CurveSpec::Table(table.clone()),
        }
    }
}

/// Shift the black point.
///
/// The returned function maps all of `[0, m]` to 0 and maps `[m, 1]`
/// linearly onto `[0, 1]`.
pub fn blackshift(m: f64) -> impl Fn(f64) -> f64 + Clone + Send + Sync + 'static {
    move |x: f64| {
        if x <= m {
            0.0
        } else {
            (x - m) / (1.0 - m)
        }
    }
}

pub(super) fn decode_curv(element: &[u8]) -> Result<TagValue> {
    let data = type_data(element, TypeSignature::CURVE)?;
    CurveData::parse(data).map(TagValue::Curve)
}

pub(super) fn encode_curv(input: &TagInput) -> Result<Vec<u8>> {
    let TagInput::Curve(spec) = input else {
        return Err(mismatched_input(TypeSignature::CURVE, input));
    };

    let invalid = |reason: String| IccError::InvalidInput {
        type_sig: TypeSignature::CURVE,
        reason,
    };

    match spec {
        CurveSpec::Linear => Ok(0u32.to_be_bytes().to_vec()),
        CurveSpec::Gamma(g) => {
            let raw = (g * 256.0).round();
            if !(0.0..=u16::MAX as f64).contains(&raw) {
                return Err(invalid(format!("gamma {} does not fit u8Fixed8", g)));
            }
            let mut out = 1u32.to_be_bytes().to_vec();
            out.extend_from_slice(&(raw as u16).to_be_bytes());
            Ok(out)
        }
        CurveSpec::Sampled { f, n } => {
            if *n < 2 {
                return Err(invalid(format!("table needs at least 2 samples, got {}", n)));
            }
            let m = (*n - 1) as f64;
            let table: Vec<u16> = (0..*n)
                .map(|i| {
                    let x = i as f64 / m;
                    let y = f(x);
                    if !(0.0..=1.0).contains(&y) {
                        return Err(invalid(format!("f({}) = {} is outside [0, 1]", x, y)));
                    }
                    Ok((y * 65535.0).round() as u16)
                })
                .collect::<Result<_>>()?;
            table_bytes(&table).ok_or_else(|| invalid("table too large".to_string()))
        }
        CurveSpec::Table(table) => {
            if table.len() < 2 {
                return Err(invalid(format!(
                    "table needs at least 2 samples, got {}",
                    table.len()
                )));
            }
            table_bytes(table).ok_or_else(|| invalid("table too large".to_string()))
        }
    }
}

fn table_bytes(table: &[u16]) -> Option<Vec<u8>> {
    let count = u32::try_from(table.len()).ok()?;
    let mut out = Vec::with_capacity(4 + table.len() * 2);
    out.extend_from_slice(&count.to_be_bytes());
    for v in table {
        out.extend_from_slice(&v.to_be_bytes());
    }
    Some(out)
}
