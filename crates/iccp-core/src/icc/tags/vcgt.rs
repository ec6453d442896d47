//! Apple Video Card Gamma Tag (vcgt)
//!
//! Non-standard, but widespread in profiles written by ColorSync. The
//! element carries a table to load into the video card LUT.
//!
//! ```text
//! 0..4    'vcgt'
//! 4..8    reserved
//! 8..12   gamma type (0 = table, 1 = formula)
//! 12..14  channel count        \
//! 14..16  entries per channel   | table form only
//! 16..18  entry size (1 or 2)  /
//! 18..    samples, channel-major
//! ```

use std::fmt;

use tracing::debug;

use super::{TagValue, type_data};
use crate::error::{IccError, Result};
use crate::icc::types::{TypeSignature, be_u16, be_u32};

const TABLE_TYPE: u32 = 0;

/// Decoded video card gamma data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcgtData {
    /// Formula form or an unsupported table layout, from byte 8 on
    Opaque(Vec<u8>),
    /// Per-channel ramps
    Table {
        /// Bytes per sample (1 or 2)
        entry_size: u16,
        channels: Vec<Vec<u16>>,
    },
}

impl fmt::Display for VcgtData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcgtData::Opaque(data) => write!(f, "vcgt opaque ({} bytes)", data.len()),
            VcgtData::Table {
                entry_size,
                channels,
            } => write!(f, "({}, {:?})", entry_size, channels),
        }
    }
}

/// Decode a `vcgt` element.
///
/// Table samples past the declared size are ignored. A table shorter than
/// declared yields only the channels it holds in full.
pub(super) fn decode_vcgt(element: &[u8]) -> Result<TagValue> {
    let data = type_data(element, TypeSignature::VCGT)?;
    if data.len() < 4 {
        return Err(IccError::CorruptedData("vcgt tag too small".to_string()));
    }

    let opaque = || TagValue::VideoCardGamma(VcgtData::Opaque(data.to_vec()));

    if be_u32(data, 0) != TABLE_TYPE {
        return Ok(opaque());
    }
    if data.len() < 10 {
        return Err(IccError::CorruptedData(
            "vcgt table header truncated".to_string(),
        ));
    }

    let channel_count = be_u16(data, 4) as usize;
    let entry_count = be_u16(data, 6) as usize;
    let entry_size = be_u16(data, 8);
    if entry_size != 1 && entry_size != 2 {
        return Ok(opaque());
    }

    let samples = &data[10..];
    let needed = channel_count
        .checked_mul(entry_count)
        .and_then(|n| n.checked_mul(entry_size as usize))
        .ok_or_else(|| {
            IccError::CorruptedData(format!(
                "vcgt table size overflows: {} x {} x {}",
                channel_count, entry_count, entry_size
            ))
        })?;
    // A short table keeps the complete channels it has
    let available = needed.min(samples.len() - samples.len() % entry_size as usize);
    if available < needed {
        debug!("vcgt table needs {} bytes, has {}", needed, samples.len());
    }

    let flat: Vec<u16> = match entry_size {
        1 => samples[..available].iter().map(|&b| b as u16).collect(),
        _ => samples[..available]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect(),
    };

    let channels = if entry_count == 0 {
        vec![Vec::new(); channel_count]
    } else {
        flat.chunks_exact(entry_count).map(<[u16]>::to_vec).collect()
    };

    Ok(TagValue::VideoCardGamma(VcgtData::Table {
        entry_size,
        channels,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_element(channels: u16, entries: u16, size: u16, samples: &[u8]) -> Vec<u8> {
        let mut out = b"vcgt\0\0\0\0".to_vec();
        out.extend_from_slice(&TABLE_TYPE.to_be_bytes());
        out.extend_from_slice(&channels.to_be_bytes());
        out.extend_from_slice(&entries.to_be_bytes());
        out.extend_from_slice(&size.to_be_bytes());
        out.extend_from_slice(samples);
        out
    }

    #[test]
    fn test_formula_is_opaque() {
        let mut element = b"vcgt\0\0\0\0".to_vec();
        element.extend_from_slice(&1u32.to_be_bytes());
        element.extend_from_slice(&[9; 36]);

        let tag = decode_vcgt(&element).unwrap();
        match tag.as_vcgt().unwrap() {
            VcgtData::Opaque(data) => {
                assert_eq!(data.len(), 40);
                assert_eq!(&data[0..4], &1u32.to_be_bytes());
            }
            other => panic!("Expected opaque vcgt, got {:?}", other),
        }
    }

    #[test]
    fn test_one_byte_table() {
        let element = table_element(2, 3, 1, &[0, 128, 255, 10, 20, 30, 0]);
        let tag = decode_vcgt(&element).unwrap();
        assert_eq!(
            tag.as_vcgt(),
            Some(&VcgtData::Table {
                entry_size: 1,
                channels: vec![vec![0, 128, 255], vec![10, 20, 30]],
            })
        );
    }

    #[test]
    fn test_odd_entry_size_is_opaque() {
        let element = table_element(3, 2, 4, &[0; 24]);
        assert!(matches!(
            decode_vcgt(&element).unwrap().as_vcgt(),
            Some(VcgtData::Opaque(data)) if data.len() == 10 + 24
        ));
    }

    #[test]
    fn test_truncated_table() {
        // Two full channels of 4 entries, then half of the third
        let samples: Vec<u8> = (0..20).collect();
        let element = table_element(3, 4, 2, &samples);
        let tag = decode_vcgt(&element).unwrap();
        assert_eq!(
            tag.as_vcgt(),
            Some(&VcgtData::Table {
                entry_size: 2,
                channels: vec![
                    vec![0x0001, 0x0203, 0x0405, 0x0607],
                    vec![0x0809, 0x0a0b, 0x0c0d, 0x0e0f],
                ],
            })
        );

        let element = table_element(3, 256, 2, &[0; 100]);
        assert_eq!(
            decode_vcgt(&element).unwrap().as_vcgt(),
            Some(&VcgtData::Table {
                entry_size: 2,
                channels: Vec::new(),
            })
        );
    }

    #[test]
    fn test_largest_declared_table() {
        let element = table_element(u16::MAX, u16::MAX, 2, &[7; 6]);
        match decode_vcgt(&element) {
            Ok(tag) => assert_eq!(
                tag.as_vcgt(),
                Some(&VcgtData::Table {
                    entry_size: 2,
                    channels: Vec::new(),
                })
            ),
            Err(e) => assert!(matches!(e, IccError::CorruptedData(_))),
        }
    }
}
