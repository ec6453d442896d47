//! ICC Profile Header
//!
//! The ICC profile header is exactly 128 bytes and contains basic profile information.
//! See ICC.1:2004-10 Section 7.2.
//!
//! | Offset  | Field                    |
//! |---------|--------------------------|
//! | 0..4    | profile size             |
//! | 4..8    | preferred CMM            |
//! | 8..12   | version                  |
//! | 12..16  | device class             |
//! | 16..20  | color space              |
//! | 20..24  | PCS                      |
//! | 24..36  | creation date-time       |
//! | 36..40  | 'acsp'                   |
//! | 40..44  | platform                 |
//! | 44..48  | flags                    |
//! | 48..52  | device manufacturer      |
//! | 52..56  | device model             |
//! | 56..64  | device attributes        |
//! | 64..68  | rendering intent         |
//! | 68..80  | PCS illuminant           |
//! | 80..84  | creator                  |
//! | 84..100 | profile ID               |
//! | 100..128| reserved (zero)          |

use std::fmt;

use tracing::warn;

use super::types::{DateTimeNumber, Signature, XyzNumber, be_u32, D50};
use crate::error::{IccError, Result, StructuralWarning};

/// Size of the fixed header
pub const HEADER_SIZE: usize = 128;

/// Header plus the tag count that follows it
pub const MIN_PROFILE_SIZE: usize = HEADER_SIZE + 4;

/// Bytes of fixed fields before the reserved region
const FIXED_FIELDS_SIZE: usize = 84;

/// Profile version, rendered as 8 hex digits (`02100000` is v2.1.0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileVersion(pub u32);

impl ProfileVersion {
    /// Parse 8 hex digits, e.g. `"02000000"`
    pub fn from_hex(s: &str) -> Option<Self> {
        u32::from_str_radix(s, 16).ok().map(Self)
    }

    pub fn major(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn minor(&self) -> u8 {
        ((self.0 >> 20) & 0x0F) as u8
    }
}

impl Default for ProfileVersion {
    fn default() -> Self {
        Self(0x0200_0000)
    }
}

impl fmt::Display for ProfileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// ICC Profile Header (128 bytes)
///
/// `Default` yields the values written for fields a caller never set:
/// zero signatures, version `02000000`, PCS `XYZ `, 'acsp', D50 illuminant
/// and no creation date (stamped with the current time on encode).
#[derive(Debug, Clone, PartialEq)]
pub struct IccHeader {
    /// Profile size in bytes, as declared
    pub size: u32,
    /// Preferred CMM type signature
    pub preferred_cmm: Signature,
    pub version: ProfileVersion,
    /// Device class (scnr, mntr, prtr, ...)
    pub profile_class: Signature,
    /// Color space of data (RGB, GRAY, ...)
    pub colour_space: Signature,
    /// Profile connection space (XYZ or Lab)
    pub pcs: Signature,
    /// Date and time profile was created
    pub created: Option<DateTimeNumber>,
    /// Profile file signature (should be 'acsp')
    pub acsp: Signature,
    /// Primary platform signature
    pub platform: Signature,
    pub flags: u32,
    /// Device manufacturer signature
    pub manufacturer: Signature,
    pub model: u32,
    pub device_attributes: u64,
    /// Rendering intent, stored but not interpreted
    pub rendering_intent: u32,
    pub pcs_illuminant: XyzNumber,
    /// Profile creator signature
    pub creator: Signature,
    /// Profile ID (MD5 hash, or zero)
    pub profile_id: [u8; 16],
}

impl Default for IccHeader {
    fn default() -> Self {
        Self {
            size: 0,
            preferred_cmm: Signature::NONE,
            version: ProfileVersion::default(),
            profile_class: Signature::NONE,
            colour_space: Signature::NONE,
            pcs: Signature::XYZ,
            created: None,
            acsp: Signature::ACSP,
            platform: Signature::NONE,
            flags: 0,
            manufacturer: Signature::NONE,
            model: 0,
            device_attributes: 0,
            rendering_intent: 0,
            pcs_illuminant: D50,
            creator: Signature::NONE,
            profile_id: [0u8; 16],
        }
    }
}

impl IccHeader {
    /// Parse header from bytes.
    ///
    /// Anomalies that do not prevent decoding are pushed onto `warnings`.
    pub fn parse(data: &[u8], warnings: &mut Vec<StructuralWarning>) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let sig = |offset: usize| Signature(be_u32(data, offset));

        let size = be_u32(data, 0);
        if size as usize > data.len() {
            let warning = StructuralWarning::SizeMismatch {
                declared: size,
                actual: data.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let acsp = sig(36);
        if acsp != Signature::ACSP {
            let warning = StructuralWarning::MissingAcsp(acsp.0);
            warn!("{}", warning);
            warnings.push(warning);
        }

        let mut profile_id = [0u8; 16];
        profile_id.copy_from_slice(&data[84..100]);

        Ok(Self {
            size,
            preferred_cmm: sig(4),
            version: ProfileVersion(be_u32(data, 8)),
            profile_class: sig(12),
            colour_space: sig(16),
            pcs: sig(20),
            created: DateTimeNumber::from_bytes(&data[24..36]),
            acsp,
            platform: sig(40),
            flags: be_u32(data, 44),
            manufacturer: sig(48),
            model: be_u32(data, 52),
            device_attributes: u64::from_be_bytes([
                data[56], data[57], data[58], data[59], data[60], data[61], data[62], data[63],
            ]),
            rendering_intent: be_u32(data, 64),
            pcs_illuminant: XyzNumber::from_bytes(&data[68..80]).unwrap_or_default(),
            creator: sig(80),
            profile_id,
        })
    }

    /// Serialize into the fixed 128-byte layout.
    ///
    /// `total_size` goes into the size field; an unset creation date is
    /// stamped with the current UTC time.
    pub fn encode(&self, total_size: u32) -> [u8; HEADER_SIZE] {
        let created = self.created.unwrap_or_else(DateTimeNumber::now);

        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.extend_from_slice(&total_size.to_be_bytes());
        out.extend_from_slice(&self.preferred_cmm.to_bytes());
        out.extend_from_slice(&self.version.0.to_be_bytes());
        out.extend_from_slice(&self.profile_class.to_bytes());
        out.extend_from_slice(&self.colour_space.to_bytes());
        out.extend_from_slice(&self.pcs.to_bytes());
        out.extend_from_slice(&created.to_bytes());
        out.extend_from_slice(&self.acsp.to_bytes());
        out.extend_from_slice(&self.platform.to_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.manufacturer.to_bytes());
        out.extend_from_slice(&self.model.to_be_bytes());
        out.extend_from_slice(&self.device_attributes.to_be_bytes());
        out.extend_from_slice(&self.rendering_intent.to_be_bytes());
        out.extend_from_slice(&self.pcs_illuminant.to_bytes());
        out.extend_from_slice(&self.creator.to_bytes());
        debug_assert_eq!(out.len(), FIXED_FIELDS_SIZE);

        // 44 reserved bytes; the profile ID occupies the first 16
        let mut header = [0u8; HEADER_SIZE];
        header[..FIXED_FIELDS_SIZE].copy_from_slice(&out);
        header[FIXED_FIELDS_SIZE..FIXED_FIELDS_SIZE + 16].copy_from_slice(&self.profile_id);
        header
    }

    /// Header fields as `(name, rendered value)` pairs, in layout order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let id: String = self.profile_id.iter().map(|b| format!("{:02x}", b)).collect();
        vec![
            ("size", self.size.to_string()),
            ("preferredCMM", self.preferred_cmm.to_string()),
            ("version", self.version.to_string()),
            ("profileclass", self.profile_class.to_string()),
            ("colourspace", self.colour_space.to_string()),
            ("pcs", self.pcs.to_string()),
            (
                "created",
                self.created
                    .map_or_else(|| "unset".to_string(), |t| t.to_string()),
            ),
            ("acsp", self.acsp.to_string()),
            ("platform", self.platform.to_string()),
            ("flag", self.flags.to_string()),
            ("manufacturer", self.manufacturer.to_string()),
            ("model", self.model.to_string()),
            ("deviceattributes", format!("0x{:016x}", self.device_attributes)),
            ("intent", self.rendering_intent.to_string()),
            ("pcsilluminant", self.pcs_illuminant.to_string()),
            ("creator", self.creator.to_string()),
            ("id", id),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_header() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0..4].copy_from_slice(&128u32.to_be_bytes());
        data[8..12].copy_from_slice(&0x0430_0000u32.to_be_bytes());
        data[12..16].copy_from_slice(b"mntr");
        data[16..20].copy_from_slice(b"RGB ");
        data[20..24].copy_from_slice(b"XYZ ");
        data[24..36].copy_from_slice(&[0x07, 0xD9, 0, 3, 0, 27, 0, 21, 0, 36, 0, 31]);
        data[36..40].copy_from_slice(b"acsp");
        data[64..68].copy_from_slice(&1u32.to_be_bytes());
        data
    }

    #[test]
    fn test_parse_header_fields() {
        let mut warnings = Vec::new();
        let header = IccHeader::parse(&minimal_header(), &mut warnings).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(header.size, 128);
        assert_eq!(header.version.to_string(), "04300000");
        assert_eq!(header.version.major(), 4);
        assert_eq!(header.version.minor(), 3);
        assert_eq!(header.profile_class, Signature::DISPLAY_CLASS);
        assert_eq!(header.colour_space, Signature::RGB);
        assert_eq!(header.pcs, Signature::XYZ);
        assert_eq!(header.created.unwrap().to_string(), "2009-03-27T21:36:31Z");
        assert_eq!(header.rendering_intent, 1);
    }

    #[test]
    fn test_header_too_small() {
        let mut warnings = Vec::new();
        let result = IccHeader::parse(&[0u8; 100], &mut warnings);
        assert!(matches!(
            result,
            Err(IccError::TooSmall {
                expected: 128,
                actual: 100
            })
        ));
    }

    #[test]
    fn test_missing_acsp_is_a_warning() {
        let mut data = minimal_header();
        data[36..40].copy_from_slice(b"nope");

        let mut warnings = Vec::new();
        let header = IccHeader::parse(&data, &mut warnings).unwrap();
        assert_eq!(header.colour_space, Signature::RGB);
        assert_eq!(
            warnings,
            vec![StructuralWarning::MissingAcsp(u32::from_be_bytes(*b"nope"))]
        );
    }

    #[test]
    fn test_declared_size_exceeds_buffer() {
        let mut data = minimal_header();
        data[0..4].copy_from_slice(&4096u32.to_be_bytes());

        let mut warnings = Vec::new();
        IccHeader::parse(&data, &mut warnings).unwrap();
        assert_eq!(
            warnings,
            vec![StructuralWarning::SizeMismatch {
                declared: 4096,
                actual: 128
            }]
        );
    }

    #[test]
    fn test_encode_defaults() {
        let header = IccHeader::default();
        let bytes = header.encode(132);

        assert_eq!(&bytes[0..4], &132u32.to_be_bytes());
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[0x02, 0, 0, 0]);
        assert_eq!(&bytes[20..24], b"XYZ ");
        assert_eq!(&bytes[36..40], b"acsp");
        assert_eq!(&bytes[68..80], &[0, 0, 0xF6, 0xD6, 0, 1, 0, 0, 0, 0, 0xD3, 0x2D]);
        assert!(bytes[84..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        let mut warnings = Vec::new();
        let header = IccHeader::parse(&minimal_header(), &mut warnings).unwrap();
        let mut with_id = header.clone();
        with_id.profile_id = [0xAB; 16];

        let bytes = with_id.encode(128);
        let back = IccHeader::parse(&bytes, &mut warnings).unwrap();
        assert_eq!(back, with_id);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_version_from_hex() {
        assert_eq!(ProfileVersion::from_hex("02100000"), Some(ProfileVersion(0x0210_0000)));
        assert_eq!(ProfileVersion::from_hex("zz"), None);
    }
}
