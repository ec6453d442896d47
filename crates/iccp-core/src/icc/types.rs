//! ICC Profile Basic Types
//!
//! Signatures and the numeric encodings shared by the header and the tag
//! decoders: s15Fixed16Number, XYZNumber and dateTimeNumber.

use std::fmt;

use chrono::{Datelike, Timelike, Utc};

/// Render a 4-byte signature as text, replacing non-ASCII bytes
fn signature_string(val: u32) -> String {
    val.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect()
}

/// ICC Tag Signature (4-byte ASCII code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagSignature(pub u32);

impl TagSignature {
    /// Create from 4 ASCII characters
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const A2B0: Self = Self::from_bytes(*b"A2B0");
    pub const A2B1: Self = Self::from_bytes(*b"A2B1");
    pub const A2B2: Self = Self::from_bytes(*b"A2B2");
    pub const B2A0: Self = Self::from_bytes(*b"B2A0");
    pub const B2A1: Self = Self::from_bytes(*b"B2A1");
    pub const B2A2: Self = Self::from_bytes(*b"B2A2");
    pub const BFD: Self = Self::from_bytes(*b"bfd ");
    pub const BLUE_COLORANT: Self = Self::from_bytes(*b"bXYZ");
    pub const BLUE_TRC: Self = Self::from_bytes(*b"bTRC");
    pub const CALIBRATION_DATE: Self = Self::from_bytes(*b"calt");
    pub const CHAR_TARGET: Self = Self::from_bytes(*b"targ");
    pub const CHAD: Self = Self::from_bytes(*b"chad");
    pub const CHROMATICITY: Self = Self::from_bytes(*b"chrm");
    pub const COPYRIGHT: Self = Self::from_bytes(*b"cprt");
    pub const CRD_INFO: Self = Self::from_bytes(*b"crdi");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const DEVICE_SETTINGS: Self = Self::from_bytes(*b"devs");
    pub const DMDD: Self = Self::from_bytes(*b"dmdd");
    pub const DMND: Self = Self::from_bytes(*b"dmnd");
    pub const GAMUT: Self = Self::from_bytes(*b"gamt");
    pub const GRAY_TRC: Self = Self::from_bytes(*b"kTRC");
    pub const GREEN_COLORANT: Self = Self::from_bytes(*b"gXYZ");
    pub const GREEN_TRC: Self = Self::from_bytes(*b"gTRC");
    pub const LUMINANCE: Self = Self::from_bytes(*b"lumi");
    pub const MEASUREMENT: Self = Self::from_bytes(*b"meas");
    pub const MEDIA_BLACK: Self = Self::from_bytes(*b"bkpt");
    pub const MEDIA_WHITE: Self = Self::from_bytes(*b"wtpt");
    pub const NAMED_COLOR: Self = Self::from_bytes(*b"ncol");
    pub const NAMED_COLOR2: Self = Self::from_bytes(*b"ncl2");
    pub const OUTPUT_RESPONSE: Self = Self::from_bytes(*b"resp");
    pub const PREVIEW0: Self = Self::from_bytes(*b"pre0");
    pub const PREVIEW1: Self = Self::from_bytes(*b"pre1");
    pub const PREVIEW2: Self = Self::from_bytes(*b"pre2");
    pub const PROFILE_SEQUENCE: Self = Self::from_bytes(*b"pseq");
    pub const PS2_CRD0: Self = Self::from_bytes(*b"psd0");
    pub const PS2_CRD1: Self = Self::from_bytes(*b"psd1");
    pub const PS2_CRD2: Self = Self::from_bytes(*b"psd2");
    pub const PS2_CRD3: Self = Self::from_bytes(*b"psd3");
    pub const PS2_CSA: Self = Self::from_bytes(*b"ps2s");
    pub const PS2_INTENT: Self = Self::from_bytes(*b"ps2i");
    pub const RED_COLORANT: Self = Self::from_bytes(*b"rXYZ");
    pub const RED_TRC: Self = Self::from_bytes(*b"rTRC");
    pub const SCREENING_DESC: Self = Self::from_bytes(*b"scrd");
    pub const SCREENING: Self = Self::from_bytes(*b"scrn");
    pub const TECH: Self = Self::from_bytes(*b"tech");
    pub const VCGT: Self = Self::from_bytes(*b"vcgt");
    pub const VIEW_COND_DESC: Self = Self::from_bytes(*b"vued");
    pub const VIEW_COND: Self = Self::from_bytes(*b"view");
}

impl fmt::Display for TagSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&signature_string(self.0))
    }
}

/// Type signatures for ICC tag data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSignature(pub u32);

impl TypeSignature {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// Read the type signature at the start of a tag element.
    ///
    /// Trailing whitespace is trimmed and the result re-padded with
    /// spaces, so `"XYZ "` and `"XYZ\t"` both look up as `XYZ`.
    pub fn from_element(element: &[u8]) -> Option<Self> {
        let raw = element.get(..4)?;
        let mut sig = [b' '; 4];
        let end = raw
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(0, |i| i + 1);
        sig[..end].copy_from_slice(&raw[..end]);
        Some(Self::from_bytes(sig))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const CURVE: Self = Self::from_bytes(*b"curv");
    pub const TEXT: Self = Self::from_bytes(*b"text");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const MLUC: Self = Self::from_bytes(*b"mluc");
    pub const SF32: Self = Self::from_bytes(*b"sf32");
    pub const VCGT: Self = Self::from_bytes(*b"vcgt");
    pub const LUT8: Self = Self::from_bytes(*b"mft1");
    pub const DATE_TIME: Self = Self::from_bytes(*b"dtim");
    pub const SIG: Self = Self::from_bytes(*b"sig ");
    pub const CHRM: Self = Self::from_bytes(*b"chrm");
    pub const CRDI: Self = Self::from_bytes(*b"crdi");
    pub const DATA: Self = Self::from_bytes(*b"data");
    pub const VIEW: Self = Self::from_bytes(*b"view");
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&signature_string(self.0))
    }
}

/// A 4-byte header signature (device class, color space, platform, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(pub u32);

impl Signature {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Four zero bytes, the encoding of an unset signature
    pub const NONE: Self = Self(0);
    pub const ACSP: Self = Self::from_bytes(*b"acsp");
    pub const INPUT_CLASS: Self = Self::from_bytes(*b"scnr");
    pub const DISPLAY_CLASS: Self = Self::from_bytes(*b"mntr");
    pub const OUTPUT_CLASS: Self = Self::from_bytes(*b"prtr");
    pub const GRAY: Self = Self::from_bytes(*b"GRAY");
    pub const RGB: Self = Self::from_bytes(*b"RGB ");
    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const LAB: Self = Self::from_bytes(*b"Lab ");
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0x00000000");
        }
        f.write_str(&signature_string(self.0))
    }
}

/// Read a big-endian u16 at `offset`. Callers check bounds first.
#[inline]
pub(crate) fn be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Read a big-endian u32 at `offset`. Callers check bounds first.
#[inline]
pub(crate) fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// s15Fixed16Number - 16.16 fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S15Fixed16(pub i32);

impl S15Fixed16 {
    /// Create from raw i32 value
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Create from f64 value, rounding to nearest.
    ///
    /// Values outside the s15.16 range wrap as 32-bit two's complement.
    pub fn from_f64(val: f64) -> Self {
        Self((val * 65536.0).round() as i64 as i32)
    }

    /// Convert to f64
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    /// Parse from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

/// `round(x * 65536)` as a signed 32-bit integer
pub fn encode_fixed16(x: f64) -> i32 {
    S15Fixed16::from_f64(x).0
}

/// `i / 65536`
pub fn decode_fixed16(i: i32) -> f64 {
    S15Fixed16::from_raw(i).to_f64()
}

/// Decode a run of big-endian s15Fixed16 values; a trailing partial value is ignored
pub fn read_fixed16_array(data: &[u8]) -> Vec<f64> {
    data.chunks_exact(4)
        .map(|c| S15Fixed16::from_be_bytes([c[0], c[1], c[2], c[3]]).to_f64())
        .collect()
}

/// Encode values as consecutive big-endian s15Fixed16 numbers
pub fn write_fixed16_array(values: &[f64]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|&v| S15Fixed16::from_f64(v).to_be_bytes())
        .collect()
}

/// D50 illuminant as an (X, Y, Z) triple, ICC.1:2001 A.1
pub const D50: XyzNumber = XyzNumber::new(0.9642, 1.0000, 0.8249);

/// XYZNumber - ICC XYZ value (3 × s15Fixed16)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XyzNumber {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl XyzNumber {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Parse from 12 bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 12 {
            return None;
        }
        Some(Self {
            x: decode_fixed16(be_u32(bytes, 0) as i32),
            y: decode_fixed16(be_u32(bytes, 4) as i32),
            z: decode_fixed16(be_u32(bytes, 8) as i32),
        })
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&encode_fixed16(self.x).to_be_bytes());
        out[4..8].copy_from_slice(&encode_fixed16(self.y).to_be_bytes());
        out[8..12].copy_from_slice(&encode_fixed16(self.z).to_be_bytes());
        out
    }
}

impl fmt::Display for XyzNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.4})", self.x, self.y, self.z)
    }
}

/// dateTimeNumber - ICC date/time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTimeNumber {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl DateTimeNumber {
    /// Current UTC time
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            year: now.year() as u16,
            month: now.month() as u16,
            day: now.day() as u16,
            hour: now.hour() as u16,
            minute: now.minute() as u16,
            second: now.second() as u16,
        }
    }

    /// Parse from 12 bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 12 {
            return None;
        }
        Some(Self {
            year: be_u16(bytes, 0),
            month: be_u16(bytes, 2),
            day: be_u16(bytes, 4),
            hour: be_u16(bytes, 6),
            minute: be_u16(bytes, 8),
            second: be_u16(bytes, 10),
        })
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        let fields = [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ];
        for (chunk, field) in out.chunks_exact_mut(2).zip(fields) {
            chunk.copy_from_slice(&field.to_be_bytes());
        }
        out
    }
}

/// ISO 8601, `YYYY-MM-DDTHH:MM:SSZ`
impl fmt::Display for DateTimeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Encode a date-time as 12 bytes; `None` stamps the current UTC time
pub fn encode_date_time(t: Option<DateTimeNumber>) -> [u8; 12] {
    t.unwrap_or_else(DateTimeNumber::now).to_bytes()
}

/// Render 12 bytes of dateTimeNumber as an ISO 8601 string
pub fn decode_date_time(bytes: &[u8; 12]) -> String {
    DateTimeNumber::from_bytes(bytes)
        .unwrap_or_default()
        .to_string()
}

/// Encode an XYZ triple as three s15Fixed16 values
pub fn encode_xyz(x: f64, y: f64, z: f64) -> [u8; 12] {
    XyzNumber::new(x, y, z).to_bytes()
}

/// Decode three s15Fixed16 values
pub fn decode_xyz(bytes: &[u8; 12]) -> (f64, f64, f64) {
    let xyz = XyzNumber::from_bytes(bytes).unwrap_or_default();
    (xyz.x, xyz.y, xyz.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s15fixed16() {
        let one = S15Fixed16::from_f64(1.0);
        assert_eq!(one.0, 0x0001_0000);
        assert!((one.to_f64() - 1.0).abs() < 1e-9);

        let half = S15Fixed16::from_f64(0.5);
        assert!((half.to_f64() - 0.5).abs() < 1e-9);

        let neg = S15Fixed16::from_f64(-1.5);
        assert_eq!(neg.to_be_bytes(), [0xFF, 0xFE, 0x80, 0x00]);
        assert!((neg.to_f64() - (-1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_fixed16_rounds_to_nearest() {
        // 0.9642 * 65536 = 63189.8
        assert_eq!(encode_fixed16(0.9642), 63190);
        assert_eq!(encode_fixed16(0.8249), 54061);
    }

    #[test]
    fn test_fixed16_wraps_out_of_range() {
        // 32768.0 * 65536 = 2^31, one past i32::MAX
        assert_eq!(encode_fixed16(32768.0), i32::MIN);
    }

    #[test]
    fn test_xyz_number() {
        // D50 white point in ICC encoding
        let bytes: [u8; 12] = [
            0x00, 0x00, 0xF6, 0xD6, // X = 0.9642
            0x00, 0x01, 0x00, 0x00, // Y = 1.0
            0x00, 0x00, 0xD3, 0x2D, // Z = 0.8249
        ];
        let (x, y, z) = decode_xyz(&bytes);

        assert!((x - 0.9642).abs() < 0.001);
        assert!((y - 1.0).abs() < 1e-9);
        assert!((z - 0.8249).abs() < 0.001);
        assert!(XyzNumber::from_bytes(&bytes[..8]).is_none());
    }

    #[test]
    fn test_date_time() {
        let t = DateTimeNumber {
            year: 2009,
            month: 3,
            day: 27,
            hour: 21,
            minute: 36,
            second: 31,
        };
        let bytes = encode_date_time(Some(t));
        assert_eq!(&bytes[0..2], &2009u16.to_be_bytes());
        assert_eq!(decode_date_time(&bytes), "2009-03-27T21:36:31Z");
    }

    #[test]
    fn test_date_time_defaults_to_now() {
        let bytes = encode_date_time(None);
        let t = DateTimeNumber::from_bytes(&bytes).unwrap();
        assert!(t.year >= 2024);
        assert!((1..=12).contains(&t.month));
    }

    #[test]
    fn test_tag_signature() {
        assert_eq!(TagSignature::DESC.to_string(), "desc");
        assert_eq!(TagSignature::RED_COLORANT.to_string(), "rXYZ");
        assert_eq!(Signature::NONE.to_string(), "0x00000000");
    }

    #[test]
    fn test_type_signature_trims_padding() {
        assert_eq!(TypeSignature::from_element(b"XYZ \0\0\0\0"), Some(TypeSignature::XYZ));
        assert_eq!(TypeSignature::from_element(b"XYZ\t"), Some(TypeSignature::XYZ));
        assert_eq!(TypeSignature::from_element(b"curv"), Some(TypeSignature::CURVE));
        assert_eq!(TypeSignature::from_element(b"cu"), None);
    }
}
