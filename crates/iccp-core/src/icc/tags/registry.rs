//! Type registry: type signature -> (decode, encode)
//!
//! Built once and never mutated, so one registry can back any number of
//! concurrent decodes and encodes. [`TypeRegistry::shared`] hands out the
//! standard registry; callers can also construct their own and hand it to
//! a [`Profile`](crate::Profile).

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use super::{ELEMENT_PREFIX_SIZE, TagInput, TagValue, curves, fixed, text, vcgt, xyz};
use crate::error::{IccError, Result};
use crate::icc::types::{TagSignature, TypeSignature};

/// Decode a whole tag element (type signature included)
pub type DecodeFn = fn(&[u8]) -> Result<TagValue>;

/// Encode the type-specific data of an element (no 8-byte prefix)
pub type EncodeFn = fn(&TagInput) -> Result<Vec<u8>>;

static STANDARD: LazyLock<Arc<TypeRegistry>> = LazyLock::new(|| Arc::new(TypeRegistry::standard()));

/// Most tags can hold only one or a few types. When encoding, each tag is
/// paired with a default type so callers need not name it. `None` marks
/// tags known to the ICC specification with no implied type here.
const DEFAULT_TAG_TYPES: &[(TagSignature, Option<TypeSignature>)] = &[
    (TagSignature::A2B0, Some(TypeSignature::LUT8)),
    (TagSignature::A2B1, Some(TypeSignature::LUT8)),
    (TagSignature::A2B2, Some(TypeSignature::LUT8)),
    (TagSignature::BLUE_COLORANT, Some(TypeSignature::XYZ)),
    (TagSignature::BLUE_TRC, Some(TypeSignature::CURVE)),
    (TagSignature::B2A0, Some(TypeSignature::LUT8)),
    (TagSignature::B2A1, Some(TypeSignature::LUT8)),
    (TagSignature::B2A2, Some(TypeSignature::LUT8)),
    (TagSignature::CALIBRATION_DATE, Some(TypeSignature::DATE_TIME)),
    (TagSignature::CHAR_TARGET, Some(TypeSignature::TEXT)),
    (TagSignature::CHAD, Some(TypeSignature::SF32)),
    (TagSignature::CHROMATICITY, Some(TypeSignature::CHRM)),
    (TagSignature::COPYRIGHT, Some(TypeSignature::DESC)),
    (TagSignature::CRD_INFO, Some(TypeSignature::CRDI)),
    (TagSignature::DMND, Some(TypeSignature::DESC)),
    (TagSignature::DMDD, Some(TypeSignature::DESC)),
    (TagSignature::DEVICE_SETTINGS, None),
    (TagSignature::GAMUT, Some(TypeSignature::LUT8)),
    (TagSignature::GRAY_TRC, Some(TypeSignature::CURVE)),
    (TagSignature::GREEN_COLORANT, Some(TypeSignature::XYZ)),
    (TagSignature::GREEN_TRC, Some(TypeSignature::CURVE)),
    (TagSignature::LUMINANCE, Some(TypeSignature::XYZ)),
    (TagSignature::MEASUREMENT, None),
    (TagSignature::MEDIA_BLACK, Some(TypeSignature::XYZ)),
    (TagSignature::MEDIA_WHITE, Some(TypeSignature::XYZ)),
    (TagSignature::NAMED_COLOR, None),
    (TagSignature::NAMED_COLOR2, None),
    (TagSignature::OUTPUT_RESPONSE, None),
    (TagSignature::PREVIEW0, Some(TypeSignature::LUT8)),
    (TagSignature::PREVIEW1, Some(TypeSignature::LUT8)),
    (TagSignature::PREVIEW2, Some(TypeSignature::LUT8)),
    (TagSignature::DESC, Some(TypeSignature::DESC)),
    (TagSignature::PROFILE_SEQUENCE, None),
    (TagSignature::PS2_CRD0, Some(TypeSignature::DATA)),
    (TagSignature::PS2_CRD1, Some(TypeSignature::DATA)),
    (TagSignature::PS2_CRD2, Some(TypeSignature::DATA)),
    (TagSignature::PS2_CRD3, Some(TypeSignature::DATA)),
    (TagSignature::PS2_CSA, Some(TypeSignature::DATA)),
    (TagSignature::PS2_INTENT, Some(TypeSignature::DATA)),
    (TagSignature::RED_COLORANT, Some(TypeSignature::XYZ)),
    (TagSignature::RED_TRC, Some(TypeSignature::CURVE)),
    (TagSignature::SCREENING_DESC, Some(TypeSignature::DESC)),
    (TagSignature::SCREENING, None),
    (TagSignature::TECH, Some(TypeSignature::SIG)),
    (TagSignature::BFD, None),
    (TagSignature::VIEW_COND_DESC, Some(TypeSignature::DESC)),
    (TagSignature::VIEW_COND, Some(TypeSignature::VIEW)),
];

/// Mapping from type signature to codec functions, plus the default type
/// of each tag signature
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    decoders: HashMap<TypeSignature, DecodeFn>,
    encoders: HashMap<TypeSignature, EncodeFn>,
    default_types: HashMap<TagSignature, Option<TypeSignature>>,
}

impl TypeRegistry {
    /// The standard set: `text`, `desc`, `XYZ `, `curv`, `sf32` and `vcgt`
    /// decode; `text`, `desc`, `XYZ `, `curv` and `sf32` encode.
    pub fn standard() -> Self {
        let decoders: HashMap<TypeSignature, DecodeFn> = HashMap::from([
            (TypeSignature::TEXT, text::decode_text as DecodeFn),
            (TypeSignature::DESC, text::decode_desc as DecodeFn),
            (TypeSignature::XYZ, xyz::decode_xyz as DecodeFn),
            (TypeSignature::CURVE, curves::decode_curv as DecodeFn),
            (TypeSignature::SF32, fixed::decode_sf32 as DecodeFn),
            (TypeSignature::VCGT, vcgt::decode_vcgt as DecodeFn),
        ]);
        let encoders: HashMap<TypeSignature, EncodeFn> = HashMap::from([
            (TypeSignature::TEXT, text::encode_text as EncodeFn),
            (TypeSignature::DESC, text::encode_desc as EncodeFn),
            (TypeSignature::XYZ, xyz::encode_xyz as EncodeFn),
            (TypeSignature::CURVE, curves::encode_curv as EncodeFn),
            (TypeSignature::SF32, fixed::encode_sf32 as EncodeFn),
        ]);

        Self {
            decoders,
            encoders,
            default_types: DEFAULT_TAG_TYPES.iter().copied().collect(),
        }
    }

    /// The process-wide standard registry
    pub fn shared() -> Arc<Self> {
        Arc::clone(&STANDARD)
    }

    /// A registry with no types at all; every tag stays raw
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
            encoders: HashMap::new(),
            default_types: HashMap::new(),
        }
    }

    /// Add or replace a decoder, consuming the registry
    pub fn with_decoder(mut self, type_sig: TypeSignature, decode: DecodeFn) -> Self {
        self.decoders.insert(type_sig, decode);
        self
    }

    /// Add or replace an encoder, consuming the registry
    pub fn with_encoder(mut self, type_sig: TypeSignature, encode: EncodeFn) -> Self {
        self.encoders.insert(type_sig, encode);
        self
    }

    /// Set the type implied for `tag` when encoding
    pub fn with_default_type(mut self, tag: TagSignature, type_sig: TypeSignature) -> Self {
        self.default_types.insert(tag, Some(type_sig));
        self
    }

    pub fn has_decoder(&self, type_sig: TypeSignature) -> bool {
        self.decoders.contains_key(&type_sig)
    }

    pub fn has_encoder(&self, type_sig: TypeSignature) -> bool {
        self.encoders.contains_key(&type_sig)
    }

    /// Dispatch on the element's type signature.
    ///
    /// `None` means no decoder is registered for the type; the tag is
    /// simply left undecoded.
    pub fn decode(&self, element: &[u8]) -> Option<Result<TagValue>> {
        let type_sig = TypeSignature::from_element(element)?;
        let Some(decode) = self.decoders.get(&type_sig) else {
            debug!("no decoder for type '{}'", type_sig);
            return None;
        };
        Some(decode(element))
    }

    /// Encode `input` as a full element: type signature, 4 zero bytes, data
    pub fn encode(&self, type_sig: TypeSignature, input: &TagInput) -> Result<Vec<u8>> {
        let encode = self
            .encoders
            .get(&type_sig)
            .ok_or(IccError::NoEncoder(type_sig))?;
        let data = encode(input)?;

        let mut element = Vec::with_capacity(ELEMENT_PREFIX_SIZE + data.len());
        element.extend_from_slice(&type_sig.to_bytes());
        element.extend_from_slice(&[0u8; 4]);
        element.extend_from_slice(&data);
        Ok(element)
    }

    /// The type implied for `tag`
    pub fn default_type(&self, tag: TagSignature) -> Result<TypeSignature> {
        self.default_types
            .get(&tag)
            .copied()
            .flatten()
            .ok_or(IccError::NoDefaultType(tag))
    }

    /// Encode `input` as a full element of `tag`'s default type
    pub fn encode_tag(&self, tag: TagSignature, input: &TagInput) -> Result<Vec<u8>> {
        let type_sig = self.default_type(tag)?;
        self.encode(type_sig, input)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icc::tags::CurveSpec;
    use crate::icc::types::D50;

    #[test]
    fn test_standard_registry_coverage() {
        let registry = TypeRegistry::standard();
        for sig in [
            TypeSignature::TEXT,
            TypeSignature::XYZ,
            TypeSignature::CURVE,
            TypeSignature::SF32,
            TypeSignature::VCGT,
        ] {
            assert!(registry.has_decoder(sig), "missing decoder for {}", sig);
        }
        assert!(!registry.has_encoder(TypeSignature::VCGT));
        assert!(!registry.has_decoder(TypeSignature::MLUC));
    }

    #[test]
    fn test_encode_prefixes_signature() {
        let registry = TypeRegistry::standard();
        let element = registry.encode(TypeSignature::XYZ, &TagInput::Xyz(D50)).unwrap();
        assert_eq!(&element[0..8], b"XYZ \0\0\0\0");
        assert_eq!(element.len(), 20);

        let element = registry
            .encode(TypeSignature::CURVE, &TagInput::Curve(CurveSpec::Linear))
            .unwrap();
        assert_eq!(element, b"curv\0\0\0\0\0\0\0\0");
    }

    #[test]
    fn test_encode_unknown_type() {
        let registry = TypeRegistry::standard();
        let err = registry
            .encode(TypeSignature::LUT8, &TagInput::from("x"))
            .unwrap_err();
        assert!(matches!(err, IccError::NoEncoder(sig) if sig == TypeSignature::LUT8));
    }

    #[test]
    fn test_default_types() {
        let registry = TypeRegistry::standard();
        assert_eq!(registry.default_type(TagSignature::MEDIA_WHITE).unwrap(), TypeSignature::XYZ);
        assert_eq!(registry.default_type(TagSignature::GRAY_TRC).unwrap(), TypeSignature::CURVE);
        assert_eq!(registry.default_type(TagSignature::COPYRIGHT).unwrap(), TypeSignature::DESC);
        assert_eq!(registry.default_type(TagSignature::CHAD).unwrap(), TypeSignature::SF32);
        assert_eq!(
            registry.default_type(TagSignature::CALIBRATION_DATE).unwrap(),
            TypeSignature::DATE_TIME
        );
        assert!(matches!(
            registry.default_type(TagSignature::MEASUREMENT),
            Err(IccError::NoDefaultType(_))
        ));
        assert!(matches!(
            registry.default_type(TagSignature::from_bytes(*b"zzzz")),
            Err(IccError::NoDefaultType(_))
        ));

        // calt implies dtim, which has no encoder
        let err = registry
            .encode_tag(TagSignature::CALIBRATION_DATE, &TagInput::from("2009"))
            .unwrap_err();
        assert!(matches!(err, IccError::NoEncoder(sig) if sig == TypeSignature::DATE_TIME));
    }

    #[test]
    fn test_decode_dispatch() {
        let registry = TypeRegistry::standard();
        let value = registry.decode(b"text\0\0\0\0hello\0").unwrap().unwrap();
        assert_eq!(value.as_text(), Some("hello"));

        assert!(registry.decode(b"mluc\0\0\0\0\0\0\0\0").is_none());
        assert!(registry.decode(b"ab").is_none());
    }

    #[test]
    fn test_custom_registry() {
        let registry = TypeRegistry::empty();
        assert!(registry.decode(b"text\0\0\0\0hello\0").is_none());

        fn decode_marker(_: &[u8]) -> Result<TagValue> {
            Ok(TagValue::Text("marker".to_string()))
        }
        let registry = registry.with_decoder(TypeSignature::MLUC, decode_marker);
        let value = registry.decode(b"mluc\0\0\0\0").unwrap().unwrap();
        assert_eq!(value.as_text(), Some("marker"));
    }
}
