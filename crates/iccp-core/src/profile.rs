//! ICC Profile aggregate
//!
//! Owns the header, the raw tag elements and the tags decoded from them.
//! Decoding runs header -> tag table -> type registry; encoding runs the
//! other way and concatenates the header with the tag block.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::container::ProfileContainer;
use crate::error::{IccError, Result, StructuralWarning};
use crate::icc::header::{HEADER_SIZE, IccHeader};
use crate::icc::tag_table::{RawTags, SignatureMap, encode_tag_table, parse_tag_table};
use crate::icc::tags::{TagInput, TagValue, TypeRegistry};
use crate::icc::types::{Signature, TagSignature, TypeSignature, be_u32};

/// Name given to profiles whose source did not supply one
pub const UNKNOWN_NAME: &str = "<unknown>";

const DEFAULT_COPYRIGHT: &str = "Copyright unknown.";
const DEFAULT_DESCRIPTION: &str = concat!("created by iccp ", env!("CARGO_PKG_VERSION"));

/// An ICC profile
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use iccp_core::{CurveSpec, Profile, TagSignature, blackshift};
///
/// let mut profile = Profile::new();
/// profile.greyscale_input();
/// profile.add_tags([(
///     TagSignature::GRAY_TRC,
///     CurveSpec::Sampled { f: Arc::new(blackshift(0.07)), n: 256 },
/// )])?;
///
/// let bytes = profile.to_bytes()?;
/// let back = Profile::from_bytes(&bytes)?;
/// assert_eq!(back.header.colour_space, profile.header.colour_space);
/// # Ok::<(), iccp_core::IccError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Profile {
    /// Header fields; unset ones take their documented defaults on encode
    pub header: IccHeader,
    raw_tags: RawTags,
    tags: SignatureMap<TagValue>,
    warnings: Vec<StructuralWarning>,
    name: String,
    registry: Arc<TypeRegistry>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}

impl Profile {
    /// An empty profile backed by the standard type registry
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::shared())
    }

    /// An empty profile backed by `registry`
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            header: IccHeader::default(),
            raw_tags: RawTags::new(),
            tags: SignatureMap::new(),
            warnings: Vec::new(),
            name: UNKNOWN_NAME.to_string(),
            registry,
        }
    }

    /// Decode a profile from a complete buffer
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_registry(data, TypeRegistry::shared())
    }

    /// Decode a profile, dispatching tag types through `registry`.
    ///
    /// Fails if the buffer cannot hold the header, tag count and
    /// directory. Anything less severe is recorded in [`warnings`](Self::warnings).
    pub fn from_bytes_with_registry(data: &[u8], registry: Arc<TypeRegistry>) -> Result<Self> {
        let mut warnings = Vec::new();
        let header = IccHeader::parse(data, &mut warnings)?;
        let raw_tags = parse_tag_table(data, &mut warnings)?;

        let mut profile = Self {
            header,
            raw_tags,
            tags: SignatureMap::new(),
            warnings,
            name: UNKNOWN_NAME.to_string(),
            registry,
        };
        profile.rebuild_tags();
        debug!(
            "decoded profile: {} tags, {} decoded, {} warnings",
            profile.raw_tags.len(),
            profile.tags.len(),
            profile.warnings.len()
        );
        Ok(profile)
    }

    /// Read a profile from a stream.
    ///
    /// Reads the header, then as many further bytes as it declares.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::with_capacity(HEADER_SIZE);
        (&mut reader)
            .take(HEADER_SIZE as u64)
            .read_to_end(&mut data)?;
        if data.len() < HEADER_SIZE {
            return Err(IccError::TooSmall {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let size = be_u32(&data, 0) as u64;
        reader
            .take(size.saturating_sub(HEADER_SIZE as u64))
            .read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Decode the profile a container carries, if it carries one
    pub fn from_container<C: ProfileContainer + ?Sized>(container: &C) -> Result<Option<Self>> {
        container
            .extract_profile_bytes()
            .map(Self::from_bytes)
            .transpose()
    }

    /// Encode this profile and hand it to `container`
    pub fn embed_into<C: ProfileContainer + ?Sized>(&self, container: &mut C) -> Result<()> {
        container.embed_profile_bytes(self.to_bytes()?);
        Ok(())
    }

    /// Display name; informational only
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Anomalies found while decoding
    pub fn warnings(&self) -> &[StructuralWarning] {
        &self.warnings
    }

    /// Tag elements as stored, type signature included
    pub fn raw_tags(&self) -> &RawTags {
        &self.raw_tags
    }

    pub fn raw_tag(&self, sig: TagSignature) -> Option<&[u8]> {
        self.raw_tags.get(sig).map(Vec::as_slice)
    }

    /// Tags whose type has a registered decoder
    pub fn tags(&self) -> &SignatureMap<TagValue> {
        &self.tags
    }

    pub fn tag(&self, sig: TagSignature) -> Option<&TagValue> {
        self.tags.get(sig)
    }

    /// Store a decoded value directly.
    ///
    /// Only consulted by [`to_bytes`](Self::to_bytes) while the profile has
    /// no raw tags; otherwise the raw elements are what gets written.
    pub fn insert_tag(&mut self, sig: TagSignature, value: TagValue) -> &mut Self {
        self.tags.set(sig, value);
        self
    }

    /// Re-derive the decoded tags from the raw elements
    pub fn rebuild_tags(&mut self) {
        self.tags.clear();
        self.warnings
            .retain(|w| !matches!(w, StructuralWarning::UndecodableTag { .. }));

        for (sig, element) in self.raw_tags.iter() {
            match self.registry.decode(element) {
                Some(Ok(value)) => self.tags.set(sig, value),
                Some(Err(e)) => {
                    let warning = StructuralWarning::UndecodableTag {
                        tag: sig,
                        reason: e.to_string(),
                    };
                    warn!("{}", warning);
                    self.warnings.push(warning);
                }
                None => debug!("tag '{}' kept raw", sig),
            }
        }
    }

    /// Mark this as a greyscale input device profile:
    /// class 'scnr', color space 'GRAY', PCS 'XYZ '.
    pub fn greyscale_input(&mut self) -> &mut Self {
        self.header.profile_class = Signature::INPUT_CLASS;
        self.header.colour_space = Signature::GRAY;
        self.header.pcs = Signature::XYZ;
        self
    }

    /// Encode and store tags using each signature's default type.
    ///
    /// The first time tags are added to a profile with none, a copyright
    /// and a description tag are added as well. A tag already present is
    /// replaced in place. Every tag is encoded before any is stored, so on
    /// error the profile is left unchanged.
    pub fn add_tags<I, T>(&mut self, tags: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (TagSignature, T)>,
        T: Into<TagInput>,
    {
        let mut encoded = Vec::new();
        if self.raw_tags.is_empty() {
            for (sig, text) in [
                (TagSignature::COPYRIGHT, DEFAULT_COPYRIGHT),
                (TagSignature::DESC, DEFAULT_DESCRIPTION),
            ] {
                encoded.push((sig, self.registry.encode_tag(sig, &TagInput::from(text))?));
            }
        }
        for (sig, input) in tags {
            encoded.push((sig, self.registry.encode_tag(sig, &input.into())?));
        }

        for (sig, element) in encoded {
            self.store_element(sig, element);
        }
        Ok(self)
    }

    fn store_element(&mut self, sig: TagSignature, element: Vec<u8>) {
        match self.registry.decode(&element) {
            Some(Ok(value)) => self.tags.set(sig, value),
            _ => {
                self.tags.remove(sig);
            }
        }
        self.raw_tags.set(sig, element);
    }

    /// The type a decoded value is written back as
    fn value_type(&self, sig: TagSignature, value: &TagValue) -> Result<TypeSignature> {
        match value {
            TagValue::Text(_) => match self.registry.default_type(sig) {
                Ok(t) if t == TypeSignature::DESC || t == TypeSignature::TEXT => Ok(t),
                _ => Ok(TypeSignature::TEXT),
            },
            TagValue::Xyz(_) => Ok(TypeSignature::XYZ),
            TagValue::Curve(_) => Ok(TypeSignature::CURVE),
            TagValue::Fixed16Array(_) => Ok(TypeSignature::SF32),
            TagValue::VideoCardGamma(_) => Err(IccError::NoEncoder(TypeSignature::VCGT)),
        }
    }

    fn derive_raw_tags(&self) -> Result<RawTags> {
        let mut raw = RawTags::new();
        for (sig, value) in self.tags.iter() {
            let type_sig = self.value_type(sig, value)?;
            let input = TagInput::from_value(value).ok_or(IccError::NoEncoder(type_sig))?;
            raw.set(sig, self.registry.encode(type_sig, &input)?);
        }
        Ok(raw)
    }

    /// Encode the whole profile: header, tag count, directory, elements.
    ///
    /// Raw tags are written as stored. A profile with no raw tags has its
    /// decoded tags encoded first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let raw: Cow<'_, RawTags> = if self.raw_tags.is_empty() {
            Cow::Owned(self.derive_raw_tags()?)
        } else {
            Cow::Borrowed(&self.raw_tags)
        };

        let block = encode_tag_table(&raw)?;
        let total = u32::try_from(HEADER_SIZE + block.len())
            .map_err(|_| IccError::CorruptedData("profile exceeds 4 GiB".to_string()))?;

        let mut out = Vec::with_capacity(total as usize);
        out.extend_from_slice(&self.header.encode(total));
        out.extend_from_slice(&block);
        Ok(out)
    }

    /// Write `[len + 4 as u32 BE][profile bytes]` and flush.
    ///
    /// The header inside the profile bytes carries its own size field, so
    /// the output holds two lengths: the prefix counts itself, the header's
    /// does not.
    pub fn write<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        let bytes = self.to_bytes()?;
        let prefixed = u32::try_from(bytes.len() + 4)
            .map_err(|_| IccError::CorruptedData("profile exceeds 4 GiB".to_string()))?;
        out.write_all(&prefixed.to_be_bytes())?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Human-readable dump: a "Header:" section then a "Tags:" section,
    /// one `key: value` line per entry
    pub fn dump(&self) -> String {
        let mut out = String::from("Header:\n");
        for (key, value) in self.header.fields() {
            let _ = writeln!(out, "{}: {}", key, value);
        }
        out.push_str("Tags:\n");
        for (sig, value) in self.tags.iter() {
            let _ = writeln!(out, "{}: {}", sig, value);
        }
        out
    }
}
