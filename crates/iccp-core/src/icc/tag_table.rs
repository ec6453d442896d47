//! Tag Table
//!
//! The tag count (4 bytes) follows the header, then one 12-byte entry per
//! tag: signature, offset from the start of the profile, size. Element
//! data follows the table; elements may share data or overlap.
//!
//! See ICC.1:2004-10 Section 7.3.

use tracing::{trace, warn};

use super::header::HEADER_SIZE;
use super::types::{TagSignature, be_u32};
use crate::error::{IccError, Result, StructuralWarning};

/// signature(4) + offset(4) + size(4)
pub const TAG_ENTRY_SIZE: usize = 12;

/// Start of the directory, after the header and the tag count
const TABLE_START: usize = HEADER_SIZE + 4;

/// Insertion-ordered mapping from tag signature to a value.
///
/// Order determines element layout on encode, so it is kept explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureMap<V> {
    entries: Vec<(TagSignature, V)>,
}

impl<V> SignatureMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, sig: TagSignature) -> bool {
        self.entries.iter().any(|(s, _)| *s == sig)
    }

    pub fn get(&self, sig: TagSignature) -> Option<&V> {
        self.entries.iter().find(|(s, _)| *s == sig).map(|(_, v)| v)
    }

    /// Insert unless `sig` is already present; returns whether it was inserted
    pub fn insert_first(&mut self, sig: TagSignature, value: V) -> bool {
        if self.contains(sig) {
            return false;
        }
        self.entries.push((sig, value));
        true
    }

    /// Insert or replace, keeping an existing entry's position
    pub fn set(&mut self, sig: TagSignature, value: V) {
        match self.entries.iter_mut().find(|(s, _)| *s == sig) {
            Some((_, v)) => *v = value,
            None => self.entries.push((sig, value)),
        }
    }

    pub fn remove(&mut self, sig: TagSignature) -> Option<V> {
        let idx = self.entries.iter().position(|(s, _)| *s == sig)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagSignature, &V)> {
        self.entries.iter().map(|(s, v)| (*s, v))
    }

    pub fn signatures(&self) -> impl Iterator<Item = TagSignature> + '_ {
        self.entries.iter().map(|(s, _)| *s)
    }
}

impl<V> Default for SignatureMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(TagSignature, V)> for SignatureMap<V> {
    fn from_iter<I: IntoIterator<Item = (TagSignature, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (sig, value) in iter {
            map.set(sig, value);
        }
        map
    }
}

/// Raw tag elements by signature
pub type RawTags = SignatureMap<Vec<u8>>;

/// Tag table entry (as stored in profile)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEntry {
    pub signature: TagSignature,
    /// Offset from start of profile
    pub offset: u32,
    pub size: u32,
}

/// Read the tag count and directory that follow the header
pub fn parse_tag_directory(data: &[u8]) -> Result<Vec<TagEntry>> {
    if data.len() < TABLE_START {
        return Err(IccError::TooSmall {
            expected: TABLE_START,
            actual: data.len(),
        });
    }

    let count = be_u32(data, HEADER_SIZE) as usize;
    let required_size = count
        .checked_mul(TAG_ENTRY_SIZE)
        .and_then(|n| n.checked_add(TABLE_START))
        .unwrap_or(usize::MAX);
    if data.len() < required_size {
        return Err(IccError::TooSmall {
            expected: required_size,
            actual: data.len(),
        });
    }

    let entries = data[TABLE_START..required_size]
        .chunks_exact(TAG_ENTRY_SIZE)
        .map(|entry| TagEntry {
            signature: TagSignature(be_u32(entry, 0)),
            offset: be_u32(entry, 4),
            size: be_u32(entry, 8),
        })
        .inspect(|e| trace!("tag '{}' at {} ({} bytes)", e.signature, e.offset, e.size))
        .collect();
    Ok(entries)
}

/// Parse the directory and slice out each element.
///
/// A repeated signature is illegal per the ICC specification; the first
/// entry wins and later ones are reported and dropped. An entry reaching
/// past the buffer keeps whatever bytes are present.
pub fn parse_tag_table(data: &[u8], warnings: &mut Vec<StructuralWarning>) -> Result<RawTags> {
    let entries = parse_tag_directory(data)?;
    let mut raw = RawTags::new();

    for entry in &entries {
        if raw.contains(entry.signature) {
            let warning = StructuralWarning::DuplicateTag(entry.signature);
            warn!("{}", warning);
            warnings.push(warning);
            continue;
        }

        let start = (entry.offset as usize).min(data.len());
        let end = (entry.offset as usize).saturating_add(entry.size as usize);
        if end > data.len() {
            let warning = StructuralWarning::TagOutOfBounds {
                tag: entry.signature,
                offset: entry.offset,
                size: entry.size,
                profile_size: data.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
        let end = end.min(data.len());

        raw.insert_first(entry.signature, data[start..end].to_vec());
    }

    Ok(raw)
}

/// Serialize the tag count, directory and element data.
///
/// Offsets are from the start of the profile: the first element sits
/// right after the header, count and directory; each following element
/// starts where the previous one ended.
pub fn encode_tag_table(tags: &RawTags) -> Result<Vec<u8>> {
    let n = tags.len();
    let table_len = TAG_ENTRY_SIZE * n;
    let data_len: usize = tags.iter().map(|(_, v)| v.len()).sum();

    let too_large = || IccError::CorruptedData("tag data exceeds 4 GiB".to_string());
    let count = u32::try_from(n).map_err(|_| too_large())?;

    let mut table = Vec::with_capacity(4 + table_len);
    let mut elements = Vec::with_capacity(data_len);
    table.extend_from_slice(&count.to_be_bytes());

    let first_offset = TABLE_START + table_len;
    for (sig, element) in tags.iter() {
        let offset = u32::try_from(first_offset + elements.len()).map_err(|_| too_large())?;
        let size = u32::try_from(element.len()).map_err(|_| too_large())?;
        table.extend_from_slice(&sig.to_bytes());
        table.extend_from_slice(&offset.to_be_bytes());
        table.extend_from_slice(&size.to_be_bytes());
        elements.extend_from_slice(element);
    }

    table.extend_from_slice(&elements);
    Ok(table)
}
