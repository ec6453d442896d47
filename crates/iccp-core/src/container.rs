//! Image containers that carry an embedded profile

/// A file format with a slot for one embedded ICC profile
///
/// The profile is exchanged as raw bytes; [`Profile::from_container`] and
/// [`Profile::embed_into`] do the decoding and encoding.
///
/// [`Profile::from_container`]: crate::Profile::from_container
/// [`Profile::embed_into`]: crate::Profile::embed_into
pub trait ProfileContainer {
    /// The embedded profile, decompressed, if there is one
    fn extract_profile_bytes(&self) -> Option<&[u8]>;

    /// Replace the embedded profile
    fn embed_profile_bytes(&mut self, profile: Vec<u8>);
}

impl ProfileContainer for Option<Vec<u8>> {
    fn extract_profile_bytes(&self) -> Option<&[u8]> {
        self.as_deref()
    }

    fn embed_profile_bytes(&mut self, profile: Vec<u8>) {
        *self = Some(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Profile, TagSignature, TagValue};

    #[test]
    fn test_empty_container() {
        let slot: Option<Vec<u8>> = None;
        assert!(Profile::from_container(&slot).unwrap().is_none());
    }

    #[test]
    fn test_embed_then_extract() {
        let mut profile = Profile::new();
        profile.greyscale_input();
        profile
            .add_tags([(TagSignature::CHAR_TARGET, "IT8.7/2")])
            .unwrap();

        let mut slot: Option<Vec<u8>> = None;
        profile.embed_into(&mut slot).unwrap();

        let back = Profile::from_container(&slot).unwrap().unwrap();
        assert_eq!(
            back.tag(TagSignature::CHAR_TARGET),
            Some(&TagValue::Text("IT8.7/2".to_string()))
        );
    }
}
