//! PNG as a profile container (the iCCP chunk)

use std::borrow::Cow;
use std::io::{BufRead, Seek, Write};

use anyhow::{Context, Result};
use iccp_core::ProfileContainer;
use png::text_metadata::{ITXtChunk, TEXtChunk, ZTXtChunk};
use tracing::debug;

/// A decoded PNG kept in its stored sample format, so it can be written
/// back with only the iCCP chunk changed
pub struct PngFile {
    width: u32,
    height: u32,
    color_type: png::ColorType,
    bit_depth: png::BitDepth,
    palette: Option<Vec<u8>>,
    trns: Option<Vec<u8>>,
    icc_profile: Option<Vec<u8>>,
    ancillary: Ancillary,
    pixels: Vec<u8>,
}

/// Chunks carried through unchanged from the source PNG
#[derive(Default)]
struct Ancillary {
    gamma: Option<png::ScaledFloat>,
    chromaticities: Option<png::SourceChromaticities>,
    srgb: Option<png::SrgbRenderingIntent>,
    pixel_dims: Option<png::PixelDimensions>,
    bkgd: Option<Vec<u8>>,
    exif: Option<Vec<u8>>,
    text: Vec<TEXtChunk>,
    ztext: Vec<ZTXtChunk>,
    itext: Vec<ITXtChunk>,
}

impl Ancillary {
    fn from_info(info: &png::Info<'_>) -> Self {
        Self {
            gamma: info.gama_chunk,
            chromaticities: info.chrm_chunk,
            srgb: info.srgb,
            pixel_dims: info.pixel_dims,
            bkgd: info.bkgd.as_ref().map(|b| b.to_vec()),
            exif: info.exif_metadata.as_ref().map(|e| e.to_vec()),
            text: info.uncompressed_latin1_text.clone(),
            ztext: info.compressed_latin1_text.clone(),
            itext: info.utf8_text.clone(),
        }
    }

    fn apply(&self, info: &mut png::Info<'_>) {
        info.source_gamma = self.gamma;
        info.source_chromaticities = self.chromaticities;
        info.srgb = self.srgb;
        info.pixel_dims = self.pixel_dims;
        info.exif_metadata = self.exif.clone().map(Cow::Owned);
        info.uncompressed_latin1_text = self.text.clone();
        info.compressed_latin1_text = self.ztext.clone();
        info.utf8_text = self.itext.clone();
    }
}

impl PngFile {
    pub fn read<R: BufRead + Seek>(input: R) -> Result<Self> {
        let mut decoder = png::Decoder::new(input);
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info().context("Failed to read PNG header")?;

        let buf_size = reader
            .output_buffer_size()
            .context("Cannot determine PNG output buffer size")?;
        let mut pixels = vec![0u8; buf_size];
        let frame = reader
            .next_frame(&mut pixels)
            .context("Failed to decode PNG image data")?;
        pixels.truncate(frame.buffer_size());

        let info = reader.info();
        let icc_profile = info.icc_profile.as_ref().map(|p| p.to_vec());
        debug!(
            "PNG {}x{} {:?} {:?}, iCCP: {}",
            info.width,
            info.height,
            frame.color_type,
            frame.bit_depth,
            icc_profile.as_ref().map_or(0, Vec::len)
        );

        Ok(Self {
            width: info.width,
            height: info.height,
            color_type: frame.color_type,
            bit_depth: frame.bit_depth,
            palette: info.palette.as_ref().map(|p| p.to_vec()),
            trns: info.trns.as_ref().map(|t| t.to_vec()),
            icc_profile,
            ancillary: Ancillary::from_info(info),
            pixels,
        })
    }

    pub fn write<W: Write>(&self, out: W) -> Result<()> {
        let mut info = png::Info::with_size(self.width, self.height);
        info.color_type = self.color_type;
        info.bit_depth = self.bit_depth;
        info.palette = self.palette.clone().map(Cow::Owned);
        info.trns = self.trns.clone().map(Cow::Owned);
        info.icc_profile = self.icc_profile.clone().map(Cow::Owned);
        self.ancillary.apply(&mut info);

        let encoder = png::Encoder::with_info(out, info).context("Invalid PNG parameters")?;
        let mut writer = encoder.write_header().context("Failed to write PNG header")?;
        // The encoder has no bKGD field; it goes after PLTE and tRNS
        if let Some(bkgd) = &self.ancillary.bkgd {
            writer
                .write_chunk(png::chunk::bKGD, bkgd)
                .context("Failed to write bKGD chunk")?;
        }
        writer
            .write_image_data(&self.pixels)
            .context("Failed to write PNG image data")?;
        writer.finish().context("Failed to finish PNG")?;
        Ok(())
    }
}

impl ProfileContainer for PngFile {
    fn extract_profile_bytes(&self) -> Option<&[u8]> {
        self.icc_profile.as_deref()
    }

    /// An sRGB chunk would take precedence over iCCP, so it is dropped
    fn embed_profile_bytes(&mut self, profile: Vec<u8>) {
        if self.ancillary.srgb.take().is_some() {
            debug!("Dropping sRGB chunk in favour of the embedded profile");
        }
        self.icc_profile = Some(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iccp_core::{Profile, Signature};
    use std::io::Cursor;

    fn grey_png(icc: Option<Vec<u8>>) -> Vec<u8> {
        let file = PngFile {
            width: 4,
            height: 2,
            color_type: png::ColorType::Grayscale,
            bit_depth: png::BitDepth::Eight,
            palette: None,
            trns: None,
            icc_profile: icc,
            ancillary: Ancillary::default(),
            pixels: (0u8..8).map(|i| i * 30).collect(),
        };
        let mut out = Vec::new();
        file.write(&mut out).unwrap();
        out
    }

    #[test]
    fn test_png_without_profile() {
        let file = PngFile::read(Cursor::new(grey_png(None))).unwrap();
        assert!(file.extract_profile_bytes().is_none());
        assert!(Profile::from_container(&file).unwrap().is_none());
    }

    #[test]
    fn test_embed_profile_keeps_pixels() {
        let mut profile = Profile::new();
        profile.greyscale_input();

        let mut file = PngFile::read(Cursor::new(grey_png(None))).unwrap();
        profile.embed_into(&mut file).unwrap();
        let mut out = Vec::new();
        file.write(&mut out).unwrap();

        let back = PngFile::read(Cursor::new(out)).unwrap();
        assert_eq!(back.pixels, file.pixels);
        let embedded = Profile::from_container(&back).unwrap().unwrap();
        assert_eq!(embedded.header.colour_space, Signature::GRAY);
    }

    #[test]
    fn test_embed_profile_keeps_ancillary_chunks() {
        let mut source = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut source, 4, 2);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_source_srgb(png::SrgbRenderingIntent::Perceptual);
            encoder.set_source_gamma(png::ScaledFloat::from_scaled(45455));
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: 2835,
                yppu: 2835,
                unit: png::Unit::Meter,
            }));
            encoder
                .add_text_chunk("Software".to_string(), "scanner".to_string())
                .unwrap();
            let mut writer = encoder.write_header().unwrap();
            writer.write_chunk(png::chunk::bKGD, &[0, 200]).unwrap();
            writer.write_image_data(&[0; 8]).unwrap();
            writer.finish().unwrap();
        }

        let mut file = PngFile::read(Cursor::new(source)).unwrap();
        assert_eq!(file.ancillary.srgb, Some(png::SrgbRenderingIntent::Perceptual));
        let mut profile = Profile::new();
        profile.greyscale_input();
        profile.embed_into(&mut file).unwrap();
        let mut out = Vec::new();
        file.write(&mut out).unwrap();

        let back = PngFile::read(Cursor::new(out)).unwrap();
        assert!(back.extract_profile_bytes().is_some());
        assert_eq!(back.ancillary.srgb, None);
        assert_eq!(back.ancillary.gamma, Some(png::ScaledFloat::from_scaled(45455)));
        let dims = back.ancillary.pixel_dims.unwrap();
        assert_eq!((dims.xppu, dims.yppu, dims.unit), (2835, 2835, png::Unit::Meter));
        assert_eq!(back.ancillary.bkgd.as_deref(), Some(&[0u8, 200][..]));
        assert_eq!(back.ancillary.text.len(), 1);
        assert_eq!(back.ancillary.text[0].keyword, "Software");
        assert_eq!(back.ancillary.text[0].text, "scanner");
    }
}
