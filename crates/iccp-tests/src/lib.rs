//! # iccp-tests
//!
//! Parity testing of iccp against lcms2.
//!
//! Profiles written by iccp must open in lcms2 and behave as their tags
//! say; profiles written by lcms2 must decode in iccp without warnings
//! and survive a re-encode.

use std::slice;

use anyhow::{Context, Result};
use iccp_core::{CurveSpec, Profile, TagSignature, blackshift};
use lcms2::{CIExyY, Intent, PixelFormat, ToneCurve, Transform};

/// D50 as chromaticity, for lcms2 profile constructors
pub const D50_XYY: CIExyY = CIExyY {
    x: 0.3457,
    y: 0.3585,
    Y: 1.0,
};

/// Encoded greyscale input profile with a black-shifted tone curve
pub fn greyscale_profile(black: f64) -> Result<Vec<u8>> {
    let mut profile = Profile::new();
    profile.greyscale_input();
    profile.add_tags([(TagSignature::GRAY_TRC, CurveSpec::sampled(blackshift(black)))])?;
    Ok(profile.to_bytes()?)
}

/// Run every 8-bit grey level through `icc` into a linear grey space
pub fn lcms2_grey_response(icc: &[u8]) -> Result<Vec<u8>> {
    let src = lcms2::Profile::new_icc(icc).context("lcms2 rejected profile")?;
    let linear = lcms2::Profile::new_gray(&D50_XYY, &ToneCurve::new(1.0))
        .context("lcms2 linear grey profile")?;
    let transform = Transform::<[u8; 1], [u8; 1]>::new(
        &src,
        PixelFormat::GRAY_8,
        &linear,
        PixelFormat::GRAY_8,
        Intent::RelativeColorimetric,
    )
    .context("lcms2 transform")?;

    let response = (0..=255u8)
        .map(|level| {
            let input = [level];
            let mut output = [0u8];
            transform.transform_pixels(slice::from_ref(&input), slice::from_mut(&mut output));
            output[0]
        })
        .collect();
    Ok(response)
}
