//! White point estimation from the brightest pixels and ratio based channel correction.
//!
//! The white point is the rounded mean HSV color of every pixel in the bright band.
//! Converting it back to RGB gives the color a white slide area actually rendered as,
//! and scaling each channel by `target_max / channel` maps it to neutral white.

use image::{Rgb, RgbImage};

use crate::cst::hsv_to_rgb;
use crate::error::Channel;
use crate::mask::HsvRange;
use crate::pixels::{HsvImage, Pixel, MAX_HUE, MAX_SUBPIXEL};

pub const SWATCH_SIZE: u32 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WhitePoint {
    pub hsv: Pixel,
}

impl WhitePoint {
    /// Mean of every bright pixel, each channel rounded half to even.
    /// `None` when no pixel falls in `band`.
    pub fn estimate(image: &HsvImage, band: &HsvRange) -> Option<WhitePoint> {
        let (sums, count) = image
            .data
            .iter()
            .filter(|pixel| band.contains(**pixel))
            .fold(([0u64; 3], 0u64), |(mut sums, count), pixel| {
                for (sum, value) in sums.iter_mut().zip(pixel) {
                    *sum += u64::from(*value);
                }
                (sums, count + 1)
            });

        if count == 0 {
            return None;
        }
        let hsv = sums.map(|sum| (sum as f64 / count as f64).round_ties_even() as u8);
        Some(WhitePoint { hsv })
    }

    /// RGB on the `[0, 255]` scale, unrounded.
    pub fn to_rgb(&self) -> [f64; 3] {
        let [h, s, v] = self.hsv.map(f64::from);
        hsv_to_rgb(h / MAX_HUE as f64, s / MAX_SUBPIXEL, v / MAX_SUBPIXEL)
            .map(|channel| channel * MAX_SUBPIXEL)
    }

    /// Flat image of the white point color for visual checking.
    pub fn swatch(&self) -> RgbImage {
        let color = self.to_rgb().map(|channel| channel as u8);
        RgbImage::from_pixel(SWATCH_SIZE, SWATCH_SIZE, Rgb(color))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrectionRatios {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl CorrectionRatios {
    pub fn from_white_point(white_point: &WhitePoint, target_max: f64) -> Result<CorrectionRatios, Channel> {
        let [r, g, b] = white_point.to_rgb();
        let ratio = |value: f64, channel: Channel| {
            let ratio = target_max / value;
            if value <= 0.0 || !ratio.is_finite() {
                Err(channel)
            } else {
                Ok(ratio)
            }
        };
        Ok(CorrectionRatios {
            red: ratio(r, Channel::Red)?,
            green: ratio(g, Channel::Green)?,
            blue: ratio(b, Channel::Blue)?,
        })
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.red, self.green, self.blue]
    }

    /// Scales each channel independently, rounding half to even and saturating to `[0, 255]`.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let ratios = self.as_array();
        let mut corrected = image.clone();
        for pixel in corrected.pixels_mut() {
            for (value, ratio) in pixel.0.iter_mut().zip(ratios) {
                *value = (f64::from(*value) * ratio).round_ties_even().clamp(0.0, MAX_SUBPIXEL) as u8;
            }
        }
        corrected
    }
}
