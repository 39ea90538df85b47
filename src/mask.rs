use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::conditional_paralell::prelude::*;
use crate::pixels::{HsvImage, Pixel, MAX_HUE};

pub const MASK_SET: u8 = 255;
pub const MASK_UNSET: u8 = 0;

/// Inclusive per-channel HSV bounds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: Pixel,
    pub upper: Pixel,
}

impl HsvRange {
    pub const fn new(lower: Pixel, upper: Pixel) -> HsvRange {
        HsvRange { lower, upper }
    }

    #[inline]
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(value, (lower, upper))| lower <= value && value <= upper)
    }

    pub fn create(&self, image: &HsvImage) -> Mask {
        let data = image.data.par_iter().map(|pixel| self.contains(*pixel)).collect();
        Mask {
            data,
            height: image.height,
            width: image.width,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.lower.iter().zip(self.upper.iter()).any(|(lower, upper)| lower > upper) {
            return Err(format!("lower bound {:?} exceeds upper bound {:?}", self.lower, self.upper));
        }
        if self.lower[0] > MAX_HUE {
            return Err(format!("hue bound {} is outside [0, {}]", self.lower[0], MAX_HUE));
        }
        Ok(())
    }
}

/// Binary per-pixel classification, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    pub data: Vec<bool>,
    pub height: usize,
    pub width: usize,
}

impl Mask {
    pub fn count(&self) -> usize {
        self.data.iter().filter(|set| **set).count()
    }

    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let set = self.data[y as usize * self.width + x as usize];
            Luma([if set { MASK_SET } else { MASK_UNSET }])
        })
    }
}
