use image::RgbImage;

use crate::conditional_paralell::prelude::*;
use crate::cst;

pub type SubPixel = u8;
pub type Pixel = [SubPixel; CHANNELS_PER_PIXEL];
pub type ImageBuffer = Vec<Pixel>;

pub const CHANNELS_PER_PIXEL: usize = 3;
pub const MAX_SUBPIXEL: f64 = 255.0;
pub const MAX_HUE: SubPixel = 180;

pub trait PixelOps {
    fn to_hsv(self) -> Pixel;
}

impl PixelOps for Pixel {
    fn to_hsv(self) -> Pixel {
        cst::rgb_to_hsv(self)
    }
}

/// An image in hue/saturation/value form, hue in `[0, 180]`, saturation and value in `[0, 255]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HsvImage {
    pub data: ImageBuffer,
    pub height: usize,
    pub width: usize,
}

impl HsvImage {
    pub fn from_rgb(image: &RgbImage) -> HsvImage {
        let rgb: ImageBuffer = image.pixels().map(|pixel| pixel.0).collect();
        let data = rgb.par_iter().map(|pixel| pixel.to_hsv()).collect();
        HsvImage {
            data,
            height: image.height() as usize,
            width: image.width() as usize,
        }
    }

    pub fn total_pixels(&self) -> usize {
        self.height * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgb_keeps_layout(){
        let image = RgbImage::from_vec(2, 1, vec![
            255, 255, 255,   255, 0, 255,
        ]).unwrap();

        let hsv = HsvImage::from_rgb(&image);

        assert_eq!(hsv.width, 2);
        assert_eq!(hsv.height, 1);
        assert_eq!(hsv.total_pixels(), 2);
        assert_eq!(hsv.data, vec![[0, 0, 255], [150, 255, 255]]);
    }
}
