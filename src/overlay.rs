use image::RgbImage;

use crate::config::OverlayConfig;
use crate::mask::{Mask, MASK_SET, MASK_UNSET};
use crate::pixels::MAX_SUBPIXEL;

/// Blends the image with the gray rendering of `mask`, then paints every
/// masked pixel with the highlight color.
pub fn render(image: &RgbImage, mask: &Mask, config: &OverlayConfig) -> RgbImage {
    let mut overlay = image.clone();
    for (pixel, set) in overlay.pixels_mut().zip(mask.data.iter()) {
        let mask_value = if *set { MASK_SET } else { MASK_UNSET };
        pixel.0 = pixel.0.map(|value| blend(value, mask_value, config));
        if *set {
            pixel.0 = config.highlight;
        }
    }
    overlay
}

#[inline]
fn blend(value: u8, mask_value: u8, config: &OverlayConfig) -> u8 {
    let mixed = f32::from(value) * config.image_weight + f32::from(mask_value) * config.mask_weight;
    mixed.round_ties_even().clamp(0.0, MAX_SUBPIXEL as f32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_highlight_overrides_blend(){
        let image = RgbImage::from_vec(2, 1, vec![
            200, 100, 60,   255, 0, 255,
        ]).unwrap();
        let mask = Mask { data: vec![false, true], height: 1, width: 2 };

        let overlay = render(&image, &mask, &OverlayConfig::default());

        // 0.95 * value for unmasked pixels
        assert_eq!(overlay.get_pixel(0, 0).0, [190, 95, 57]);
        assert_eq!(overlay.get_pixel(1, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_custom_weights(){
        let image = RgbImage::from_pixel(1, 1, Rgb([100, 100, 100]));
        let mask = Mask { data: vec![false], height: 1, width: 1 };
        let config = OverlayConfig {
            image_weight: 1.0,
            mask_weight: 0.0,
            highlight: [0, 255, 0],
        };

        assert_eq!(render(&image, &mask, &config).get_pixel(0, 0).0, [100, 100, 100]);
    }

    #[test]
    fn test_blend_saturates(){
        let config = OverlayConfig::default();
        assert_eq!(blend(255, MASK_SET, &config), 255);
        assert_eq!(blend(0, MASK_SET, &config), 13);
        assert_eq!(blend(0, MASK_UNSET, &config), 0);
    }
}
