use crate::config::AnalysisConfig;
use crate::mask::Mask;
use crate::pixels::HsvImage;

/// Collagen and whitespace masks of one corrected image. The two bands are
/// evaluated independently, a pixel may be in both or neither.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub collagen: Mask,
    pub whitespace: Mask,
}

impl Classification {
    pub fn classify(image: &HsvImage, config: &AnalysisConfig) -> Classification {
        Classification {
            collagen: config.collagen_band.create(image),
            whitespace: config.whitespace_band.create(image),
        }
    }

    pub fn collagen_pixels(&self) -> usize {
        self.collagen.count()
    }

    pub fn whitespace_pixels(&self) -> usize {
        self.whitespace.count()
    }
}

/// Share of non-whitespace pixels that are collagen, in percent.
/// An image that is entirely whitespace has no tissue and reports 0.
pub fn percent_collagen(collagen_pixels: usize, whitespace_pixels: usize, total_pixels: usize) -> f64 {
    let tissue_pixels = total_pixels.saturating_sub(whitespace_pixels);
    if tissue_pixels == 0 {
        return 0.0;
    }
    100.0 * (collagen_pixels as f64 / tissue_pixels as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::Pixel;

    const COLLAGEN: Pixel = [150, 255, 255];
    const WHITE: Pixel = [0, 0, 255];
    const GRAY: Pixel = [0, 0, 128];

    fn get_hsv_image(data: Vec<Pixel>, height: usize, width: usize) -> HsvImage {
        HsvImage { data, height, width }
    }

    #[test]
    fn test_percent_collagen(){
        assert_eq!(percent_collagen(1, 2, 4), 50.0);
        assert_eq!(percent_collagen(0, 0, 10), 0.0);
        assert_eq!(percent_collagen(10, 0, 10), 100.0);
        assert_eq!(percent_collagen(3, 6, 10), 75.0);
    }

    #[test]
    fn test_all_whitespace_is_zero(){
        assert_eq!(percent_collagen(0, 16, 16), 0.0);

        let image = get_hsv_image(vec![WHITE; 16], 4, 4);
        let classification = Classification::classify(&image, &AnalysisConfig::default());
        assert_eq!(classification.whitespace_pixels(), 16);
        assert_eq!(classification.collagen_pixels(), 0);
        assert_eq!(
            percent_collagen(classification.collagen_pixels(), classification.whitespace_pixels(), image.total_pixels()),
            0.0
        );
    }

    #[test]
    fn test_known_fraction(){
        // 3 of 8 collagen, no whitespace
        let mut data = vec![GRAY; 8];
        data[0] = COLLAGEN;
        data[3] = COLLAGEN;
        data[7] = COLLAGEN;
        let image = get_hsv_image(data, 2, 4);

        let classification = Classification::classify(&image, &AnalysisConfig::default());
        let percent = percent_collagen(
            classification.collagen_pixels(),
            classification.whitespace_pixels(),
            image.total_pixels(),
        );

        assert_eq!(classification.whitespace_pixels(), 0);
        assert!((percent - 37.5).abs() < 1e-9);
    }

    #[test]
    fn test_percent_stays_in_range(){
        for total in 1..20usize {
            for whitespace in 0..=total {
                for collagen in 0..=(total - whitespace) {
                    let percent = percent_collagen(collagen, whitespace, total);
                    assert!((0.0..=100.0).contains(&percent), "{collagen} {whitespace} {total}");
                }
            }
        }
    }
}
