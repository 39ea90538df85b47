use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mask::HsvRange;
use crate::pixels::{Pixel, MAX_SUBPIXEL};

/// Near white, any hue: the pixels averaged into the white point.
pub const BRIGHT_BAND: HsvRange = HsvRange::new([0, 0, 250], [180, 100, 255]);
/// Magenta to red-violet, saturated: the stain signature.
pub const COLLAGEN_BAND: HsvRange = HsvRange::new([130, 50, 20], [180, 255, 255]);
/// Tighter than the bright band, measured after correction.
pub const WHITESPACE_BAND: HsvRange = HsvRange::new([0, 0, 245], [180, 40, 255]);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionPolicy {
    /// Every image's pixel total comes from its own dimensions.
    #[default]
    PerImage,
    /// Every image must match the first image's dimensions.
    Uniform,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    pub image_weight: f32,
    pub mask_weight: f32,
    pub highlight: Pixel,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            image_weight: 0.95,
            mask_weight: 0.05,
            highlight: [255, 0, 0],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Fail on files that do not decode instead of skipping them.
    pub strict: bool,
    pub dimensions: DimensionPolicy,
    /// Channel value the white point is scaled to.
    pub target_max: f64,
    pub bright_band: HsvRange,
    pub collagen_band: HsvRange,
    pub whitespace_band: HsvRange,
    pub overlay: OverlayConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            strict: false,
            dimensions: DimensionPolicy::PerImage,
            target_max: MAX_SUBPIXEL,
            bright_band: BRIGHT_BAND,
            collagen_band: COLLAGEN_BAND,
            whitespace_band: WHITESPACE_BAND,
            overlay: OverlayConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.target_max > 0.0 && self.target_max <= MAX_SUBPIXEL) {
            return Err(Error::InvalidConfig(format!(
                "target_max {} is outside (0, {}]",
                self.target_max, MAX_SUBPIXEL
            )));
        }
        for (name, band) in [
            ("bright_band", &self.bright_band),
            ("collagen_band", &self.collagen_band),
            ("whitespace_band", &self.whitespace_band),
        ] {
            band.validate()
                .map_err(|reason| Error::InvalidConfig(format!("{name}: {reason}")))?;
        }
        for (name, weight) in [
            ("overlay.image_weight", self.overlay.image_weight),
            ("overlay.mask_weight", self.overlay.mask_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} {weight} must be finite and non-negative")));
            }
        }
        Ok(())
    }

    pub fn to_toml(&self) -> String {
        // plain structs of numbers and strings always serialize
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

pub fn parse_config_str(data_string: &str, config_path: &Path) -> Result<AnalysisConfig> {
    let config: AnalysisConfig = toml::from_str(data_string).map_err(|source| Error::ParseConfig {
        path: config_path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn parse_config(config_path: &Path) -> Result<AnalysisConfig> {
    let data_string = std::fs::read_to_string(config_path).map_err(|source| Error::ReadConfig {
        path: config_path.to_path_buf(),
        source,
    })?;
    parse_config_str(&data_string, config_path)
}
