use std::fmt::{self, Display};
use std::path::PathBuf;
use std::time::Instant;

use image::{GrayImage, RgbImage};
use log::{debug, info, warn};

use crate::classify::{percent_collagen, Classification};
use crate::conditional_paralell::prelude::*;
use crate::config::{AnalysisConfig, DimensionPolicy};
use crate::error::{Error, Result};
use crate::loader::{load_images, SourceImage};
use crate::overlay;
use crate::pixels::HsvImage;
use crate::report::{self, SavedResults};
use crate::white_balance::{CorrectionRatios, WhitePoint};

/// Points where the batch waits for the user before going on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// After white balancing, before classification.
    Proceed,
    /// Before writing the overlay and whitespace previews.
    View,
    /// Before writing `Results.csv` and the overlays.
    Save,
}

impl Stage {
    pub fn question(&self) -> &'static str {
        match self {
            Stage::Proceed => "OK to Proceed?",
            Stage::View => "See results?",
            Stage::Save => "Save results?",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Proceed => "proceed",
            Stage::View => "view",
            Stage::Save => "save",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub filename: String,
    pub white_point: WhitePoint,
    pub ratios: CorrectionRatios,
    pub corrected: RgbImage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub white_point: WhitePoint,
    pub ratios: CorrectionRatios,
    pub collagen_pixels: usize,
    pub whitespace_pixels: usize,
    pub total_pixels: usize,
    pub percent_collagen: f64,
    pub overlay: RgbImage,
    pub whitespace_mask: GrayImage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    /// Receives `Results.csv` and `Results/`.
    pub output_dir: PathBuf,
    pub preview_dir: Option<PathBuf>,
}

impl BatchOptions {
    pub fn new(input_dir: PathBuf) -> BatchOptions {
        BatchOptions {
            output_dir: input_dir.clone(),
            input_dir,
            preview_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    /// The white balance was rejected at [`Stage::Proceed`]. Nothing was written.
    Declined,
    Completed {
        results: Vec<ImageResult>,
        saved: Option<SavedResults>,
    },
}

/// Estimates the white point of `source` and rescales its channels to neutralise it.
pub fn correct_image(source: &SourceImage, config: &AnalysisConfig) -> Result<Correction> {
    let hsv = HsvImage::from_rgb(&source.pixels);
    let white_point = WhitePoint::estimate(&hsv, &config.bright_band).ok_or_else(|| Error::NoWhitePixels {
        filename: source.filename.clone(),
    })?;
    let ratios = CorrectionRatios::from_white_point(&white_point, config.target_max).map_err(|channel| {
        Error::ZeroChannel {
            filename: source.filename.clone(),
            channel,
        }
    })?;

    Ok(Correction {
        filename: source.filename.clone(),
        white_point,
        ratios,
        corrected: ratios.apply(&source.pixels),
    })
}

/// Classifies the corrected image and measures its collagen share.
pub fn analyze_image(correction: &Correction, config: &AnalysisConfig) -> ImageResult {
    let hsv = HsvImage::from_rgb(&correction.corrected);
    let classification = Classification::classify(&hsv, config);

    let collagen_pixels = classification.collagen_pixels();
    let whitespace_pixels = classification.whitespace_pixels();
    let total_pixels = hsv.total_pixels();

    ImageResult {
        filename: correction.filename.clone(),
        width: correction.corrected.width(),
        height: correction.corrected.height(),
        white_point: correction.white_point,
        ratios: correction.ratios,
        collagen_pixels,
        whitespace_pixels,
        total_pixels,
        percent_collagen: percent_collagen(collagen_pixels, whitespace_pixels, total_pixels),
        overlay: overlay::render(&correction.corrected, &classification.collagen, &config.overlay),
        whitespace_mask: classification.whitespace.to_luma(),
    }
}

pub fn check_dimensions(images: &[SourceImage], policy: DimensionPolicy) -> Result<()> {
    let Some(first) = images.first() else {
        return Ok(());
    };
    if policy == DimensionPolicy::PerImage {
        return Ok(());
    }
    let expected = first.pixels.dimensions();
    match images.iter().find(|image| image.pixels.dimensions() != expected) {
        Some(image) => Err(Error::DimensionMismatch {
            filename: image.filename.clone(),
            expected,
            found: image.pixels.dimensions(),
        }),
        None => Ok(()),
    }
}

pub fn correct_batch(images: &[SourceImage], config: &AnalysisConfig) -> Result<Vec<Correction>> {
    images.par_iter().map(|source| correct_image(source, config)).collect()
}

pub fn analyze_batch(corrections: &[Correction], config: &AnalysisConfig) -> Vec<ImageResult> {
    corrections.par_iter().map(|correction| analyze_image(correction, config)).collect()
}

/// Runs the whole batch: load, white balance, classify, save.
///
/// `confirm` is asked at each [`Stage`]; declining `Proceed` ends the run,
/// declining `View` or `Save` only skips that step.
pub fn run_batch<F>(options: &BatchOptions, config: &AnalysisConfig, mut confirm: F) -> Result<BatchOutcome>
where
    F: FnMut(Stage) -> bool,
{
    let now = Instant::now();
    let images = load_images(&options.input_dir, config.strict)?;
    debug!("load execution time: {:.2?}", now.elapsed());
    if images.is_empty() {
        warn!("no images found in {}", options.input_dir.display());
    }
    check_dimensions(&images, config.dimensions)?;

    let now = Instant::now();
    let corrections = correct_batch(&images, config)?;
    debug!("white balance execution time: {:.2?}", now.elapsed());
    drop(images);

    for correction in &corrections {
        let ratios = correction.ratios;
        info!(
            "{}: white point {:?}, ratios r {:.4} g {:.4} b {:.4}",
            correction.filename, correction.white_point.hsv, ratios.red, ratios.green, ratios.blue
        );
    }
    if let Some(preview_dir) = &options.preview_dir {
        for correction in &corrections {
            report::write_correction_preview(preview_dir, correction)?;
        }
    }
    if !confirm(Stage::Proceed) {
        return Ok(BatchOutcome::Declined);
    }

    let now = Instant::now();
    let results = analyze_batch(&corrections, config);
    debug!("classification execution time: {:.2?}", now.elapsed());
    for result in &results {
        info!("{}", report::summary(result));
    }

    if confirm(Stage::View) {
        match &options.preview_dir {
            Some(preview_dir) => {
                for result in &results {
                    report::write_results_preview(preview_dir, result)?;
                }
                info!("wrote result previews to {}", preview_dir.display());
            }
            None => warn!("no preview directory set, pass --preview-dir to write overlays for viewing"),
        }
    }

    let saved = if confirm(Stage::Save) {
        Some(report::save_results(&options.output_dir, &results)?)
    } else {
        None
    };

    Ok(BatchOutcome::Completed { results, saved })
}
