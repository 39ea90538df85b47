use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, ImageResult as EncodeResult};
use itertools::Itertools;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::pipeline::{Correction, ImageResult};

pub const RESULTS_CSV: &str = "Results.csv";
pub const RESULTS_DIR: &str = "Results";
pub const CSV_HEADER: [&str; 4] = ["Filename", "Collagen Pixels", "Whitespace Pixels", "Percent Collagen"];

/// Where a save put its files.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedResults {
    pub csv: PathBuf,
    pub overlays: Vec<PathBuf>,
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn csv_row(result: &ImageResult) -> String {
    [
        escape_field(&result.filename),
        result.collagen_pixels.to_string(),
        result.whitespace_pixels.to_string(),
        format!("{:?}", result.percent_collagen),
    ]
    .iter()
    .join(",")
}

pub fn write_csv<W: Write>(mut writer: W, results: &[ImageResult]) -> std::io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER.iter().join(","))?;
    for result in results {
        writeln!(writer, "{}", csv_row(result))?;
    }
    writer.flush()
}

/// One line per image for the console.
pub fn summary(result: &ImageResult) -> String {
    format!(
        "{}: {:.2}% collagen ({} collagen px, {} whitespace px of {})",
        result.filename,
        result.percent_collagen,
        result.collagen_pixels,
        result.whitespace_pixels,
        result.total_pixels,
    )
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Format from the extension, PNG when the extension names no known format.
fn save_image<F>(path: &Path, save: F) -> Result<()>
where
    F: FnOnce(&Path, ImageFormat) -> EncodeResult<()>,
{
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    save(path, format).map_err(|source| Error::Encode {
        path: path.to_path_buf(),
        source,
    })
}

fn with_suffix(filename: &str, suffix: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    format!("{stem}.{suffix}.png")
}

/// Overlay bytes and the name to store them under. Formats that decode but
/// cannot encode 8-bit RGB (hdr, exr, dds) are written as `<filename>.png`.
fn encode_overlay(overlay_dir: &Path, result: &ImageResult) -> Result<(String, Vec<u8>)> {
    let format = ImageFormat::from_path(&result.filename).unwrap_or(ImageFormat::Png);
    let encode = |format: ImageFormat| {
        let mut bytes = Cursor::new(Vec::new());
        result.overlay.write_to(&mut bytes, format).map(|()| bytes.into_inner())
    };
    let encode_error = |filename: &str, source: ImageError| Error::Encode {
        path: overlay_dir.join(filename),
        source,
    };

    match encode(format) {
        Ok(bytes) => Ok((result.filename.clone(), bytes)),
        Err(ImageError::Unsupported(e)) => {
            let filename = format!("{}.png", result.filename);
            warn!("{}: {e}, saving overlay as {filename}", result.filename);
            let bytes = encode(ImageFormat::Png).map_err(|source| encode_error(&filename, source))?;
            Ok((filename, bytes))
        }
        Err(source) => Err(encode_error(&result.filename, source)),
    }
}

/// Writes `Results/<filename>` overlays and then `Results.csv` into `output_dir`.
/// Every overlay is encoded before anything touches the disk.
/// Existing files are overwritten.
pub fn save_results(output_dir: &Path, results: &[ImageResult]) -> Result<SavedResults> {
    let overlay_dir = output_dir.join(RESULTS_DIR);
    let encoded = results
        .iter()
        .map(|result| encode_overlay(&overlay_dir, result))
        .collect::<Result<Vec<_>>>()?;

    create_dir(&overlay_dir)?;
    let mut overlays = Vec::with_capacity(encoded.len());
    for (filename, bytes) in encoded {
        let path = overlay_dir.join(filename);
        std::fs::write(&path, bytes).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        overlays.push(path);
    }

    let csv = output_dir.join(RESULTS_CSV);
    let file = File::create(&csv).map_err(|source| Error::Write {
        path: csv.clone(),
        source,
    })?;
    write_csv(BufWriter::new(file), results).map_err(|source| Error::Write {
        path: csv.clone(),
        source,
    })?;

    info!("saved {} and {} overlays to {}", RESULTS_CSV, overlays.len(), output_dir.display());
    Ok(SavedResults { csv, overlays })
}

/// Corrected image and white sample swatch, for checking the white balance.
pub fn write_correction_preview(preview_dir: &Path, correction: &Correction) -> Result<()> {
    create_dir(preview_dir)?;
    let corrected = preview_dir.join(with_suffix(&correction.filename, "corrected"));
    save_image(&corrected, |path, format| correction.corrected.save_with_format(path, format))?;
    let swatch = preview_dir.join(with_suffix(&correction.filename, "white"));
    let white = correction.white_point.swatch();
    save_image(&swatch, |path, format| white.save_with_format(path, format))
}

/// Collagen overlay and whitespace mask, for checking the classification.
pub fn write_results_preview(preview_dir: &Path, result: &ImageResult) -> Result<()> {
    create_dir(preview_dir)?;
    let overlay = preview_dir.join(with_suffix(&result.filename, "overlay"));
    save_image(&overlay, |path, format| result.overlay.save_with_format(path, format))?;
    let whitespace = preview_dir.join(with_suffix(&result.filename, "whitespace"));
    save_image(&whitespace, |path, format| result.whitespace_mask.save_with_format(path, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::white_balance::{CorrectionRatios, WhitePoint};
    use image::{GrayImage, RgbImage};

    fn get_result(filename: &str, collagen_pixels: usize, whitespace_pixels: usize, percent_collagen: f64) -> ImageResult {
        ImageResult {
            filename: filename.to_string(),
            width: 2,
            height: 2,
            white_point: WhitePoint { hsv: [0, 0, 255] },
            ratios: CorrectionRatios { red: 1.0, green: 1.0, blue: 1.0 },
            collagen_pixels,
            whitespace_pixels,
            total_pixels: 4,
            percent_collagen,
            overlay: RgbImage::new(2, 2),
            whitespace_mask: GrayImage::new(2, 2),
        }
    }

    #[test]
    fn test_write_csv(){
        let results = vec![
            get_result("a.png", 1, 2, 50.0),
            get_result("b, stained.png", 0, 4, 0.0),
            get_result("c.tif", 1, 1, 100.0 / 3.0),
        ];
        let mut buffer = Vec::new();

        write_csv(&mut buffer, &results).unwrap();

        let expected = "Filename,Collagen Pixels,Whitespace Pixels,Percent Collagen\n\
                        a.png,1,2,50.0\n\
                        \"b, stained.png\",0,4,0.0\n\
                        c.tif,1,1,33.333333333333336\n";
        assert_eq!(String::from_utf8(buffer).unwrap(), expected);
    }

    #[test]
    fn test_summary(){
        assert_eq!(
            summary(&get_result("a.png", 1, 2, 50.0)),
            "a.png: 50.00% collagen (1 collagen px, 2 whitespace px of 4)"
        );
    }

    #[test]
    fn test_with_suffix(){
        assert_eq!(with_suffix("slide 1.tif", "overlay"), "slide 1.overlay.png");
        assert_eq!(with_suffix("noext", "white"), "noext.white.png");
    }

    #[test]
    fn test_save_results(){
        let dir = tempfile::tempdir().unwrap();
        let results = vec![get_result("a.png", 1, 2, 50.0), get_result("b.bmp", 0, 0, 0.0)];

        let saved = save_results(dir.path(), &results).unwrap();

        assert_eq!(saved.csv, dir.path().join("Results.csv"));
        assert_eq!(saved.overlays, vec![
            dir.path().join("Results").join("a.png"),
            dir.path().join("Results").join("b.bmp"),
        ]);
        assert!(saved.overlays.iter().all(|path| path.is_file()));
        let csv = std::fs::read_to_string(&saved.csv).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_save_results_falls_back_to_png(){
        let dir = tempfile::tempdir().unwrap();
        let mut hdr = get_result("b.hdr", 0, 4, 0.0);
        hdr.overlay = RgbImage::from_pixel(2, 2, image::Rgb([242, 242, 242]));
        let results = vec![get_result("a.png", 1, 2, 50.0), hdr];

        let saved = save_results(dir.path(), &results).unwrap();

        let overlay_dir = dir.path().join("Results");
        assert_eq!(saved.overlays, vec![overlay_dir.join("a.png"), overlay_dir.join("b.hdr.png")]);
        assert!(!overlay_dir.join("b.hdr").exists());
        let overlay = image::open(overlay_dir.join("b.hdr.png")).unwrap().to_rgb8();
        assert_eq!(overlay.get_pixel(1, 1).0, [242, 242, 242]);

        let csv = std::fs::read_to_string(&saved.csv).unwrap();
        assert_eq!(csv.lines().last(), Some("b.hdr,0,4,0.0"));
    }

    #[test]
    fn test_unknown_extension_saved_as_png(){
        let dir = tempfile::tempdir().unwrap();

        let saved = save_results(dir.path(), &[get_result("slide.scan", 0, 4, 0.0)]).unwrap();

        assert_eq!(saved.overlays, vec![dir.path().join("Results").join("slide.scan")]);
        let bytes = std::fs::read(&saved.overlays[0]).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }
}
