use std::path::Path;

use image::{DynamicImage, ImageDecoder, ImageReader, ImageResult, Rgb, RgbImage};
use itertools::Itertools;
use log::debug;

use crate::error::{Error, Result};

/// A decoded input image and the filename it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    pub filename: String,
    pub pixels: RgbImage,
}

/// Guesses the format from file contents and applies the EXIF orientation.
pub fn decode(path: &Path) -> ImageResult<DynamicImage> {
    let mut decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);
    Ok(image)
}

/// 8-bit RGB. 16-bit samples keep their high byte, so `0x01FF` becomes 1.
pub fn to_rgb8(image: &DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => {
            let wide = image.to_rgb16();
            RgbImage::from_fn(wide.width(), wide.height(), |x, y| {
                Rgb(wide.get_pixel(x, y).0.map(|value| (value >> 8) as u8))
            })
        }
        _ => image.to_rgb8(),
    }
}

/// Decodes every regular file directly inside `path`, in ascending filename order.
///
/// Files that fail to decode are skipped, or returned as an error when `strict` is set.
pub fn load_images(path: &Path, strict: bool) -> Result<Vec<SourceImage>> {
    let read_dir_error = |source| Error::ReadDir {
        path: path.to_path_buf(),
        source,
    };

    let entries = std::fs::read_dir(path)
        .map_err(read_dir_error)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_dir_error)?;

    let mut images = Vec::with_capacity(entries.len());
    for entry in entries.into_iter().sorted_by_key(|entry| entry.file_name()) {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();

        match decode(&file_path) {
            Ok(image) => images.push(SourceImage {
                filename,
                pixels: to_rgb8(&image),
            }),
            Err(source) if strict => return Err(Error::Decode { filename, source }),
            Err(e) => debug!("skipping {filename}: {e}"),
        }
    }
    Ok(images)
}
