// Image loading module
// Handles decoding of photos, orientation correction and the placeholder image

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// A decoded source image ready to be rendered onto the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// RGBA pixels, straight alpha
    pub rgba: RgbaImage,
}

impl ImageData {
    pub fn new(rgba: RgbaImage) -> Self {
        Self { rgba }
    }

    /// Image width in pixels
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Image height in pixels
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

/// Load an image file from disk
pub fn load_path(path: &Path) -> Result<ImageData> {
    let data = fs::read(path)
        .with_context(|| format!("Failed to read image file: {}", path.display()))?;
    load_from_bytes(&data).with_context(|| format!("Failed to load image: {}", path.display()))
}

/// Load an image from raw bytes, auto-detecting the format.
/// EXIF orientation is applied when `correct_orientation` is set.
pub fn decode(data: &[u8], correct_orientation: bool) -> Result<ImageData> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to detect image format")?;
    if reader.format().is_none() {
        anyhow::bail!("Failed to detect image format");
    }

    let mut decoder = reader.into_decoder().context("Failed to open image decoder")?;
    let orientation = decoder.orientation().context("Failed to read image orientation")?;
    let mut img = DynamicImage::from_decoder(decoder).context("Failed to decode image")?;
    if correct_orientation {
        img.apply_orientation(orientation);
    }

    Ok(ImageData::new(img.to_rgba8()))
}

/// Load an image from raw bytes with orientation correction
pub fn load_from_bytes(data: &[u8]) -> Result<ImageData> {
    decode(data, true)
}

/// Scale an image so its height equals `target_height`, keeping the aspect ratio.
/// Images already at the target height are returned unchanged.
pub fn scale_to_height(image: ImageData, target_height: u32) -> ImageData {
    if target_height == 0 || image.height() == target_height {
        return image;
    }
    let scale = target_height as f32 / image.height() as f32;
    let new_width = ((image.width() as f32 * scale).round() as u32).max(1);
    let rgba = image::imageops::resize(&image.rgba, new_width, target_height, FilterType::Lanczos3);
    ImageData::new(rgba)
}

/// Built-in test card used in place of the camera when no device is present
pub fn placeholder_image() -> ImageData {
    const WIDTH: u32 = 640;
    const HEIGHT: u32 = 480;
    const BARS: [[u8; 3]; 7] = [
        [192, 192, 192],
        [192, 192, 0],
        [0, 192, 192],
        [0, 192, 0],
        [192, 0, 192],
        [192, 0, 0],
        [0, 0, 192],
    ];

    let bar_height = HEIGHT * 2 / 3;
    let bar_width = WIDTH.div_ceil(BARS.len() as u32);
    let (cx, cy) = (WIDTH as f32 / 2.0, bar_height as f32 / 2.0);
    let ring = HEIGHT as f32 / 4.0;

    let rgba = RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
        if y >= bar_height {
            // Greyscale ramp along the bottom
            let v = (x * 255 / (WIDTH - 1)) as u8;
            return Rgba([v, v, v, 255]);
        }
        let dist = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
        if (dist - ring).abs() < 3.0 {
            return Rgba([255, 255, 255, 255]);
        }
        let [r, g, b] = BARS[((x / bar_width) as usize).min(BARS.len() - 1)];
        Rgba([r, g, b, 255])
    });

    ImageData::new(rgba)
}

/// Get the appropriate image format from file extension
pub fn format_from_extension(ext: &str) -> Option<ImageFormat> {
    match ext.to_lowercase().as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        "bmp" => Some(ImageFormat::Bmp),
        "ico" => Some(ImageFormat::Ico),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        _ => None,
    }
}
