// Filter module
// Named photo presets built from per-pixel adjustments, and the applier that
// renders a source image through them onto the canvas

use crate::canvas::CanvasSurface;
use crate::image_loader::ImageData;
use image::RgbaImage;
use log::debug;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Preset name that reverts to the unfiltered image
pub const ORIGINAL: &str = "original";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter preset: {0}")]
    UnknownPreset(String),
}

/// A single image adjustment. Percent-style amounts follow the usual
/// photo-editor convention of roughly -100..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Vibrance(f32),
    /// Sepia strength 0..=100
    Sepia(f32),
    Greyscale,
    Gamma(f32),
    Exposure(f32),
    /// Per-channel push towards 255 (positive) or 0 (negative), in percent
    Channels { red: f32, green: f32, blue: f32 },
    /// Blend towards a color by `level` percent
    Colorize { rgb: [u8; 3], level: f32 },
    /// Reduce each channel to this many levels
    Posterize(u8),
    /// Snap values within this distance of 0 or 255 to the bound
    Clip(f32),
    /// Deterministic per-pixel noise of +/- amount
    Noise(f32),
    /// Unsharp mask strength
    Sharpen(f32),
    /// Darken towards the corners, starting `size` percent of the short side
    /// from the center
    Vignette { size: f32, strength: f32 },
}

impl Adjustment {
    /// Apply the adjustment in place
    pub fn apply(&self, img: &mut RgbaImage) {
        match *self {
            Adjustment::Sharpen(amount) => sharpen(img, amount),
            Adjustment::Vignette { size, strength } => vignette(img, size, strength),
            Adjustment::Noise(amount) => {
                for (x, y, pixel) in img.enumerate_pixels_mut() {
                    let n = (hash_noise(x, y) * 2.0 - 1.0) * amount;
                    for c in 0..3 {
                        pixel[c] = clamp_u8(pixel[c] as f32 + n);
                    }
                }
            }
            _ => {
                for pixel in img.pixels_mut() {
                    let rgb = [pixel[0] as f32, pixel[1] as f32, pixel[2] as f32];
                    let [r, g, b] = self.apply_rgb(rgb);
                    pixel[0] = clamp_u8(r);
                    pixel[1] = clamp_u8(g);
                    pixel[2] = clamp_u8(b);
                }
            }
        }
    }

    /// Per-pixel color math. Spatial adjustments pass colors through unchanged.
    fn apply_rgb(&self, [r, g, b]: [f32; 3]) -> [f32; 3] {
        match *self {
            Adjustment::Brightness(amount) => {
                let delta = (255.0 * amount / 100.0).floor();
                [r + delta, g + delta, b + delta]
            }
            Adjustment::Contrast(amount) => {
                let factor = ((amount + 100.0) / 100.0).powi(2);
                let f = |c: f32| ((c / 255.0 - 0.5) * factor + 0.5) * 255.0;
                [f(r), f(g), f(b)]
            }
            Adjustment::Saturation(amount) => {
                let adj = amount * -0.01;
                let max = r.max(g).max(b);
                let f = |c: f32| if c == max { c } else { c + (max - c) * adj };
                [f(r), f(g), f(b)]
            }
            Adjustment::Vibrance(amount) => {
                let max = r.max(g).max(b);
                let avg = (r + g + b) / 3.0;
                let amt = ((max - avg).abs() * 2.0 / 255.0) * -amount / 100.0;
                let f = |c: f32| if c == max { c } else { c + (max - c) * amt };
                [f(r), f(g), f(b)]
            }
            Adjustment::Sepia(amount) => {
                let a = amount / 100.0;
                [
                    (r * (1.0 - 0.607 * a) + g * 0.769 * a + b * 0.189 * a).min(255.0),
                    (r * 0.349 * a + g * (1.0 - 0.314 * a) + b * 0.168 * a).min(255.0),
                    (r * 0.272 * a + g * 0.534 * a + b * (1.0 - 0.869 * a)).min(255.0),
                ]
            }
            Adjustment::Greyscale => {
                let v = 0.3 * r + 0.59 * g + 0.11 * b;
                [v, v, v]
            }
            Adjustment::Gamma(gamma) => {
                let f = |c: f32| 255.0 * (c / 255.0).powf(gamma);
                [f(r), f(g), f(b)]
            }
            Adjustment::Exposure(amount) => {
                let p = amount.abs() / 100.0;
                let exponent = if amount >= 0.0 { 1.0 / (1.0 + p) } else { 1.0 + p };
                let f = |c: f32| 255.0 * (c / 255.0).powf(exponent);
                [f(r), f(g), f(b)]
            }
            Adjustment::Channels { red, green, blue } => {
                let f = |c: f32, pct: f32| {
                    if pct > 0.0 {
                        c + (255.0 - c) * pct / 100.0
                    } else {
                        c - c * pct.abs() / 100.0
                    }
                };
                [f(r, red), f(g, green), f(b, blue)]
            }
            Adjustment::Colorize { rgb, level } => {
                let f = |c: f32, target: u8| c - (c - target as f32) * level / 100.0;
                [f(r, rgb[0]), f(g, rgb[1]), f(b, rgb[2])]
            }
            Adjustment::Posterize(levels) => {
                let levels = levels.max(2) as f32;
                let areas = 256.0 / levels;
                let values = 255.0 / (levels - 1.0);
                let f = |c: f32| ((c / areas).floor() * values).floor();
                [f(r), f(g), f(b)]
            }
            Adjustment::Clip(amount) => {
                let f = |c: f32| {
                    if c > 255.0 - amount {
                        255.0
                    } else if c < amount {
                        0.0
                    } else {
                        c
                    }
                };
                [f(r), f(g), f(b)]
            }
            Adjustment::Noise(_) | Adjustment::Sharpen(_) | Adjustment::Vignette { .. } => {
                [r, g, b]
            }
        }
    }
}

fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Stable pseudo-random value in [0, 1) for a pixel position
fn hash_noise(x: u32, y: u32) -> f32 {
    let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    (h & 0xFFFF) as f32 / 65536.0
}

fn sharpen(img: &mut RgbaImage, amount: f32) {
    if amount <= 0.0 {
        return;
    }
    let sigma = 0.5 + amount / 40.0;
    *img = image::imageops::unsharpen(img, sigma, 2);
}

fn vignette(img: &mut RgbaImage, size: f32, strength: f32) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let inner = w.min(h) as f32 * size / 100.0;
    let outer = (cx * cx + cy * cy).sqrt();
    if outer <= inner {
        return;
    }
    let strength = strength / 100.0;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let dist = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
        if dist <= inner {
            continue;
        }
        let t = ((dist - inner) / (outer - inner)).min(1.0);
        let keep = 1.0 - t * t * strength;
        for c in 0..3 {
            pixel[c] = clamp_u8(pixel[c] as f32 * keep);
        }
    }
}

/// Named filter presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Vintage,
    Lomo,
    Clarity,
    SinCity,
    Sunrise,
    CrossProcess,
    OrangePeel,
    Love,
    Pinhole,
    Nostalgia,
    Hemingway,
    Concentrate,
}

impl Preset {
    /// Every preset, in menu order
    pub const ALL: [Preset; 12] = [
        Preset::Vintage,
        Preset::Lomo,
        Preset::Clarity,
        Preset::SinCity,
        Preset::Sunrise,
        Preset::CrossProcess,
        Preset::OrangePeel,
        Preset::Love,
        Preset::Pinhole,
        Preset::Nostalgia,
        Preset::Hemingway,
        Preset::Concentrate,
    ];

    /// Identifier used by buttons and the command line
    pub fn name(self) -> &'static str {
        match self {
            Preset::Vintage => "vintage",
            Preset::Lomo => "lomo",
            Preset::Clarity => "clarity",
            Preset::SinCity => "sinCity",
            Preset::Sunrise => "sunrise",
            Preset::CrossProcess => "crossProcess",
            Preset::OrangePeel => "orangePeel",
            Preset::Love => "love",
            Preset::Pinhole => "pinhole",
            Preset::Nostalgia => "nostalgia",
            Preset::Hemingway => "hemingway",
            Preset::Concentrate => "concentrate",
        }
    }

    /// The adjustments making up this preset, applied in order
    pub fn recipe(self) -> Vec<Adjustment> {
        use Adjustment::*;
        match self {
            Preset::Vintage => vec![
                Greyscale,
                Contrast(5.0),
                Noise(3.0),
                Sepia(100.0),
                Channels { red: 8.0, green: 4.0, blue: 2.0 },
                Gamma(0.87),
                Vignette { size: 40.0, strength: 30.0 },
            ],
            Preset::Lomo => vec![
                Brightness(15.0),
                Exposure(15.0),
                Saturation(-20.0),
                Gamma(1.8),
                Vignette { size: 50.0, strength: 60.0 },
                Brightness(5.0),
            ],
            Preset::Clarity => vec![
                Vibrance(20.0),
                Contrast(10.0),
                Sharpen(15.0),
                Vignette { size: 45.0, strength: 20.0 },
            ],
            Preset::SinCity => vec![
                Contrast(100.0),
                Brightness(15.0),
                Exposure(10.0),
                Posterize(80),
                Clip(30.0),
                Greyscale,
            ],
            Preset::Sunrise => vec![
                Exposure(3.5),
                Saturation(-5.0),
                Vibrance(50.0),
                Sepia(60.0),
                Colorize { rgb: [0xe8, 0x7b, 0x22], level: 10.0 },
                Channels { red: 8.0, green: 0.0, blue: 8.0 },
                Contrast(5.0),
                Gamma(1.2),
                Vignette { size: 55.0, strength: 25.0 },
            ],
            Preset::CrossProcess => vec![
                Exposure(5.0),
                Colorize { rgb: [0xe8, 0x7b, 0x22], level: 4.0 },
                Sepia(20.0),
                Channels { red: 3.0, green: 0.0, blue: 8.0 },
                Contrast(15.0),
                Vibrance(75.0),
                Gamma(1.6),
            ],
            Preset::OrangePeel => vec![
                Vibrance(-30.0),
                Saturation(-30.0),
                Colorize { rgb: [0xff, 0x90, 0x00], level: 30.0 },
                Contrast(-5.0),
                Gamma(1.4),
            ],
            Preset::Love => vec![
                Brightness(5.0),
                Exposure(8.0),
                Contrast(4.0),
                Colorize { rgb: [0xc4, 0x20, 0x07], level: 30.0 },
                Vibrance(50.0),
                Gamma(1.3),
            ],
            Preset::Pinhole => vec![
                Greyscale,
                Sepia(10.0),
                Exposure(10.0),
                Contrast(15.0),
                Vignette { size: 60.0, strength: 35.0 },
            ],
            Preset::Nostalgia => vec![
                Saturation(20.0),
                Gamma(1.4),
                Greyscale,
                Contrast(5.0),
                Sepia(100.0),
                Channels { red: 8.0, green: 4.0, blue: 2.0 },
                Gamma(0.8),
                Contrast(5.0),
                Exposure(10.0),
                Vignette { size: 50.0, strength: 30.0 },
            ],
            Preset::Hemingway => vec![
                Greyscale,
                Contrast(10.0),
                Gamma(0.9),
                Colorize { rgb: [0x66, 0x66, 0x66], level: 15.0 },
                Exposure(10.0),
                Vignette { size: 60.0, strength: 35.0 },
            ],
            Preset::Concentrate => vec![
                Sharpen(40.0),
                Saturation(-50.0),
                Channels { red: 3.0, green: 0.0, blue: 0.0 },
                Contrast(10.0),
            ],
        }
    }

    /// Run the recipe over an image
    pub fn apply(self, img: &mut RgbaImage) {
        for adjustment in self.recipe() {
            adjustment.apply(img);
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| FilterError::UnknownPreset(s.to_string()))
    }
}

/// What a preset button asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSelection {
    /// Drop all filters and show the source as loaded
    Revert,
    Preset(Preset),
}

impl FromStr for FilterSelection {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ORIGINAL {
            Ok(FilterSelection::Revert)
        } else {
            s.parse().map(FilterSelection::Preset)
        }
    }
}

/// Renders source images onto the canvas, optionally through a preset
#[derive(Debug, Default)]
pub struct FilterApplier;

impl FilterApplier {
    pub fn new() -> Self {
        Self
    }

    /// Overwrite the canvas with `source`. `None` and `Revert` both render the
    /// image unmodified; a preset renders it through that preset.
    pub fn apply_preset(
        &self,
        canvas: &mut CanvasSurface,
        source: &ImageData,
        selection: Option<FilterSelection>,
    ) {
        match selection {
            None | Some(FilterSelection::Revert) => {
                debug!("Rendering unfiltered image {}x{}", source.width(), source.height());
                canvas.draw_image_fitted(source);
            }
            Some(FilterSelection::Preset(preset)) => {
                debug!("Rendering image through preset {}", preset);
                let mut filtered = source.rgba.clone();
                preset.apply(&mut filtered);
                canvas.draw_image_fitted(&ImageData::new(filtered));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn one_pixel(rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    fn adjusted(adjustment: Adjustment, rgb: [u8; 3]) -> [u8; 3] {
        let mut img = one_pixel(rgb);
        adjustment.apply(&mut img);
        let p = img.get_pixel(0, 0);
        [p[0], p[1], p[2]]
    }

    #[test]
    fn parses_every_preset_name_and_original() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>(), Ok(preset));
        }
        assert_eq!("original".parse::<FilterSelection>(), Ok(FilterSelection::Revert));
        assert_eq!(
            "sinCity".parse::<FilterSelection>(),
            Ok(FilterSelection::Preset(Preset::SinCity))
        );
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert_eq!(
            "sepiaXXL".parse::<FilterSelection>(),
            Err(FilterError::UnknownPreset("sepiaXXL".to_string()))
        );
    }

    #[test]
    fn greyscale_uses_luma_weights() {
        assert_eq!(adjusted(Adjustment::Greyscale, [255, 0, 0]), [77, 77, 77]);
    }

    #[test]
    fn brightness_and_clamping() {
        assert_eq!(adjusted(Adjustment::Brightness(10.0), [100, 250, 0]), [125, 255, 25]);
        assert_eq!(adjusted(Adjustment::Brightness(-100.0), [100, 200, 50]), [0, 0, 0]);
    }

    #[test]
    fn zero_contrast_is_identity() {
        assert_eq!(adjusted(Adjustment::Contrast(0.0), [12, 128, 240]), [12, 128, 240]);
    }

    #[test]
    fn full_desaturation_goes_to_max_channel() {
        assert_eq!(adjusted(Adjustment::Saturation(-100.0), [200, 100, 50]), [200, 200, 200]);
    }

    #[test]
    fn posterize_two_levels() {
        assert_eq!(adjusted(Adjustment::Posterize(2), [10, 127, 200]), [0, 0, 255]);
    }

    #[test]
    fn clip_snaps_to_bounds() {
        assert_eq!(adjusted(Adjustment::Clip(30.0), [20, 100, 230]), [0, 100, 255]);
    }

    #[test]
    fn vignette_leaves_center_and_darkens_corner() {
        let mut img = RgbaImage::from_pixel(101, 101, Rgba([200, 200, 200, 255]));
        Adjustment::Vignette { size: 40.0, strength: 60.0 }.apply(&mut img);
        assert_eq!(img.get_pixel(50, 50), &Rgba([200, 200, 200, 255]));
        assert!(img.get_pixel(0, 0)[0] < 120);
    }

    #[test]
    fn alpha_is_untouched() {
        let mut img = RgbaImage::from_pixel(3, 3, Rgba([90, 60, 30, 128]));
        Preset::Vintage.apply(&mut img);
        assert!(img.pixels().all(|p| p[3] == 128));
    }

    #[test]
    fn revert_renders_source_unmodified() {
        let source = ImageData::new(RgbaImage::from_pixel(8, 8, Rgba([10, 200, 30, 255])));
        let mut canvas = CanvasSurface::new(8, 8);
        let applier = FilterApplier::new();

        applier.apply_preset(&mut canvas, &source, Some(FilterSelection::Preset(Preset::SinCity)));
        assert_ne!(canvas.pixels(), &source.rgba);

        applier.apply_preset(&mut canvas, &source, Some(FilterSelection::Revert));
        assert_eq!(canvas.pixels(), &source.rgba);

        applier.apply_preset(&mut canvas, &source, None);
        assert_eq!(canvas.pixels(), &source.rgba);
    }

    #[test]
    fn every_preset_runs_on_a_small_image() {
        for preset in Preset::ALL {
            let mut img = RgbaImage::from_fn(16, 9, |x, y| Rgba([(x * 15) as u8, (y * 25) as u8, 90, 255]));
            preset.apply(&mut img);
            assert_eq!(img.dimensions(), (16, 9));
        }
    }
}
