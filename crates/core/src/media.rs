//! Picture loading and enhancement.

use image::{imageops, DynamicImage, GenericImageView, RgbaImage};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::shape::{ImageFormat, Picture};
use crate::units::EMU_PER_INCH;

/// Resolution assumed when sizing a picture from its pixel dimensions.
const DEFAULT_DPI: f64 = 72.0;

/// Decoded picture plus its pixel size.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub picture: Picture,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Natural size in EMU at 72 dpi.
    pub fn native_size(&self) -> (i64, i64) {
        let to_emu = |px: u32| (px as f64 / DEFAULT_DPI * EMU_PER_INCH as f64).round() as i64;
        (to_emu(self.width_px), to_emu(self.height_px))
    }

    /// Fill in a missing width or height, keeping the aspect ratio.
    pub fn scaled_size(&self, width: Option<i64>, height: Option<i64>) -> (i64, i64) {
        let (native_w, native_h) = self.native_size();
        match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if native_w > 0 => (w, (w as f64 * native_h as f64 / native_w as f64).round() as i64),
            (None, Some(h)) if native_h > 0 => ((h as f64 * native_w as f64 / native_h as f64).round() as i64, h),
            _ => (native_w, native_h),
        }
    }
}

/// Validate and measure image bytes.
pub fn load_image(data: Vec<u8>) -> Result<LoadedImage> {
    let format = ImageFormat::from_magic(&data)
        .ok_or_else(|| Error::UnsupportedFormat("unrecognized image data".to_string()))?;
    let decoded = image::load_from_memory(&data)?;
    let (width_px, height_px) = decoded.dimensions();
    Ok(LoadedImage {
        picture: Picture::new(data, format),
        width_px,
        height_px,
    })
}

pub fn load_image_file(path: &Path) -> Result<LoadedImage> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "Image file not found: {}",
            path.display()
        )));
    }
    let mut loaded = load_image(std::fs::read(path)?)?;
    loaded.picture.description = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(loaded)
}

/// Convolution filters that can follow the tonal adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhanceFilter {
    Blur,
    Sharpen,
    Smooth,
    EdgeEnhance,
}

impl EnhanceFilter {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BLUR" => Some(EnhanceFilter::Blur),
            "SHARPEN" => Some(EnhanceFilter::Sharpen),
            "SMOOTH" => Some(EnhanceFilter::Smooth),
            "EDGE_ENHANCE" => Some(EnhanceFilter::EdgeEnhance),
            _ => None,
        }
    }
}

/// Tonal adjustments; 1.0 leaves a channel unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhancement {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub sharpness: f32,
    pub blur_radius: f32,
    pub filter: Option<EnhanceFilter>,
}

impl Default for Enhancement {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            sharpness: 1.0,
            blur_radius: 0.0,
            filter: None,
        }
    }
}

impl Enhancement {
    /// Named preset: `presentation`, `bright`, or `soft`. Unknown names use `presentation`.
    pub fn preset(style: &str) -> Self {
        match style {
            "bright" => Self {
                brightness: 1.2,
                contrast: 1.1,
                saturation: 1.2,
                sharpness: 1.1,
                ..Default::default()
            },
            "soft" => Self {
                brightness: 1.05,
                contrast: 0.95,
                saturation: 0.95,
                sharpness: 0.9,
                blur_radius: 0.5,
                ..Default::default()
            },
            _ => Self {
                brightness: 1.1,
                contrast: 1.15,
                saturation: 1.1,
                sharpness: 1.2,
                ..Default::default()
            },
        }
    }

    pub fn apply(&self, image: &DynamicImage) -> DynamicImage {
        let mut rgba = image.to_rgba8();

        if self.brightness != 1.0 {
            let f = self.brightness;
            map_rgb(&mut rgba, |c| c * f);
        }
        if self.contrast != 1.0 {
            let mean = mean_luma(&rgba);
            let f = self.contrast;
            map_rgb(&mut rgba, |c| mean + (c - mean) * f);
        }
        if self.saturation != 1.0 {
            let f = self.saturation;
            for pixel in rgba.pixels_mut() {
                let [r, g, b, _] = pixel.0;
                let gray = luma(r, g, b);
                for channel in pixel.0.iter_mut().take(3) {
                    *channel = clamp(gray + (*channel as f32 - gray) * f);
                }
            }
        }
        if self.sharpness != 1.0 {
            let smooth = imageops::blur(&rgba, 1.0);
            let f = self.sharpness;
            for (pixel, soft) in rgba.pixels_mut().zip(smooth.pixels()) {
                for i in 0..3 {
                    let base = soft.0[i] as f32;
                    pixel.0[i] = clamp(base + (pixel.0[i] as f32 - base) * f);
                }
            }
        }
        if self.blur_radius > 0.0 {
            rgba = imageops::blur(&rgba, self.blur_radius);
        }
        if let Some(filter) = self.filter {
            rgba = match filter {
                EnhanceFilter::Blur => imageops::blur(&rgba, 2.0),
                EnhanceFilter::Sharpen => {
                    imageops::filter3x3(&rgba, &[-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0])
                }
                EnhanceFilter::Smooth => {
                    imageops::filter3x3(&rgba, &[1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0])
                }
                EnhanceFilter::EdgeEnhance => {
                    imageops::filter3x3(&rgba, &[-1.0, -1.0, -1.0, -1.0, 10.0, -1.0, -1.0, -1.0, -1.0])
                }
            };
        }

        DynamicImage::ImageRgba8(rgba)
    }
}

fn clamp(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

fn mean_luma(image: &RgbaImage) -> f32 {
    let count = image.pixels().len();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = image
        .pixels()
        .map(|p| luma(p.0[0], p.0[1], p.0[2]) as f64)
        .sum();
    (total / count as f64) as f32
}

fn map_rgb(image: &mut RgbaImage, f: impl Fn(f32) -> f32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = clamp(f(*channel as f32));
        }
    }
}

/// Enhance an image file and write the result.
///
/// Without `output`, the result goes to a new `.png` file in the temp directory.
pub fn enhance_image_file(input: &Path, enhancement: &Enhancement, output: Option<&Path>) -> Result<PathBuf> {
    if !input.exists() {
        return Err(Error::NotFound(format!(
            "Image file not found: {}",
            input.display()
        )));
    }
    let source = image::open(input)?;
    let enhanced = enhancement.apply(&source);

    let target = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let (_, path) = tempfile::Builder::new()
                .prefix("enhanced-")
                .suffix(".png")
                .tempfile()?
                .keep()
                .map_err(|e| Error::IoError(e.error))?;
            path
        }
    };
    enhanced.save(&target)?;
    log::debug!("enhanced {} -> {}", input.display(), target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_load_image_measures_pixels() {
        let loaded = load_image(png_bytes(144, 72, [10, 20, 30, 255])).unwrap();
        assert_eq!(loaded.picture.format, ImageFormat::Png);
        assert_eq!((loaded.width_px, loaded.height_px), (144, 72));
        assert_eq!(loaded.native_size(), (2 * EMU_PER_INCH, EMU_PER_INCH));
        assert_eq!(
            loaded.scaled_size(Some(EMU_PER_INCH), None),
            (EMU_PER_INCH, EMU_PER_INCH / 2)
        );
    }

    #[test]
    fn test_load_image_rejects_garbage() {
        assert!(load_image(b"definitely not an image".to_vec()).is_err());
    }

    #[test]
    fn test_brightness_scales_channels() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255])));
        let out = Enhancement {
            brightness: 1.5,
            ..Default::default()
        }
        .apply(&img)
        .to_rgba8();
        assert_eq!(out.get_pixel(0, 0).0, [150, 150, 150, 255]);
    }

    #[test]
    fn test_saturation_zero_is_grayscale() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255])));
        let out = Enhancement {
            saturation: 0.0,
            ..Default::default()
        }
        .apply(&img)
        .to_rgba8();
        let [r, g, b, _] = out.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_presets_and_filters() {
        assert_eq!(Enhancement::preset("soft").blur_radius, 0.5);
        assert_eq!(Enhancement::preset("unknown"), Enhancement::preset("presentation"));
        assert_eq!(EnhanceFilter::from_name("edge_enhance"), Some(EnhanceFilter::EdgeEnhance));
        assert_eq!(EnhanceFilter::from_name("emboss"), None);
    }

    #[test]
    fn test_enhance_image_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        std::fs::write(&input, png_bytes(4, 4, [50, 60, 70, 255])).unwrap();
        let output = dir.path().join("out.png");
        let written =
            enhance_image_file(&input, &Enhancement::preset("bright"), Some(&output)).unwrap();
        assert_eq!(written, output);
        assert!(load_image_file(&output).is_ok());
    }

    #[test]
    fn test_enhance_missing_file() {
        let err = enhance_image_file(Path::new("/no/such/image.png"), &Enhancement::default(), None)
            .unwrap_err();
        assert!(err.to_string().starts_with("Image file not found"));
    }
}
