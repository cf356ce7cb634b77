//! Image Preprocessing Module
//!
//! Turns an arbitrary decoded image into the fixed (1, 32, 32, 3) tensor the
//! classifier expects: resize, force three channels, scale to [0, 1].

use image::{imageops, imageops::FilterType, DynamicImage, GrayImage, ImageBuffer, Pixel, RgbImage};

use crate::utils::error::{ClassifierError, Result};
use crate::{IMAGE_SIZE, NUM_CHANNELS};

/// Channel layouts the preprocessor accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Single luminance channel
    Gray,
    /// Red, green, blue
    Rgb,
    /// Red, green, blue plus alpha
    Rgba,
}

impl ChannelLayout {
    /// Classify a decoded image by channel count
    ///
    /// Layouts other than 1, 3 or 4 channels (e.g. gray + alpha) are rejected.
    pub fn of(image: &DynamicImage) -> Result<Self> {
        match image.color().channel_count() {
            1 => Ok(ChannelLayout::Gray),
            3 => Ok(ChannelLayout::Rgb),
            4 => Ok(ChannelLayout::Rgba),
            n => Err(ClassifierError::UnsupportedChannels(n)),
        }
    }

    /// Number of channels in this layout
    pub fn channels(&self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }
}

/// Normalized image tensor in NHWC layout with a batch size of one
///
/// Values are `f32` in [0.0, 1.0] and there are always exactly three channels.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f32>,
    height: usize,
    width: usize,
}

impl NormalizedTensor {
    /// Tensor shape as `[batch, height, width, channels]`
    pub fn shape(&self) -> [usize; 4] {
        [1, self.height, self.width, NUM_CHANNELS]
    }

    /// Value at row `y`, column `x`, channel `c`
    pub fn get(&self, y: usize, x: usize, c: usize) -> Option<f32> {
        if y >= self.height || x >= self.width || c >= NUM_CHANNELS {
            return None;
        }
        self.data
            .get((y * self.width + x) * NUM_CHANNELS + c)
            .copied()
    }

    /// Flat NHWC data
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Preprocessor producing classifier input from decoded images
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    /// Side length of the square output
    pub target_size: u32,

    /// Resampling filter used for resizing
    pub filter: FilterType,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            target_size: IMAGE_SIZE as u32,
            // Bicubic, matching PIL's default resize filter
            filter: FilterType::CatmullRom,
        }
    }
}

impl Preprocessor {
    /// Create a preprocessor with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure output size
    pub fn with_target_size(mut self, size: u32) -> Self {
        self.target_size = size;
        self
    }

    /// Configure resampling filter
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Preprocess a decoded image into a normalized tensor
    pub fn preprocess(&self, image: &DynamicImage) -> Result<NormalizedTensor> {
        let layout = ChannelLayout::of(image)?;
        let size = self.target_size;

        // Deeper bit depths are reduced to 8 bits per channel first so that
        // scaling by 1/255 always lands in [0, 1].
        let data = match layout {
            ChannelLayout::Gray => {
                let resized: GrayImage = imageops::resize(&image.to_luma8(), size, size, self.filter);
                normalize(&resized, |p| {
                    let v = p[0];
                    [v, v, v]
                })
            }
            ChannelLayout::Rgb => {
                let resized = imageops::resize(&image.to_rgb8(), size, size, self.filter);
                normalize(&resized, |p| [p[0], p[1], p[2]])
            }
            ChannelLayout::Rgba => {
                // Resampling is per channel, so dropping alpha before the resize
                // gives the same result as dropping it after.
                let rgb = strip_alpha(image);
                let resized = imageops::resize(&rgb, size, size, self.filter);
                normalize(&resized, |p| [p[0], p[1], p[2]])
            }
        };

        Ok(NormalizedTensor {
            data,
            height: size as usize,
            width: size as usize,
        })
    }

    /// Decode raw bytes and preprocess them
    pub fn preprocess_bytes(&self, bytes: &[u8]) -> Result<NormalizedTensor> {
        let image = image::load_from_memory(bytes)?;
        self.preprocess(&image)
    }
}

/// Keep the first three channels of an RGBA image
fn strip_alpha(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        image::Rgb([p[0], p[1], p[2]])
    })
}

/// Flatten an 8-bit image to NHWC floats, mapping each pixel to RGB
fn normalize<P, F>(image: &ImageBuffer<P, Vec<u8>>, to_rgb: F) -> Vec<f32>
where
    P: Pixel<Subpixel = u8>,
    F: Fn(&P) -> [u8; 3],
{
    let mut data = Vec::with_capacity(image.width() as usize * image.height() as usize * NUM_CHANNELS);
    for pixel in image.pixels() {
        for v in to_rgb(pixel) {
            data.push(v as f32 / 255.0);
        }
    }
    data
}
