// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderer — canonical orientation, normalized crop and preset applied
// to an in-memory RGBA capture using the `image` crate.

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{Preset, Rotation};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use tracing::{debug, info, instrument};

use crate::image::preset::apply_preset;
use crate::page::edits::CropRect;

/// Rendering pipeline operating on a single in-memory image.
///
/// Each method consumes `self` and returns the transformed processor, so a
/// page render reads top to bottom:
///
/// ```ignore
/// let preview = ImageProcessor::from_rgba(base.clone())
///     .rotate(Rotation::Deg90)
///     .crop_normalized(&crop)?
///     .apply_preset(Preset::Ocr)
///     .into_rgba();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: RgbaImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Wrap an RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| {
            BlattwerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self {
            image: img.to_rgba8(),
        })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Rotate clockwise by a quarter-turn multiple. Lossless.
    pub fn rotate(self, rotation: Rotation) -> Self {
        let image = match rotation {
            Rotation::Deg0 => return self,
            Rotation::Deg90 => imageops::rotate90(&self.image),
            Rotation::Deg180 => imageops::rotate180(&self.image),
            Rotation::Deg270 => imageops::rotate270(&self.image),
        };
        Self { image }
    }

    /// Crop to a rectangle given in normalized coordinates.
    ///
    /// The pixel rectangle always covers at least one pixel and stays inside
    /// the image. Fails only for an image without pixels.
    pub fn crop_normalized(self, crop: &CropRect) -> Result<Self> {
        let (img_w, img_h) = self.image.dimensions();
        if img_w == 0 || img_h == 0 {
            return Err(BlattwerkError::Render(format!(
                "cannot crop a {}x{} image",
                img_w, img_h
            )));
        }

        let (x, y, w, h) = crop.to_pixels(img_w, img_h);
        if (x, y, w, h) == (0, 0, img_w, img_h) {
            return Ok(self);
        }
        debug!(x, y, w, h, "Cropping image");
        let cropped = imageops::crop_imm(&self.image, x, y, w, h).to_image();
        Ok(Self { image: cropped })
    }

    /// Apply a page preset.
    pub fn apply_preset(self, preset: Preset) -> Self {
        Self {
            image: apply_preset(&self.image, preset),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        DynamicImage::ImageRgba8(self.image.clone())
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| BlattwerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Produce a page preview: rotate to the canonical orientation, crop, then
/// apply the effective preset.
#[instrument(skip(base), fields(width = base.width(), height = base.height(), rotation = rotation.degrees()))]
pub fn render(
    base: &RgbaImage,
    rotation: Rotation,
    crop: &CropRect,
    preset: Preset,
) -> Result<RgbaImage> {
    let preview = ImageProcessor::from_rgba(base.clone())
        .rotate(rotation)
        .crop_normalized(crop)?
        .apply_preset(preset)
        .into_rgba();
    info!(
        out_w = preview.width(),
        out_h = preview.height(),
        preset = ?preset,
        "Page rendered"
    );
    Ok(preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 4x2 image whose red channel encodes the pixel index.
    fn indexed() -> RgbaImage {
        RgbaImage::from_fn(4, 2, |x, y| Rgba([(y * 4 + x) as u8, 0, 0, 255]))
    }

    #[test]
    fn rotate_quarter_turns_swap_dimensions() {
        let rotated = ImageProcessor::from_rgba(indexed()).rotate(Rotation::Deg90);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
        // Clockwise: the bottom-left pixel moves to the top-left.
        assert_eq!(rotated.as_rgba().get_pixel(0, 0).0[0], 4);

        let back = rotated.rotate(Rotation::Deg270);
        assert_eq!(back.into_rgba(), indexed());
    }

    #[test]
    fn full_crop_is_noop() {
        let out = ImageProcessor::from_rgba(indexed())
            .crop_normalized(&CropRect::FULL)
            .expect("crop");
        assert_eq!(out.into_rgba(), indexed());
    }

    #[test]
    fn crop_selects_right_half() {
        let half = CropRect::new(0.5, 0.0, 0.5, 1.0);
        let out = ImageProcessor::from_rgba(indexed())
            .crop_normalized(&half)
            .expect("crop")
            .into_rgba();
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.get_pixel(0, 0).0[0], 2);
        assert_eq!(out.get_pixel(1, 1).0[0], 7);
    }

    #[test]
    fn crop_of_empty_image_is_render_error() {
        let result = ImageProcessor::from_rgba(RgbaImage::new(0, 0)).crop_normalized(&CropRect::FULL);
        assert!(matches!(result, Err(BlattwerkError::Render(_))));
    }

    #[test]
    fn render_rotates_before_cropping() {
        let base = RgbaImage::from_fn(200, 100, |x, _| {
            let v = if x < 100 { 0 } else { 255 };
            Rgba([v, v, v, 255])
        });
        // After a clockwise turn the bright half is at the bottom.
        let top_half = CropRect::new(0.0, 0.0, 1.0, 0.5);
        let preview = render(&base, Rotation::Deg90, &top_half, Preset::Color).expect("render");
        assert_eq!(preview.dimensions(), (100, 100));
        assert!(preview.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn png_round_trip_decodes() {
        let processor = ImageProcessor::from_rgba(indexed());
        let png = processor.to_png_bytes().expect("encode");
        let decoded = ImageProcessor::from_bytes(&png).expect("decode");
        assert_eq!(decoded.into_rgba(), indexed());
    }
}
