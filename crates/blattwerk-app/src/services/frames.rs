// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame source for the headless driver: decodes image files into RGBA frames.

use std::path::PathBuf;

use image::RgbaImage;
use tracing::{debug, instrument};

use blattwerk_core::error::Result;
use blattwerk_document::ImageProcessor;

/// Decode every file in `paths`, in order.
#[instrument(skip_all, fields(count = paths.len()))]
pub fn load_frames(paths: &[PathBuf]) -> Result<Vec<RgbaImage>> {
    paths
        .iter()
        .map(|path| -> Result<RgbaImage> {
            let bytes = std::fs::read(path)?;
            let frame = ImageProcessor::from_bytes(&bytes)?.into_rgba();
            debug!(path = %path.display(), width = frame.width(), height = frame.height(), "Frame loaded");
            Ok(frame)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blattwerk_core::BlattwerkError;
    use image::Rgba;

    #[test]
    fn loads_png_frames_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut paths = Vec::new();
        for (i, size) in [(20u32, 10u32), (8, 16)].into_iter().enumerate() {
            let path = dir.path().join(format!("frame{i}.png"));
            RgbaImage::from_pixel(size.0, size.1, Rgba([1, 2, 3, 255]))
                .save(&path)
                .expect("save");
            paths.push(path);
        }

        let frames = load_frames(&paths).expect("load");
        let sizes: Vec<_> = frames.iter().map(RgbaImage::dimensions).collect();
        assert_eq!(sizes, [(20, 10), (8, 16)]);
    }

    #[test]
    fn undecodable_file_is_image_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("junk.png");
        std::fs::write(&path, b"not an image").expect("write");
        assert!(matches!(
            load_frames(&[path]),
            Err(BlattwerkError::ImageError(_))
        ));
    }
}
