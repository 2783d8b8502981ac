// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document assembler — one PDF page per page preview using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`. Every page takes the size of its own preview at the
// configured resolution; nothing is scaled to a paper format.

use image::RgbaImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use blattwerk_core::error::{BlattwerkError, Result};

use crate::integrity::hash_bytes;

const MM_PER_INCH: f32 = 25.4;

/// A finished PDF plus what callers need to file it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Lowercase hex SHA-256 of `bytes`.
    pub sha256: String,
}

impl AssembledDocument {
    /// Whether `bytes` still hash to the recorded digest.
    pub fn verify(&self) -> bool {
        hash_bytes(&self.bytes) == self.sha256
    }
}

/// Lays page images out into a PDF.
#[derive(Debug, Clone, Copy)]
pub struct DocumentAssembler {
    /// Pixels per inch used to turn image pixels into page millimetres.
    dpi: f32,
}

impl DocumentAssembler {
    pub fn new(dpi: f32) -> Self {
        Self { dpi }
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Page size for an image of `width` x `height` pixels.
    pub fn page_size(&self, width: u32, height: u32) -> (Mm, Mm) {
        let to_mm = |px: u32| Mm(px as f32 / self.dpi * MM_PER_INCH);
        (to_mm(width), to_mm(height))
    }

    /// Build one PDF with a page per image, in iteration order.
    #[instrument(skip(self, pages), fields(dpi = self.dpi))]
    pub fn assemble<'a, I>(&self, title: &str, pages: I) -> Result<AssembledDocument>
    where
        I: IntoIterator<Item = &'a RgbaImage>,
    {
        if self.dpi.is_nan() || self.dpi <= 0.0 {
            return Err(BlattwerkError::PdfError(format!(
                "resolution must be positive, got {}",
                self.dpi
            )));
        }

        let mut doc = PdfDocument::new(title);
        let mut pdf_pages: Vec<PdfPage> = Vec::new();

        for (index, image) in pages.into_iter().enumerate() {
            let (width, height) = image.dimensions();
            if width == 0 || height == 0 {
                return Err(BlattwerkError::PdfError(format!(
                    "page {} has no pixels",
                    index + 1
                )));
            }

            // PDF images carry no alpha here; flatten to RGB.
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: Some(1.0),
                    scale_y: Some(1.0),
                    dpi: Some(self.dpi),
                    rotate: None,
                },
            }];

            let (page_w, page_h) = self.page_size(width, height);
            debug!(
                page = index + 1,
                width,
                height,
                page_w_mm = page_w.0,
                page_h_mm = page_h.0,
                "Page laid out"
            );
            pdf_pages.push(PdfPage::new(page_w, page_h, ops));
        }

        if pdf_pages.is_empty() {
            return Err(BlattwerkError::EmptyDocument);
        }

        let page_count = pdf_pages.len();
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialisation produced warnings");
        }

        let sha256 = hash_bytes(&bytes);
        info!(title, page_count, bytes = bytes.len(), sha256 = %sha256, "Document assembled");

        Ok(AssembledDocument {
            bytes,
            page_count,
            sha256,
        })
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(150.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use lopdf::Document;

    fn page(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([200, 180, 160, 255]))
    }

    /// MediaBox of every page, in page order, as `(width, height)` in points.
    fn media_boxes(bytes: &[u8]) -> Vec<(f32, f32)> {
        let doc = Document::load_mem(bytes).expect("parse PDF");
        doc.get_pages()
            .values()
            .map(|&id| {
                let dict = doc
                    .get_object(id)
                    .and_then(|o| o.as_dict())
                    .expect("page dictionary");
                let media = dict
                    .get(b"MediaBox")
                    .and_then(|o| o.as_array())
                    .expect("MediaBox");
                let v: Vec<f32> = media.iter().map(|o| o.as_float().expect("number")).collect();
                (v[2] - v[0], v[3] - v[1])
            })
            .collect()
    }

    #[test]
    fn one_pdf_page_per_image() {
        let images = [page(180, 240), page(300, 100), page(64, 64)];
        let document = DocumentAssembler::default()
            .assemble("Receipts", images.iter())
            .expect("assemble");
        assert_eq!(document.page_count, 3);
        assert!(document.bytes.starts_with(b"%PDF"));
        assert_eq!(media_boxes(&document.bytes).len(), 3);
    }

    #[test]
    fn pages_take_their_own_pixel_size() {
        let images = [page(150, 300), page(600, 150)];
        let document = DocumentAssembler::new(150.0)
            .assemble("Mixed", images.iter())
            .expect("assemble");
        // 150 px at 150 dpi is one inch, 72 pt.
        let boxes = media_boxes(&document.bytes);
        let expected = [(72.0, 144.0), (288.0, 72.0)];
        for ((w, h), (ew, eh)) in boxes.iter().zip(expected) {
            assert!((w - ew).abs() < 0.5, "width {w} vs {ew}");
            assert!((h - eh).abs() < 0.5, "height {h} vs {eh}");
        }
    }

    #[test]
    fn digest_matches_bytes() {
        let images = [page(32, 32)];
        let mut document = DocumentAssembler::default()
            .assemble("Digest", images.iter())
            .expect("assemble");
        assert_eq!(document.sha256.len(), 64);
        assert!(document.verify());
        document.bytes.push(b'\n');
        assert!(!document.verify());
    }

    #[test]
    fn empty_input_is_an_error() {
        let result = DocumentAssembler::default().assemble("Empty", std::iter::empty());
        assert!(matches!(result, Err(BlattwerkError::EmptyDocument)));
    }

    #[test]
    fn zero_sized_page_is_an_error() {
        let images = [page(10, 10), RgbaImage::new(0, 5)];
        let result = DocumentAssembler::default().assemble("Broken", images.iter());
        assert!(matches!(result, Err(BlattwerkError::PdfError(_))));
    }

    #[test]
    fn non_positive_dpi_is_refused() {
        let images = [page(10, 10)];
        for dpi in [0.0, -72.0, f32::NAN] {
            let result = DocumentAssembler::new(dpi).assemble("Bad", images.iter());
            assert!(matches!(result, Err(BlattwerkError::PdfError(_))), "dpi {dpi}");
        }
    }

    #[test]
    fn page_size_converts_pixels_to_millimetres() {
        let (w, h) = DocumentAssembler::new(300.0).page_size(300, 600);
        assert!((w.0 - 25.4).abs() < 1e-3);
        assert!((h.0 - 50.8).abs() < 1e-3);
    }
}
