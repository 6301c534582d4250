//! lopdf-backed implementation of the document canvas
//!
//! All unit conversion lives here: the rest of the crate thinks in
//! millimetres from the top-left page corner, while PDF user space is
//! points from the bottom-left. Text is drawn through an embedded
//! Type0/CIDFontType2 font with Identity-H encoding, so card texts can use
//! the full range of the configured TTF.

use std::path::Path;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use tracing::{debug, trace};

use crate::background::CompositedImage;
use crate::canvas::{Canvas, ImageHandle, TextBlock};
use crate::config::PageProfile;
use crate::constants::{BACKGROUND_JPEG_QUALITY, DEFAULT_BORDER_WIDTH, PT_PER_MM};
use crate::error::{CardError, Result};
use crate::font::{FontMetrics, TtfFontMetrics};
use crate::grid::CellGeometry;
use crate::style::{Alignment, Color};
use crate::text::wrap_text_with_metrics;

/// Resource name of the embedded card font
const FONT_RESOURCE: &str = "CF0";

/// A single-profile PDF document under construction
pub struct PdfCanvas {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    current_page_id: ObjectId,
    /// Operations accumulated for the currently open page
    ops: Vec<Operation>,
    page_count: usize,
    page_w_pt: f32,
    page_h_pt: f32,
    font_size_pt: f32,
    metrics: Arc<TtfFontMetrics>,
    image_count: usize,
}

impl PdfCanvas {
    /// Create a document for one page profile with its first page open
    pub fn new(profile: &PageProfile, metrics: Arc<TtfFontMetrics>) -> Result<Self> {
        let page_w_pt = profile.width_mm * PT_PER_MM;
        let page_h_pt = profile.height_mm * PT_PER_MM;

        let mut doc = Document::with_version("1.5");

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![],
            "Count" => 0,
            "MediaBox" => media_box(page_w_pt, page_h_pt),
        });

        let font_id = embed_ttf_font(&mut doc, metrics.data())?;

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_RESOURCE => font_id,
            },
            "XObject" => lopdf::Dictionary::new(),
        });

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut canvas = Self {
            doc,
            pages_id,
            resources_id,
            current_page_id: (0, 0),
            ops: Vec::new(),
            page_count: 0,
            page_w_pt,
            page_h_pt,
            font_size_pt: profile.font_size,
            metrics,
            image_count: 0,
        };
        canvas.open_page()?;
        debug!(
            profile = %profile.key,
            width_pt = page_w_pt,
            height_pt = page_h_pt,
            "created document canvas"
        );
        Ok(canvas)
    }

    /// Create the next page dictionary and hook it into the page tree
    fn open_page(&mut self) -> Result<()> {
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => media_box(self.page_w_pt, self.page_h_pt),
            "Resources" => self.resources_id,
        });

        let pages = self.doc.get_object_mut(self.pages_id)?.as_dict_mut()?;
        pages.get_mut(b"Kids")?.as_array_mut()?.push(page_id.into());
        self.page_count += 1;
        pages.set("Count", Object::Integer(self.page_count as i64));

        self.current_page_id = page_id;
        trace!(page = self.page_count, "opened page");
        Ok(())
    }

    /// Encode the accumulated operations into the open page's content
    /// stream
    fn flush_page(&mut self) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let stream_id = self
            .doc
            .add_object(Stream::new(lopdf::Dictionary::new(), content.encode()?));
        let page = self.doc.get_object_mut(self.current_page_id)?.as_dict_mut()?;
        page.set("Contents", stream_id);
        Ok(())
    }

    fn x_pt(&self, x_mm: f32) -> f32 {
        x_mm * PT_PER_MM
    }

    /// Convert a top-down y coordinate to PDF user space
    fn y_pt(&self, y_mm: f32) -> f32 {
        self.page_h_pt - y_mm * PT_PER_MM
    }
}

impl Canvas for PdfCanvas {
    fn add_page(&mut self) -> Result<()> {
        self.flush_page()?;
        self.open_page()
    }

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn register_image(&mut self, image: &CompositedImage) -> Result<ImageHandle> {
        // RGB plane as a DCTDecode stream, alpha plane as an uncompressed
        // DeviceGray soft mask
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, BACKGROUND_JPEG_QUALITY)
            .encode(
                &image.rgb,
                image.width,
                image.height,
                image::ExtendedColorType::Rgb8,
            )?;

        let smask_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            image.alpha.clone(),
        ));

        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
                "SMask" => smask_id,
            },
            jpeg,
        ));

        let handle = ImageHandle(self.image_count);
        self.image_count += 1;

        let resources = self.doc.get_object_mut(self.resources_id)?.as_dict_mut()?;
        let xobjects = resources.get_mut(b"XObject")?.as_dict_mut()?;
        xobjects.set(image_resource_name(handle), image_id);

        trace!(index = handle.0, width = image.width, height = image.height, "registered image");
        Ok(handle)
    }

    fn place_image(&mut self, handle: ImageHandle, rect: CellGeometry) -> Result<()> {
        let w = self.x_pt(rect.w);
        let h = rect.h * PT_PER_MM;
        let x = self.x_pt(rect.x);
        let y = self.y_pt(rect.y + rect.h);

        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
        ));
        self.ops.push(Operation::new(
            "Do",
            vec![Object::Name(image_resource_name(handle).into_bytes())],
        ));
        self.ops.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn stroke_rect(&mut self, rect: CellGeometry, color: Color) -> Result<()> {
        self.ops.push(Operation::new(
            "RG",
            vec![color.r.into(), color.g.into(), color.b.into()],
        ));
        self.ops
            .push(Operation::new("w", vec![DEFAULT_BORDER_WIDTH.into()]));
        self.ops.push(Operation::new(
            "re",
            vec![
                self.x_pt(rect.x).into(),
                self.y_pt(rect.y + rect.h).into(),
                self.x_pt(rect.w).into(),
                (rect.h * PT_PER_MM).into(),
            ],
        ));
        self.ops.push(Operation::new("S", vec![]));
        Ok(())
    }

    fn measure_lines(&self, text: &str, width_mm: f32) -> usize {
        wrap_text_with_metrics(
            text,
            width_mm * PT_PER_MM,
            self.font_size_pt,
            self.metrics.as_ref(),
        )
        .len()
    }

    fn font_size_pt(&self) -> f32 {
        self.font_size_pt
    }

    fn draw_text_block(&mut self, text: &str, block: TextBlock) -> Result<()> {
        let width_pt = block.width_mm * PT_PER_MM;
        let lines =
            wrap_text_with_metrics(text, width_pt, self.font_size_pt, self.metrics.as_ref());

        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                self.font_size_pt.into(),
            ],
        ));
        self.ops.push(Operation::new(
            "rg",
            vec![
                block.color.r.into(),
                block.color.g.into(),
                block.color.b.into(),
            ],
        ));

        let left_pt = self.x_pt(block.x_mm);
        let mut previous: Option<(f32, f32)> = None;
        for (i, line) in lines.iter().enumerate() {
            let line_width = self.metrics.text_width(line, self.font_size_pt);
            let tx = match block.align {
                Alignment::Left => left_pt,
                Alignment::Center => left_pt + (width_pt - line_width) / 2.0,
                Alignment::Right => left_pt + width_pt - line_width,
            };
            // Baseline sits at the bottom of the i-th line box
            let ty = self.y_pt(block.y_mm + (i as f32 + 1.0) * block.line_height_mm);

            match previous {
                None => self
                    .ops
                    .push(Operation::new("Td", vec![tx.into(), ty.into()])),
                Some((px, py)) => self
                    .ops
                    .push(Operation::new("Td", vec![(tx - px).into(), (ty - py).into()])),
            }
            self.ops.push(Operation::new(
                "Tj",
                vec![Object::String(
                    self.metrics.encode_text(line),
                    StringFormat::Hexadecimal,
                )],
            ));
            previous = Some((tx, ty));
        }

        self.ops.push(Operation::new("ET", vec![]));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.flush_page()?;
        self.doc.save(path)?;
        debug!(path = %path.display(), pages = self.page_count, "saved document");
        Ok(())
    }
}

fn media_box(w_pt: f32, h_pt: f32) -> Vec<Object> {
    vec![0.into(), 0.into(), w_pt.into(), h_pt.into()]
}

fn image_resource_name(handle: ImageHandle) -> String {
    format!("Im{}", handle.0)
}

/// Build the PDF objects for a Type0/CIDFontType2 embedding of the card
/// font and return the Type0 font's object id.
fn embed_ttf_font(doc: &mut Document, font_data: &[u8]) -> Result<ObjectId> {
    let face = ttf_parser::Face::parse(font_data, 0)
        .map_err(|e| CardError::Font(format!("failed to parse font: {e}")))?;
    let units_per_em = face.units_per_em() as f32;
    let base_font_name = "CardFont";

    let font_descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font_name,
        "Flags" => 32, // Nonsymbolic
        "ItalicAngle" => 0,
        "Ascent" => face.ascender() as i64,
        "Descent" => face.descender() as i64,
        "CapHeight" => face.capital_height().unwrap_or(face.ascender()) as i64,
        "StemV" => 80,
        "FontBBox" => vec![
            Object::Integer(0),
            Object::Integer(face.descender() as i64),
            Object::Integer(units_per_em as i64),
            Object::Integer(face.ascender() as i64),
        ],
    });

    let font_stream = Stream::new(
        dictionary! {
            "Length1" => font_data.len() as i64,
        },
        font_data.to_vec(),
    );
    let font_stream_id = doc.add_object(font_stream);

    if let Ok(Object::Dictionary(desc)) = doc.get_object_mut(font_descriptor_id) {
        desc.set("FontFile2", font_stream_id);
    }

    // Per-glyph advances so viewers space Identity-H glyph runs correctly;
    // one run starting at CID 0 covers the whole face.
    let advances: Vec<Object> = (0..face.number_of_glyphs())
        .map(|gid| {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .unwrap_or(0);
            Object::Integer((advance as f32 * 1000.0 / units_per_em) as i64)
        })
        .collect();

    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => base_font_name,
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => font_descriptor_id,
        "DW" => 1000,
        "W" => vec![Object::Integer(0), Object::Array(advances)],
    });

    Ok(doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => base_font_name,
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
    }))
}
