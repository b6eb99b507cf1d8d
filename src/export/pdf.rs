//! PDF export
//!
//! Layout on A4 portrait:
//! - title line with the patient name
//! - grid of bordered cells, `columns` per row, wrapping onto new pages
//! - each cell: pictogram scaled into the box, caption below
//! - attribution line for the pictogram license on the last page

use printpdf::image_crate::{self, DynamicImage, GenericImageView, RgbImage};
use printpdf::lopdf::{self, content::Operation, Object, StringFormat};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

use crate::backends::images::ImageSource;
use crate::board::model::{Board, BoardItem};

pub const ATTRIBUTION: &str = "Pictogramas: ARASAAC (http://www.arasaac.org) - CC BY-NC-SA 4.0";
pub const DEFAULT_COLUMNS: usize = 4;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const CAPTION_H: f32 = 10.0;
const IMAGE_PAD: f32 = 3.0;
/// Space kept free at the bottom of every page for the attribution line
const FOOTER_H: f32 = 15.0;
const IMAGE_DPI: f32 = 300.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("column count must be at least 1")]
    InvalidColumns,

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub columns: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
        }
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render a board to PDF bytes.
///
/// Cells without a pictogram, or whose image cannot be fetched or decoded,
/// show the caption alone.
pub fn render_pdf(
    patient: &str,
    board: &Board,
    images: &dyn ImageSource,
    options: ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    if options.columns == 0 {
        return Err(ExportError::InvalidColumns);
    }

    let title = format!("Prancha - {}", patient);
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let fonts = Fonts {
        regular: builtin(&doc, BuiltinFont::Helvetica)?,
        bold: builtin(&doc, BuiltinFont::HelveticaBold)?,
    };

    let mut layer = doc.get_page(page).get_layer(layer);
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.8);

    let mut cursor = PAGE_H - MARGIN - 8.0;
    write_text(&layer, &format!("Paciente: {}", patient), 18.0, MARGIN, cursor, &fonts.bold);
    cursor -= 7.0;
    if let Some(phrase) = &board.phrase {
        write_text(&layer, &format!("Frase: {}", phrase), 11.0, MARGIN, cursor, &fonts.regular);
        cursor -= 6.0;
    }
    cursor -= 4.0;

    let cell_w = (PAGE_W - 2.0 * MARGIN) / options.columns as f32;
    let cell_h = cell_w + CAPTION_H;

    if board.is_empty() {
        write_text(&layer, "(prancha vazia)", 12.0, MARGIN, cursor - 6.0, &fonts.regular);
    }

    for row in board.items.chunks(options.columns) {
        if cursor - cell_h < MARGIN + FOOTER_H {
            let (page, layer_index) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            layer = doc.get_page(page).get_layer(layer_index);
            layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
            layer.set_outline_thickness(0.8);
            cursor = PAGE_H - MARGIN;
        }

        let bottom = cursor - cell_h;
        for (col, item) in row.iter().enumerate() {
            let x = MARGIN + col as f32 * cell_w;
            draw_cell(&layer, &fonts, images, item, x, bottom, cell_w, cell_h);
        }
        cursor = bottom;
    }

    write_text(&layer, ATTRIBUTION, 8.0, MARGIN, MARGIN, &fonts.regular);

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

fn builtin(doc: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, ExportError> {
    doc.add_builtin_font(font)
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn draw_cell(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    images: &dyn ImageSource,
    item: &BoardItem,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
) {
    draw_box(layer, x, y, w, h);

    let box_size = w - 2.0 * IMAGE_PAD;
    let image = item
        .picto
        .as_ref()
        .and_then(|p| images.fetch(p).map(|bytes| (p, bytes)))
        .and_then(|(p, bytes)| match decode_flattened(&bytes) {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(id = %p, error = %e, "pictogram image could not be decoded");
                None
            }
        });

    if let Some(img) = image {
        let (px_w, px_h) = img.dimensions();
        let native_w = px_w as f32 / IMAGE_DPI * 25.4;
        let native_h = px_h as f32 / IMAGE_DPI * 25.4;
        let scale = box_size / native_w.max(native_h).max(f32::EPSILON);
        let offset_x = (box_size - native_w * scale) / 2.0;
        let offset_y = (box_size - native_h * scale) / 2.0;

        Image::from_dynamic_image(&img).add_to_layer(
            layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x + IMAGE_PAD + offset_x)),
                translate_y: Some(Mm(y + CAPTION_H + offset_y)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
    }

    let font_size = 12.0;
    let caption = fit_caption(&item.word, w, font_size);
    let text_w = approx_text_width(&caption, font_size);
    let text_x = x + ((w - text_w) / 2.0).max(1.0);
    write_text(layer, &caption, font_size, text_x, y + 3.5, &fonts.regular);
}

/// One line of text at `(x, y)` mm. Builtin fonts are declared with
/// WinAnsiEncoding, so the string is written in that encoding.
fn write_text(layer: &PdfLayerReference, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
    layer.begin_text_section();
    layer.set_font(font, size);
    layer.set_text_cursor(Mm(x), Mm(y));
    layer.add_operation(Operation::new(
        "Tj",
        vec![Object::String(win_ansi(text), StringFormat::Hexadecimal)],
    ));
    layer.end_text_section();
}

/// Windows-1252 bytes; characters outside the code page are dropped
fn win_ansi(text: &str) -> Vec<u8> {
    lopdf::Document::encode_text(Some("WinAnsiEncoding"), text)
}

fn draw_box(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32) {
    let points = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ];
    layer.add_line(Line {
        points,
        is_closed: true,
    });
}

/// Decode an image and composite any transparency onto white
fn decode_flattened(bytes: &[u8]) -> Result<DynamicImage, image_crate::ImageError> {
    let rgba = image_crate::load_from_memory(bytes)?.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut rgb = RgbImage::new(w, h);
    for (px, out) in rgba.pixels().zip(rgb.pixels_mut()) {
        let [r, g, b, a] = px.0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        out.0 = [blend(r), blend(g), blend(b)];
    }
    Ok(DynamicImage::ImageRgb8(rgb))
}

/// Rough Helvetica width in mm (average glyph is about half the font size)
fn approx_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.5 * 0.3528
}

fn fit_caption(word: &str, cell_w: f32, font_size: f32) -> String {
    let max_chars = ((cell_w - 2.0) / (font_size * 0.5 * 0.3528)).floor().max(1.0) as usize;
    if word.chars().count() <= max_chars {
        return word.to_string();
    }
    let mut s: String = word.chars().take(max_chars.saturating_sub(1)).collect();
    s.push('…');
    s
}
