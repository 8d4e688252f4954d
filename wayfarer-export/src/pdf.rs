//! Drawing a [`DocumentLayout`] with `printpdf`.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::error::ExportError;
use crate::layout::{DocumentLayout, MARGIN_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Page};

const LAYER_NAME: &str = "Content";
const RULE_GREY: f32 = 0.784;
const RULE_THICKNESS_PT: f32 = 0.5;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn mm(value: u16) -> Mm {
    Mm(f32::from(value))
}

/// Distance from the top converted to the PDF's bottom-up axis.
fn from_top(y_mm: u16) -> Mm {
    mm(PAGE_HEIGHT_MM.saturating_sub(y_mm))
}

fn draw_page(layer: &PdfLayerReference, page: &Page, fonts: &Fonts) {
    for y_mm in &page.rules_mm {
        layer.set_outline_color(Color::Rgb(Rgb::new(RULE_GREY, RULE_GREY, RULE_GREY, None)));
        layer.set_outline_thickness(RULE_THICKNESS_PT);
        layer.add_line(Line {
            points: vec![
                (Point::new(mm(MARGIN_MM), from_top(*y_mm)), false),
                (Point::new(mm(PAGE_WIDTH_MM - MARGIN_MM), from_top(*y_mm)), false),
            ],
            is_closed: false,
        });
    }
    for line in &page.lines {
        let [r, g, b] = line.style.colour();
        layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        let font = if line.style.is_bold() {
            &fonts.bold
        } else {
            &fonts.regular
        };
        layer.use_text(
            line.text.as_str(),
            line.style.size_pt(),
            mm(line.x_mm),
            from_top(line.y_mm),
            font,
        );
    }
}

/// Render `layout` to PDF bytes.
///
/// # Errors
///
/// Returns [`ExportError::Render`] when the PDF writer fails.
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        mm(PAGE_WIDTH_MM),
        mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    for (number, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if number == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(mm(PAGE_WIDTH_MM), mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);
        draw_page(&layer, page, &fonts);
    }

    let bytes = doc.save_to_bytes()?;
    log::debug!(
        "rendered {} page(s), {} bytes for {}",
        layout.pages.len(),
        bytes.len(),
        layout.title
    );
    Ok(bytes)
}
