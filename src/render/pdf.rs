use super::{DrawOp, Page};
use crate::error::{ReportError, ReportResult};
use crate::models::RgbF;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point,
    Polygon, Pt, Rgb, TextMatrix,
};
use std::io::{BufWriter, Write};

/// Paint `pages` into a PDF document and write it to `writer`.
pub fn write_pdf<W: Write>(pages: &[Page], title: &str, writer: W) -> ReportResult<()> {
    let (first, rest) = pages
        .split_first()
        .ok_or_else(|| ReportError::Pdf("document has no pages".to_string()))?;

    let (doc, page_index, layer_index) =
        PdfDocument::new(title, Mm(first.width_mm), Mm(first.height_mm), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

    paint(&doc.get_page(page_index).get_layer(layer_index), first, &regular, &bold);
    for page in rest {
        let (page_index, layer_index) =
            doc.add_page(Mm(page.width_mm), Mm(page.height_mm), "Layer 1");
        paint(&doc.get_page(page_index).get_layer(layer_index), page, &regular, &bold);
    }

    let mut buf = BufWriter::new(writer);
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.flush()?;
    Ok(())
}

fn rgb(color: &RgbF) -> Color {
    Color::Rgb(Rgb::new(color.r, color.g, color.b, None))
}

fn page_points(points: &[(f32, f32)]) -> Vec<(Point, bool)> {
    points
        .iter()
        .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
        .collect()
}

fn paint(
    layer: &PdfLayerReference,
    page: &Page,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    for op in &page.ops {
        match op {
            DrawOp::Line { points, color, width } => {
                layer.set_outline_color(rgb(color));
                layer.set_outline_thickness(*width);
                layer.add_line(Line { points: page_points(points), is_closed: false });
            }
            DrawOp::Fill { points, color } => {
                layer.set_fill_color(rgb(color));
                layer.add_polygon(Polygon {
                    rings: vec![page_points(points)],
                    mode: PaintMode::Fill,
                    winding_order: WindingOrder::NonZero,
                });
            }
            DrawOp::Text { text, x, y, size, angle, role } => {
                let font = if role.is_bold() { bold } else { regular };
                layer.set_fill_color(rgb(&RgbF::BLACK));
                if *angle == 0.0 {
                    layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), font);
                } else {
                    layer.begin_text_section();
                    layer.set_font(font, *size);
                    layer.set_text_matrix(TextMatrix::TranslateRotate(
                        Pt::from(Mm(*x)),
                        Pt::from(Mm(*y)),
                        *angle,
                    ));
                    layer.write_text(text.as_str(), font);
                    layer.end_text_section();
                }
            }
        }
    }
}
