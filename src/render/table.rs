use super::{fit_text, Canvas, TextRole};
use crate::config::TableConfig;
use crate::metrics::{Row, COLUMN_HEADERS};
use crate::models::RgbF;
use log::warn;

pub const TABLE_TITLE: &str = "Structure Dose Metrics";

// Relative column widths; the name column gets the most room
const COLUMN_WEIGHTS: [f32; 6] = [2.4, 1.0, 1.0, 1.0, 1.0, 1.0];
const CELL_PADDING: f32 = 1.5;

/// Render `rows` as a table filling the width of the canvas region.
///
/// The region has no axes. Every row is drawn, even past the bottom of the
/// region.
pub fn render_table(canvas: &mut Canvas, rows: &[Row], style: &TableConfig) {
    let region = canvas.region();
    let center = region.x + region.width / 2.0;
    canvas.centered_text(TABLE_TITLE, center, region.top() - 5.0, 11.0, TextRole::TableTitle);

    let total_weight: f32 = COLUMN_WEIGHTS.iter().sum();
    let mut column_x = Vec::with_capacity(COLUMN_WEIGHTS.len());
    let mut x = region.x;
    for weight in COLUMN_WEIGHTS {
        let width = region.width * weight / total_weight;
        column_x.push((x, width));
        x += width;
    }

    let row_height = style.row_height_mm;
    let baseline = |row_index: usize| region.top() - 12.0 - row_index as f32 * row_height;

    for (&header, &(x, width)) in COLUMN_HEADERS.iter().zip(&column_x) {
        let text = fit_text(header, style.font_size, width - 2.0 * CELL_PADDING);
        canvas.text(text, x + CELL_PADDING, baseline(0), style.font_size, TextRole::TableHeader);
    }
    let rule_y = baseline(0) - row_height / 2.0 + 1.0;
    canvas.line(vec![(region.x, rule_y), (region.right(), rule_y)], RgbF::BLACK, 0.6);

    for (i, row) in rows.iter().enumerate() {
        let y = baseline(i + 1);
        for (cell, &(x, width)) in row.cells().iter().zip(&column_x) {
            let text = fit_text(cell, style.font_size, width - 2.0 * CELL_PADDING);
            canvas.text(text, x + CELL_PADDING, y, style.font_size, TextRole::TableCell { row: i });
        }
    }

    let last = baseline(rows.len());
    if last < region.y {
        warn!(
            "Metrics table with {} rows runs {:.1} mm past its region",
            rows.len(),
            region.y - last
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawOp, Page, Rect};

    const REGION: Rect = Rect { x: 15.0, y: 15.0, width: 180.0, height: 125.0 };

    fn row(name: &str) -> Row {
        Row {
            name: name.to_string(),
            volume: "123.40".to_string(),
            min_dose: "1.00".to_string(),
            max_dose: "7950.25".to_string(),
            mean_dose: "4012.00".to_string(),
            d50: 4020.5,
        }
    }

    #[test]
    fn test_header_and_rows() {
        let mut page = Page::new(210.0, 297.0);
        let rows = vec![row("PTV"), row("Rectum")];
        render_table(&mut page.canvas(REGION), &rows, &TableConfig::default());

        let title: Vec<&str> = page.texts(TextRole::TableTitle).collect();
        assert_eq!(title, vec![TABLE_TITLE]);
        let headers: Vec<&str> = page.texts(TextRole::TableHeader).collect();
        assert_eq!(headers, COLUMN_HEADERS.to_vec());
        assert_eq!(page.texts(TextRole::TableCell { row: 0 }).count(), 6);
        assert_eq!(page.texts(TextRole::TableCell { row: 1 }).count(), 6);
        assert_eq!(page.texts(TextRole::TableCell { row: 2 }).count(), 0);

        let second: Vec<&str> = page.texts(TextRole::TableCell { row: 1 }).collect();
        assert_eq!(second, vec!["Rectum", "123.40", "1.00", "7950.25", "4012.00", "4020.5"]);
    }

    #[test]
    fn test_rows_spaced_by_row_height() {
        let mut page = Page::new(210.0, 297.0);
        let style = TableConfig { row_height_mm: 4.0, font_size: 7.0 };
        render_table(&mut page.canvas(REGION), &[row("A"), row("B")], &style);

        let first_cell_y = |wanted: usize| {
            page.ops
                .iter()
                .find_map(|op| match op {
                    DrawOp::Text { y, role: TextRole::TableCell { row }, .. } if *row == wanted => {
                        Some(*y)
                    }
                    _ => None,
                })
                .unwrap()
        };
        approx::assert_relative_eq!(first_cell_y(0) - first_cell_y(1), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_overflowing_rows_still_drawn() {
        let mut page = Page::new(210.0, 297.0);
        let rows: Vec<Row> = (0..60).map(|i| row(&format!("Structure {}", i))).collect();
        render_table(&mut page.canvas(REGION), &rows, &TableConfig::default());
        assert_eq!(page.texts(TextRole::TableCell { row: 59 }).count(), 6);
    }
}
