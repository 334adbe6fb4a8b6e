use crate::config::ReportConfig;
use crate::error::{ReportError, ReportResult};
use crate::metrics::{build_rows, Row, COLUMN_HEADERS};
use crate::render::{pdf, render_chart, render_table, Page, Rect, TextRole};
use crate::session::Session;
use chrono::Local;
use log::{debug, info};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// A composed report, ready to be written.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub pages: Vec<Page>,
    pub rows: Vec<Row>,
    pub dose_extent: f64,
}

/// Lay out the DVH chart and the metrics table on a single page.
///
/// Fails with `MissingData` before anything is drawn if the session cannot
/// produce a report.
pub fn compose(session: &Session, config: &ReportConfig) -> ReportResult<ReportDocument> {
    let inputs = session.report_inputs()?;
    let rows = build_rows(inputs.selection, inputs.structures, inputs.curves)?;

    let (width, height) = (config.page.width_mm, config.page.height_mm);
    let mut page = Page::new(width, height);

    // Chart in the upper half below the header band, table underneath
    let chart_region = Rect::new(0.08 * width, 0.53 * height, 0.86 * width, 0.35 * height);
    let table_region = Rect::new(0.06 * width, 0.05 * height, 0.88 * width, 0.44 * height);

    let dose_extent = render_chart(&mut page.canvas(chart_region), &inputs, config)?;
    render_table(&mut page.canvas(table_region), &rows, &config.table);

    let footer = format!("Generated {}", Local::now().format("%Y-%m-%d %H:%M"));
    page.canvas(Rect::new(0.0, 0.0, width, height))
        .figure_text(0.05, 0.02, footer, 7.0, TextRole::Footer);

    debug!("Composed report with {} rows", rows.len());
    Ok(ReportDocument {
        title: config.title.clone(),
        pages: vec![page],
        rows,
        dose_extent,
    })
}

impl ReportDocument {
    /// Write the document as PDF to `path`.
    ///
    /// The PDF is written to a temporary file next to `path` and renamed into
    /// place once complete, so a failed write never leaves a partial file.
    pub fn write_pdf<P: AsRef<Path>>(&self, path: P) -> ReportResult<()> {
        let path = path.as_ref();
        let mut file = temp_file_beside(path)?;
        pdf::write_pdf(&self.pages, &self.title, file.as_file_mut())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| ReportError::Io(e.error))?;

        info!("Report written to {:?}", path);
        Ok(())
    }
}

/// Save the metrics table as CSV, with the same columns as the PDF table.
pub fn save_metrics_csv<P: AsRef<Path>>(rows: &[Row], path: P) -> ReportResult<()> {
    let path = path.as_ref();
    let mut file = temp_file_beside(path)?;
    {
        let mut writer = csv::Writer::from_writer(file.as_file_mut());
        writer.write_record(COLUMN_HEADERS)?;
        for row in rows {
            writer.write_record(row.cells())?;
        }
        writer.flush()?;
    }
    file.flush()?;
    file.persist(path).map_err(|e| ReportError::Io(e.error))?;

    info!("Metrics table saved to {:?}", path);
    Ok(())
}

fn temp_file_beside(path: &Path) -> ReportResult<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}
