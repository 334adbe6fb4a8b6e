use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{ReportError, ReportResult};

pub const DEFAULT_TITLE: &str = "RT Treatment Plan Report";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub page: PageConfig,
    pub chart: ChartConfig,
    pub table: TableConfig,
    /// Also write the metrics table as CSV next to the PDF
    pub metrics_csv: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width_mm: f32,
    pub height_mm: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub line_width: f32,      // pt
    pub title_font_size: f32, // pt, the report title
    pub text_font_size: f32,  // pt, patient and plan lines
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub row_height_mm: f32,
    pub font_size: f32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            page: PageConfig::default(),
            chart: ChartConfig::default(),
            table: TableConfig::default(),
            metrics_csv: false,
        }
    }
}

impl Default for PageConfig {
    // A4 portrait
    fn default() -> Self {
        Self { width_mm: 210.0, height_mm: 297.0 }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            line_width: 1.5,
            title_font_size: 24.0,
            text_font_size: 12.0,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { row_height_mm: 6.0, font_size: 8.0 }
    }
}

impl ReportConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReportResult<()> {
        if self.title.trim().is_empty() {
            return Err(ReportError::InvalidConfig(
                "Report title must not be empty".to_string()
            ));
        }

        self.validate_page()?;

        if self.chart.line_width <= 0.0 {
            return Err(ReportError::InvalidConfig(
                "Curve line width must be positive".to_string()
            ));
        }

        if self.chart.title_font_size <= 0.0 || self.chart.text_font_size <= 0.0 {
            return Err(ReportError::InvalidConfig(
                "Header font sizes must be positive".to_string()
            ));
        }

        if self.table.row_height_mm <= 0.0 || self.table.font_size <= 0.0 {
            return Err(ReportError::InvalidConfig(
                "Table row height and font size must be positive".to_string()
            ));
        }

        Ok(())
    }

    fn validate_page(&self) -> ReportResult<()> {
        let page = &self.page;
        if page.width_mm <= 0.0 || page.height_mm <= 0.0 {
            return Err(ReportError::InvalidConfig(
                format!("Page size must be positive, got {} x {} mm", page.width_mm, page.height_mm)
            ));
        }

        if page.width_mm > page.height_mm {
            return Err(ReportError::InvalidConfig(
                "Page must be portrait (height >= width)".to_string()
            ));
        }

        // Header and footer bands need a minimum page to fit
        if page.width_mm < 100.0 || page.height_mm < 150.0 {
            return Err(ReportError::InvalidConfig(
                "Page must be at least 100 x 150 mm".to_string()
            ));
        }

        Ok(())
    }
}
