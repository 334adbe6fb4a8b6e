pub mod backend;
pub mod dvh;
pub mod pdf;
pub mod table;

use crate::models::RgbF;

pub use backend::*;
pub use dvh::*;
pub use table::*;

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 0.3528;

/// Rectangle in page millimetres, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Title,
    HeaderLine,
    /// Anything drawn by the charting library: caption, ticks, axis
    /// descriptions, legend entries.
    Chart,
    TableTitle,
    TableHeader,
    TableCell { row: usize },
    Footer,
}

impl TextRole {
    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            TextRole::Title | TextRole::TableTitle | TextRole::TableHeader
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        points: Vec<(f32, f32)>,
        color: RgbF,
        width: f32, // pt
    },
    Text {
        text: String,
        x: f32, // start of the baseline
        y: f32,
        size: f32,  // pt
        angle: f32, // degrees, counter-clockwise
        role: TextRole,
    },
    Fill {
        points: Vec<(f32, f32)>,
        color: RgbF,
    },
}

/// A page as a display list. Painted to PDF by [`pdf::write_pdf`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width_mm: f32,
    pub height_mm: f32,
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn new(width_mm: f32, height_mm: f32) -> Self {
        Self { width_mm, height_mm, ops: Vec::new() }
    }

    /// Drawing surface restricted to `region` of this page.
    pub fn canvas(&mut self, region: Rect) -> Canvas<'_> {
        Canvas { page: self, region }
    }
}

#[cfg(test)]
impl Page {
    pub fn texts(&self, role: TextRole) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(move |op| match op {
            DrawOp::Text { text, role: r, .. } if *r == role => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (&[(f32, f32)], RgbF)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Line { points, color, .. } => Some((points.as_slice(), *color)),
            _ => None,
        })
    }
}

pub struct Canvas<'p> {
    page: &'p mut Page,
    region: Rect,
}

impl<'p> Canvas<'p> {
    pub fn region(&self) -> Rect {
        self.region
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.page.width_mm, self.page.height_mm)
    }

    pub fn line(&mut self, points: Vec<(f32, f32)>, color: RgbF, width: f32) {
        if points.len() < 2 {
            return;
        }
        self.page.ops.push(DrawOp::Line { points, color, width });
    }

    pub fn fill(&mut self, points: Vec<(f32, f32)>, color: RgbF) {
        if points.len() < 3 {
            return;
        }
        self.page.ops.push(DrawOp::Fill { points, color });
    }

    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, size: f32, role: TextRole) {
        self.rotated_text(text, x, y, size, 0.0, role);
    }

    pub fn rotated_text(
        &mut self,
        text: impl Into<String>,
        x: f32,
        y: f32,
        size: f32,
        angle: f32,
        role: TextRole,
    ) {
        self.page.ops.push(DrawOp::Text { text: text.into(), x, y, size, angle, role });
    }

    pub fn centered_text(
        &mut self,
        text: impl Into<String>,
        cx: f32,
        y: f32,
        size: f32,
        role: TextRole,
    ) {
        let text = text.into();
        let x = cx - text_width_mm(&text, size) / 2.0;
        self.text(text, x, y, size, role);
    }

    /// Text placed by fractions of the whole page, independent of the region.
    pub fn figure_text(
        &mut self,
        fx: f32,
        fy: f32,
        text: impl Into<String>,
        size: f32,
        role: TextRole,
    ) {
        let (w, h) = self.page_size();
        self.text(text, fx * w, fy * h, size, role);
    }
}

/// Approximate rendered width of Helvetica text.
pub fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * MM_PER_PT
}

/// Cut `text` so it fits in `width` mm, marking the cut with "..".
pub fn fit_text(text: &str, size: f32, width: f32) -> String {
    if text_width_mm(text, size) <= width {
        return text.to_string();
    }
    let per_char = size * 0.5 * MM_PER_PT;
    let keep = ((width / per_char) as usize).saturating_sub(2);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("..");
    cut
}
