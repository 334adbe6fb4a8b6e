//! A plotters drawing backend that records into a [`Canvas`], so charts end
//! up in the page display list as vector lines and Helvetica text.

use super::{text_width_mm, Canvas, TextRole, MM_PER_PT};
use crate::models::RgbF;
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontTransform,
};
use std::convert::Infallible;

/// Backend pixels per page millimetre.
pub const PX_PER_MM: f32 = 10.0;

// Baseline offsets of the anchor, as fractions of the font size
const CAP_HEIGHT: f32 = 0.7;
const MID_HEIGHT: f32 = 0.35;

pub struct PageBackend<'a, 'p> {
    canvas: &'a mut Canvas<'p>,
}

impl<'a, 'p> PageBackend<'a, 'p> {
    pub fn new(canvas: &'a mut Canvas<'p>) -> Self {
        Self { canvas }
    }

    /// Backend pixels (origin top-left, y down) to page millimetres.
    fn to_page(&self, (x, y): BackendCoord) -> (f32, f32) {
        let region = self.canvas.region();
        (region.x + x as f32 / PX_PER_MM, region.top() - y as f32 / PX_PER_MM)
    }

    fn stroke<S: BackendStyle>(&mut self, points: Vec<(f32, f32)>, style: &S) {
        if let Some(color) = flatten(style.color()) {
            self.canvas.line(points, color, px_to_pt(style.stroke_width() as f64));
        }
    }
}

/// Backend pixel size of a length given in points.
pub fn pt_to_px(pt: f32) -> f64 {
    (pt * MM_PER_PT * PX_PER_MM) as f64
}

fn px_to_pt(px: f64) -> f32 {
    px as f32 / PX_PER_MM / MM_PER_PT
}

/// Color as painted over a white page. `None` if fully transparent.
fn flatten(color: BackendColor) -> Option<RgbF> {
    if color.alpha <= 0.0 {
        return None;
    }
    let alpha = color.alpha.min(1.0) as f32;
    let channel = |value: u8| alpha * value as f32 / 255.0 + (1.0 - alpha);
    let (r, g, b) = color.rgb;
    Some(RgbF { r: channel(r), g: channel(g), b: channel(b) })
}

impl DrawingBackend for PageBackend<'_, '_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        let region = self.canvas.region();
        ((region.width * PX_PER_MM) as u32, (region.height * PX_PER_MM) as u32)
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if let Some(color) = flatten(color) {
            let (x, y) = self.to_page(point);
            let side = 1.0 / PX_PER_MM;
            self.canvas
                .fill(vec![(x, y), (x + side, y), (x + side, y - side), (x, y - side)], color);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points = vec![self.to_page(from), self.to_page(to)];
        self.stroke(points, style);
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let (left, top) = self.to_page(upper_left);
        let (right, bottom) = self.to_page(bottom_right);
        let mut corners = vec![(left, top), (right, top), (right, bottom), (left, bottom)];
        if fill {
            if let Some(color) = flatten(style.color()) {
                self.canvas.fill(corners, color);
            }
        } else {
            corners.push((left, top));
            self.stroke(corners, style);
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let points = path.into_iter().map(|point| self.to_page(point)).collect();
        self.stroke(points, style);
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if let Some(color) = flatten(style.color()) {
            let points = vert.into_iter().map(|point| self.to_page(point)).collect();
            self.canvas.fill(points, color);
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let size = px_to_pt(style.size());
        // Backend rotations turn clockwise on screen
        let angle: f32 = match style.transform() {
            FontTransform::None => 0.0,
            FontTransform::Rotate90 => 270.0,
            FontTransform::Rotate180 => 180.0,
            FontTransform::Rotate270 => 90.0,
        };

        let anchor = style.anchor();
        let width = text_width_mm(text, size);
        let height = size * MM_PER_PT;
        let along = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => width / 2.0,
            HPos::Right => width,
        };
        let above = match anchor.v_pos {
            VPos::Top => CAP_HEIGHT * height,
            VPos::Center => MID_HEIGHT * height,
            VPos::Bottom => 0.0,
        };

        // Walk back from the anchor to the baseline start in the text's frame
        let (x, y) = self.to_page(pos);
        let (sin, cos) = angle.to_radians().sin_cos();
        let x = x - along * cos + above * sin;
        let y = y - along * sin - above * cos;
        self.canvas.rotated_text(text, x, y, size, angle, TextRole::Chart);
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let width = text_width_mm(text, px_to_pt(style.size())) * PX_PER_MM;
        Ok((width.ceil() as u32, style.size().ceil() as u32))
    }
}
