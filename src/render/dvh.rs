use super::{pt_to_px, Canvas, PageBackend, TextRole};
use crate::config::ReportConfig;
use crate::error::{MissingData, ReportError, ReportResult};
use crate::models::{Patient, Plan, RgbF, Structure};
use crate::session::ReportInputs;
use log::debug;
use plotters::prelude::*;

pub const DOSE_AXIS_LABEL: &str = "Dose (cGy)";
pub const VOLUME_AXIS_LABEL: &str = "Volume (%)";
pub const CHART_TITLE: &str = "DVH";

// Font sizes in points
const TITLE_FONT: f32 = 11.0;
const LABEL_FONT: f32 = 9.0;
const TICK_FONT: f32 = 7.0;
const LEGEND_FONT: f32 = 7.0;

const GRID_COLOR: RGBColor = RGBColor(217, 217, 217);
const LEGEND_SAMPLE_PX: i32 = 60;

/// One DVH in chart coordinates: dose (cGy) against volume (%).
#[derive(Debug, Clone, PartialEq)]
pub struct DvhSeries {
    pub label: String,
    pub color: RgbF,
    pub points: Vec<(f64, f64)>,
}

/// Draw the selected DVHs and the report header onto `canvas`.
///
/// Returns the dose-axis extent, which is at least 1 and at least the bin
/// count of every drawn curve.
pub fn render_chart(
    canvas: &mut Canvas,
    inputs: &ReportInputs,
    config: &ReportConfig,
) -> ReportResult<f64> {
    let mut series = Vec::new();
    let mut max_extent = 1.0;

    for (id, dvh) in inputs.curves {
        if !inputs.selection.contains(id) {
            continue;
        }
        let structure = inputs
            .structures
            .get(&dvh.structure_id)
            .ok_or(MissingData::OrphanCurve(dvh.structure_id))?;

        debug!("Drawing DVH for {} ({} bins)", structure.name, dvh.relative_volume.len());
        max_extent = plot_dvh(&mut series, &dvh.relative_volume, structure, max_extent);
    }

    draw_chart(canvas, &series, max_extent, config)?;
    draw_header(canvas, inputs.patient, inputs.plan, config);

    Ok(max_extent)
}

/// Queue one cumulative DVH (percent volume per 1 cGy bin) in the
/// structure's color. Returns `max_extent` widened to the curve length so no
/// curve is cut off.
pub fn plot_dvh(
    series: &mut Vec<DvhSeries>,
    counts: &[f64],
    structure: &Structure,
    max_extent: f64,
) -> f64 {
    let points = counts
        .iter()
        .enumerate()
        .map(|(bin, &volume)| (bin as f64, volume))
        .collect();

    series.push(DvhSeries {
        label: structure.name.clone(),
        color: structure.color.normalized(),
        points,
    });

    max_extent.max(counts.len() as f64)
}

fn chart_error<E: std::fmt::Display>(error: E) -> ReportError {
    ReportError::Chart(error.to_string())
}

fn font(size: f32) -> TextStyle<'static> {
    ("sans-serif", pt_to_px(size)).into_font().color(&BLACK)
}

fn rgb(color: RgbF) -> RGBColor {
    let channel = |value: f32| (value * 255.0).round() as u8;
    RGBColor(channel(color.r), channel(color.g), channel(color.b))
}

/// Grid, axes, curves and legend, laid out by plotters inside the canvas
/// region.
fn draw_chart(
    canvas: &mut Canvas,
    series: &[DvhSeries],
    max_extent: f64,
    config: &ReportConfig,
) -> ReportResult<()> {
    let root = PageBackend::new(canvas).into_drawing_area();

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(CHART_TITLE, font(TITLE_FONT))
        .x_label_area_size(90)
        .y_label_area_size(120)
        .build_cartesian_2d(0.0..max_extent, 0.0..100.0)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc(DOSE_AXIS_LABEL)
        .y_desc(VOLUME_AXIS_LABEL)
        .x_labels(8)
        .y_labels(6)
        .x_label_formatter(&|dose: &f64| format!("{:.0}", dose))
        .y_label_formatter(&|volume: &f64| format!("{:.0}", volume))
        .axis_desc_style(font(LABEL_FONT))
        .label_style(font(TICK_FONT))
        .bold_line_style(&GRID_COLOR)
        .light_line_style(&TRANSPARENT)
        .draw()
        .map_err(chart_error)?;

    let line_px = pt_to_px(config.chart.line_width).round().max(1.0) as u32;
    for dvh in series {
        let style = rgb(dvh.color).stroke_width(line_px);
        chart
            .draw_series(LineSeries::new(dvh.points.iter().copied(), style))
            .map_err(chart_error)?
            .label(dvh.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + LEGEND_SAMPLE_PX, y)], style)
            });
    }

    chart
        .configure_series_labels()
        .label_font(font(LEGEND_FONT))
        .background_style(&WHITE)
        .border_style(&GRID_COLOR)
        .position(SeriesLabelPosition::UpperRight)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

fn draw_header(
    canvas: &mut Canvas,
    patient: &Patient,
    plan: Option<&Plan>,
    config: &ReportConfig,
) {
    let text_size = config.chart.text_font_size;
    let title_size = config.chart.title_font_size;
    canvas.figure_text(0.05, 0.95, config.title.clone(), title_size, TextRole::Title);
    canvas.figure_text(0.05, 0.93, patient_line(patient), text_size, TextRole::HeaderLine);

    if let Some(plan) = plan {
        canvas.figure_text(0.05, 0.91, plan.summary(), text_size, TextRole::HeaderLine);
    }
}

pub fn patient_line(patient: &Patient) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "Unknown".to_string());
    format!(
        "Patient {}, born {}, Gender: {}, ID: {}",
        field(&patient.name),
        field(&patient.birth_date),
        field(&patient.gender),
        field(&patient.id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DvhMap, StructureMap};
    use crate::render::{DrawOp, Page, Rect};
    use crate::session::fixtures::*;
    use crate::session::PatientUpdate;

    fn chart_page(session: &crate::session::Session) -> (Page, f64) {
        let mut page = Page::new(210.0, 297.0);
        let inputs = session.report_inputs().unwrap();
        let extent = render_chart(
            &mut page.canvas(Rect::new(15.0, 155.0, 180.0, 105.0)),
            &inputs,
            &ReportConfig::default(),
        )
        .unwrap();
        (page, extent)
    }

    #[test]
    fn test_extent_covers_longest_curve() {
        let session = two_structure_session();
        let (_, extent) = chart_page(&session);
        assert_eq!(extent, 8000.0);
    }

    #[test]
    fn test_extent_at_least_one() {
        let mut session = two_structure_session();
        session.apply_update(PatientUpdate {
            dvhs: Some(DvhMap::from([(1, curve(1, 0, 1.0)), (2, curve(2, 1, 1.0))])),
            ..Default::default()
        });
        let (_, extent) = chart_page(&session);
        assert_eq!(extent, 1.0);
    }

    #[test]
    fn test_only_selected_curves_drawn() {
        let mut session = two_structure_session();
        session.set_selection([2]);
        let (page, extent) = chart_page(&session);

        // Unselected PTV is longer but does not widen the axis
        assert_eq!(extent, 5000.0);
        let chart_text: Vec<&str> = page.texts(TextRole::Chart).collect();
        assert!(chart_text.contains(&"Rectum"));
        assert!(!chart_text.contains(&"PTV"));
    }

    #[test]
    fn test_white_structure_drawn_black() {
        let session = two_structure_session();
        let (page, _) = chart_page(&session);
        let curve_colors: Vec<RgbF> = page
            .lines()
            .filter(|(points, _)| points.len() > 100)
            .map(|(_, color)| color)
            .collect();
        assert_eq!(curve_colors.len(), 2);
        assert_eq!(curve_colors[0], RgbF { r: 1.0, g: 0.0, b: 0.0 });
        assert_eq!(curve_colors[1], RgbF::BLACK);
    }

    #[test]
    fn test_chart_stays_in_region() {
        let session = two_structure_session();
        let (page, _) = chart_page(&session);
        let region = Rect::new(15.0, 155.0, 180.0, 105.0);
        for (points, _) in page.lines() {
            for &(x, y) in points {
                assert!(x >= region.x - 0.01 && x <= region.right() + 0.01);
                assert!(y >= region.y - 0.01 && y <= region.top() + 0.01);
            }
        }
    }

    #[test]
    fn test_volume_axis_labels_rotated() {
        let session = two_structure_session();
        let (page, _) = chart_page(&session);
        let angle = page.ops.iter().find_map(|op| match op {
            DrawOp::Text { text, angle, .. } if text == VOLUME_AXIS_LABEL => Some(*angle),
            _ => None,
        });
        assert_eq!(angle, Some(90.0));
    }

    #[test]
    fn test_header_lines() {
        let session = two_structure_session();
        let (page, _) = chart_page(&session);

        let title: Vec<&str> = page.texts(TextRole::Title).collect();
        assert_eq!(title, vec!["RT Treatment Plan Report"]);

        let lines: Vec<&str> = page.texts(TextRole::HeaderLine).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Patient Jane Doe, born 1980-01-15, Gender: F, ID: RT-0042");
        assert!(lines[1].starts_with("External Beam Plan \"Prostate IMRT\""));

        let chart_text: Vec<&str> = page.texts(TextRole::Chart).collect();
        assert!(chart_text.contains(&CHART_TITLE));
        assert!(chart_text.contains(&DOSE_AXIS_LABEL));
        assert!(chart_text.contains(&VOLUME_AXIS_LABEL));
    }

    #[test]
    fn test_plan_line_omitted_without_plan() {
        let mut session = crate::session::Session::new();
        session.apply_update(PatientUpdate {
            structures: Some(StructureMap::from([(1, structure(1, "PTV", [0, 0, 255]))])),
            dvhs: Some(DvhMap::from([(1, curve(1, 10, 1.0))])),
            ..Default::default()
        });
        session.set_selection([1]);
        let (page, _) = chart_page(&session);

        let lines: Vec<&str> = page.texts(TextRole::HeaderLine).collect();
        assert_eq!(lines, vec!["Patient Unknown, born Unknown, Gender: Unknown, ID: Unknown"]);
    }
}
