//! PNG chart output via Plotters' bitmap backend.
//!
//! Layout: a title strip, then two stacked panels sharing the date axis with
//! no gap between them. Top: tested and confirmed as filled areas, legend and
//! the total-tests annotation. Bottom: the confirmed/tested ratio line.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontStyle;

use crate::domain::Theme;
use crate::error::AppError;
use crate::plot::{ChartAxes, palette};
use crate::report::{
    LABEL_CONFIRMED, LABEL_COUNT, LABEL_DATE, LABEL_RATIO, LABEL_TESTED, ReportData, chart_title, total_tests_label,
};

/// Output size in pixels (roughly a 0.66 aspect ratio).
pub const PNG_SIZE: (u32, u32) = (800, 528);

const Y_LABEL_AREA: i32 = 60;
const X_LABEL_AREA: i32 = 40;

/// Render `report` into a PNG at `path`.
pub fn render_png(report: &ReportData, theme: Theme, path: &Path) -> Result<(), AppError> {
    draw_png(report, theme, path)
        .map_err(|e| AppError::render(format!("Failed to render chart '{}': {e}", path.display())))
}

fn draw_png(report: &ReportData, theme: Theme, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let colors = palette(theme);
    let axes = ChartAxes::for_report(report);
    let fmt_x = |x: &f64| axes.day_label(*x);

    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&colors.background)?;
    let root = root.titled(
        &chart_title(&report.target, &report.extraction_date),
        ("sans-serif", 20).into_font().color(&colors.text),
    )?;

    let (_, height) = root.dim_in_pixel();
    let (upper, lower) = root.split_vertically((height as i32) * 3 / 5);

    // Counts panel. No bottom label area: the ratio panel below carries the dates.
    let mut top = ChartBuilder::on(&upper)
        .margin_left(10)
        .margin_right(20)
        .margin_top(5)
        .margin_bottom(0)
        .set_label_area_size(LabelAreaPosition::Left, Y_LABEL_AREA)
        .build_cartesian_2d(0f64..axes.x_max, 0f64..axes.count_max)?;

    top.plotting_area().fill(&colors.plot_background)?;
    top.configure_mesh()
        .bold_line_style(&colors.grid)
        .light_line_style(colors.grid.mix(0.4))
        .x_labels(8)
        .y_labels(6)
        .x_label_formatter(&fmt_x)
        .y_desc(LABEL_COUNT)
        .label_style(("sans-serif", 12).into_font().color(&colors.text))
        .axis_style(&colors.text)
        .draw()?;

    let tested_color = colors.tested;
    top.draw_series(
        AreaSeries::new(axes.points(&report.tested), 0.0, tested_color.mix(0.7)).border_style(&tested_color),
    )?
    .label(LABEL_TESTED)
    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], tested_color.filled()));

    let confirmed_color = colors.confirmed;
    top.draw_series(
        AreaSeries::new(axes.points(&report.confirmed), 0.0, confirmed_color.mix(0.8))
            .border_style(&confirmed_color),
    )?
    .label(LABEL_CONFIRMED)
    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], confirmed_color.filled()));

    top.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(colors.background.mix(0.8))
        .border_style(&colors.grid)
        .label_font(("sans-serif", 13).into_font().color(&colors.text))
        .draw()?;

    top.draw_series(std::iter::once(Text::new(
        total_tests_label(report.total_tests),
        (axes.x_max * 0.68, axes.count_max * 0.92),
        ("sans-serif", 16)
            .into_font()
            .style(FontStyle::Bold)
            .color(&colors.text),
    )))?;

    // Ratio panel.
    let mut bottom = ChartBuilder::on(&lower)
        .margin_left(10)
        .margin_right(20)
        .margin_top(0)
        .margin_bottom(10)
        .set_label_area_size(LabelAreaPosition::Left, Y_LABEL_AREA)
        .set_label_area_size(LabelAreaPosition::Bottom, X_LABEL_AREA)
        .build_cartesian_2d(0f64..axes.x_max, 0f64..axes.ratio_max)?;

    bottom.plotting_area().fill(&colors.plot_background)?;
    bottom
        .configure_mesh()
        .bold_line_style(&colors.grid)
        .light_line_style(colors.grid.mix(0.4))
        .x_labels(8)
        .y_labels(4)
        .x_label_formatter(&fmt_x)
        .x_desc(LABEL_DATE)
        .y_desc(LABEL_RATIO)
        .label_style(("sans-serif", 12).into_font().color(&colors.text))
        .axis_style(&colors.text)
        .draw()?;

    for segment in report.ratio_segments() {
        bottom.draw_series(LineSeries::new(
            segment.into_iter().map(|(day, v)| (axes.x(day), v)),
            colors.ratio.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}
