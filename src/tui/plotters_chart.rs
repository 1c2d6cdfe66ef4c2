//! Plotters-powered chart panel widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using
//! `plotters-ratatui-backend`, the same drawing code path as the PNG output
//! but at terminal resolution.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One series on a panel.
pub enum PanelSeries<'a> {
    /// Filled from zero up to the points.
    Area(&'a [(f64, f64)], RGBColor),
    Line(&'a [(f64, f64)], RGBColor),
}

/// A render-only panel description.
///
/// All series and bounds are computed outside the render call, which stays
/// focused on drawing.
pub struct PanelChart<'a> {
    pub series: Vec<PanelSeries<'a>>,
    /// X bounds (days since the first notification day).
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub y_label: &'a str,
    /// Draw date tick labels. The upper panel leaves them to the panel below.
    pub dates: bool,
    pub fmt_x: &'a dyn Fn(f64) -> String,
}

impl<'a> Widget for PanelChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to build a chart in a tiny area.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            // Tick labels only; an axis caption does not fit in terminal rows.
            let bottom_labels = if self.dates { 2 } else { 0 };
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, bottom_labels)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(4)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for series in &self.series {
                match series {
                    PanelSeries::Area(points, color) => {
                        chart.draw_series(
                            AreaSeries::new(points.iter().copied(), 0.0, color.mix(0.5)).border_style(color),
                        )?;
                    }
                    PanelSeries::Line(points, color) => {
                        chart.draw_series(LineSeries::new(points.iter().copied(), color))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
