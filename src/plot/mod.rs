//! Chart rendering shared pieces: theme palettes and the date axis mapping.
//!
//! Both renderers draw on an `f64` x-axis (days since the first notification
//! day) and format tick labels back into dates. Keeping the mapping here means
//! the PNG and terminal charts always line up the same way.

use chrono::{Duration, NaiveDate};
use plotters::style::RGBColor;

use crate::domain::Theme;
use crate::report::ReportData;

pub mod png;

pub use png::*;

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: RGBColor,
    pub plot_background: RGBColor,
    pub grid: RGBColor,
    pub text: RGBColor,
    pub tested: RGBColor,
    pub confirmed: RGBColor,
    pub ratio: RGBColor,
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Seaborn => Palette {
            background: RGBColor(255, 255, 255),
            plot_background: RGBColor(234, 234, 242),
            grid: RGBColor(255, 255, 255),
            text: RGBColor(38, 38, 38),
            tested: RGBColor(76, 114, 176),
            confirmed: RGBColor(221, 132, 82),
            ratio: RGBColor(76, 114, 176),
        },
        Theme::Plain => Palette {
            background: RGBColor(255, 255, 255),
            plot_background: RGBColor(255, 255, 255),
            grid: RGBColor(221, 221, 221),
            text: RGBColor(0, 0, 0),
            tested: RGBColor(31, 119, 180),
            confirmed: RGBColor(255, 127, 14),
            ratio: RGBColor(31, 119, 180),
        },
    }
}

/// Axis bounds and the day <-> x mapping for one report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartAxes {
    pub origin: NaiveDate,
    pub x_max: f64,
    pub count_max: f64,
    pub ratio_max: f64,
}

impl ChartAxes {
    /// Both panels span the target's full notification range so they share
    /// the same x-axis even when one series is empty.
    pub fn for_report(report: &ReportData) -> Self {
        let origin = *report.days.start();
        let span = (*report.days.end() - origin).num_days() as f64;
        Self {
            origin,
            x_max: span.max(1.0),
            count_max: headroom(report.max_count()),
            ratio_max: headroom(report.max_ratio()),
        }
    }

    pub fn x(&self, day: NaiveDate) -> f64 {
        (day - self.origin).num_days() as f64
    }

    /// Tick label for an x value, as `DD/MM`.
    pub fn day_label(&self, x: f64) -> String {
        let day = self.origin + Duration::days(x.round() as i64);
        day.format("%d/%m").to_string()
    }

    pub fn points<'a, I>(&self, series: I) -> Vec<(f64, f64)>
    where
        I: IntoIterator<Item = (&'a NaiveDate, &'a f64)>,
    {
        series.into_iter().map(|(d, v)| (self.x(*d), *v)).collect()
    }
}

/// Upper bound with 10% headroom; 1.0 when there is nothing to show.
fn headroom(max: Option<f64>) -> f64 {
    match max {
        Some(m) if m.is_finite() && m > 0.0 => m * 1.1,
        _ => 1.0,
    }
}
