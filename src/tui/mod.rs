//! Ratatui-based interactive chart viewer.
//!
//! Shows one report at a time: a header with the title, window and total
//! tests, the counts panel above the ratio panel, and a key hint. `show_report`
//! blocks until the user closes the view.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::domain::Theme;
use crate::error::AppError;
use crate::plot::{ChartAxes, Palette, palette};
use crate::report::{LABEL_CONFIRMED, LABEL_COUNT, LABEL_RATIO, LABEL_TESTED, ReportData, chart_title, total_tests_label};

mod plotters_chart;

use plotters_chart::{PanelChart, PanelSeries};

/// Display `report` in the terminal until `q`, `Esc` or `Enter` is pressed.
pub fn show_report(report: &ReportData, theme: Theme) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::render(format!("Failed to initialize terminal: {e}")))?;

    let view = ReportView::new(report, palette(theme));
    view.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::render(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::render(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Pre-computed drawing data for one report.
struct ReportView<'a> {
    report: &'a ReportData,
    colors: Palette,
    axes: ChartAxes,
    tested: Vec<(f64, f64)>,
    confirmed: Vec<(f64, f64)>,
    ratio: Vec<Vec<(f64, f64)>>,
}

impl<'a> ReportView<'a> {
    fn new(report: &'a ReportData, colors: Palette) -> Self {
        let axes = ChartAxes::for_report(report);
        let ratio = report
            .ratio_segments()
            .into_iter()
            .map(|seg| seg.into_iter().map(|(d, v)| (axes.x(d), v)).collect())
            .collect();
        Self {
            report,
            colors,
            tested: axes.points(&report.tested),
            confirmed: axes.points(&report.confirmed),
            ratio,
            axes,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::render(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::render(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::render(format!("Event read error: {e}")))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if closes_view(key.code) {
                        return Ok(());
                    }
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Fill(3),
                Constraint::Fill(2),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_counts(frame, chunks[1]);
        self.draw_ratio(frame, chunks[2]);
        frame.render_widget(
            Paragraph::new(Span::styled("q / Esc / Enter: close", Style::default().fg(Color::DarkGray))),
            chunks[3],
        );
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let report = self.report;
        let lines = vec![
            Line::from(Span::styled(
                chart_title(&report.target, &report.extraction_date),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled(
                    total_tests_label(report.total_tests),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  | window: {} days  | ", report.window)),
                Span::styled(LABEL_TESTED, Style::default().fg(ratatui_color(self.colors.tested))),
                Span::raw("  "),
                Span::styled(LABEL_CONFIRMED, Style::default().fg(ratatui_color(self.colors.confirmed))),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_counts(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::TOP | Borders::LEFT | Borders::RIGHT);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let fmt_x = |x: f64| self.axes.day_label(x);
        let widget = PanelChart {
            series: vec![
                PanelSeries::Area(&self.tested, self.colors.tested),
                PanelSeries::Area(&self.confirmed, self.colors.confirmed),
            ],
            x_bounds: [0.0, self.axes.x_max],
            y_bounds: [0.0, self.axes.count_max],
            y_label: LABEL_COUNT,
            dates: false,
            fmt_x: &fmt_x,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_ratio(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let fmt_x = |x: f64| self.axes.day_label(x);
        let widget = PanelChart {
            series: self
                .ratio
                .iter()
                .map(|seg| PanelSeries::Line(seg.as_slice(), self.colors.ratio))
                .collect(),
            x_bounds: [0.0, self.axes.x_max],
            y_bounds: [0.0, self.axes.ratio_max],
            y_label: LABEL_RATIO,
            dates: true,
            fmt_x: &fmt_x,
        };
        frame.render_widget(widget, inner);
    }
}

fn closes_view(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter)
}

fn ratatui_color(c: plotters::style::RGBColor) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ReconciledRecord, Target};
    use crate::report::{TestedTable, build_report};
    use chrono::{Days, NaiveDate};
    use ratatui::backend::TestBackend;

    /// 20 days in ITABUNA with 5 tested rows per day, 2 of them confirmed.
    fn report() -> ReportData {
        let start = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let mut rows = Vec::new();
        for offset in 0..20 {
            let day = start + Days::new(offset);
            for i in 0..5 {
                rows.push(ReconciledRecord {
                    notification_date: day,
                    municipality: "ITABUNA".to_string(),
                    tested: true,
                    source: if i < 2 { Category::Confirmed } else { Category::Discarded },
                    test_collection_date: None,
                });
            }
        }
        let table = TestedTable::from_reconciled(rows);
        build_report(&table, &Target::Municipality("ITABUNA".into()), "21062020", 3).unwrap()
    }

    fn screen_text(width: u16, height: u16) -> String {
        let report = report();
        let view = ReportView::new(&report, palette(Theme::Seaborn));
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| view.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn both_panels_fit_a_standard_terminal() {
        let text = screen_text(80, 24);
        assert!(!text.contains("too small"), "{text}");
        assert!(text.contains("Total tests: 100"));
    }

    #[test]
    fn tiny_terminal_shows_resize_hint() {
        assert!(screen_text(40, 10).contains("too small"));
    }

    #[test]
    fn close_keys() {
        assert!(closes_view(KeyCode::Char('q')));
        assert!(closes_view(KeyCode::Esc));
        assert!(closes_view(KeyCode::Enter));
        assert!(!closes_view(KeyCode::Char('x')));
    }

    #[test]
    fn ratatui_color_keeps_channels() {
        assert_eq!(
            ratatui_color(plotters::style::RGBColor(1, 2, 3)),
            Color::Rgb(1, 2, 3)
        );
    }
}
