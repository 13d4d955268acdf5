//! Full-screen terminal rendering of a [`CurveChart`].

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols,
    widgets::{
        block::{Position, Title},
        Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph,
    },
};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::debug;

use super::{CurveChart, LEGEND_TITLE, TITLE, X_TITLE, Y_TITLE};
use crate::process::MATURITIES;

const CLOSE_HINT: &str = " q / Esc to close ";

impl CurveChart {
    /// Draw the plot with its legend in a column to the right of it.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let legend_width = self
            .series
            .iter()
            .map(|s| s.label.len())
            .chain(std::iter::once(LEGEND_TITLE.len()))
            .max()
            .unwrap_or(0) as u16
            + 7;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(legend_width)])
            .split(area);

        // a line plus point markers for each date
        let mut datasets = Vec::with_capacity(self.series.len() * 2);
        for s in &self.series {
            let style = Style::default().fg(s.color);
            datasets.push(
                Dataset::default()
                    .name(s.label.clone())
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(style)
                    .data(&s.points),
            );
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Scatter)
                    .style(style.add_modifier(Modifier::BOLD))
                    .data(&s.points),
            );
        }

        let x_labels: Vec<Span> = MATURITIES.iter().map(|m| Span::raw(*m)).collect();
        let y_labels: Vec<Span> = self
            .y_ticks
            .iter()
            .map(|t| Span::raw(format!("{:.1}", t)))
            .collect();

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(format!(" {} ", TITLE))
                    .title(
                        Title::from(CLOSE_HINT)
                            .position(Position::Bottom)
                            .alignment(Alignment::Right),
                    )
                    .borders(Borders::ALL),
            )
            .x_axis(
                Axis::default()
                    .title(X_TITLE)
                    .style(Style::default().fg(Color::Gray))
                    .bounds(self.x_bounds())
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Y_TITLE)
                    .style(Style::default().fg(Color::Gray))
                    .bounds(self.y_bounds)
                    .labels(y_labels),
            )
            .legend_position(None);
        frame.render_widget(chart, chunks[0]);

        let legend: Vec<Line> = self
            .series
            .iter()
            .map(|s| {
                Line::from(vec![
                    Span::styled("─●─ ", Style::default().fg(s.color)),
                    Span::raw(s.label.clone()),
                ])
            })
            .collect();
        let legend = Paragraph::new(legend).block(
            Block::default()
                .title(format!(" {} ", LEGEND_TITLE))
                .borders(Borders::ALL),
        );
        frame.render_widget(legend, chunks[1]);
    }
}

/// Terminal in raw mode on the alternate screen; restored on drop.
struct ChartWindow {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ChartWindow {
    fn open() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("creating terminal")?;
        Ok(Self { terminal })
    }

    fn run(&mut self, chart: &CurveChart) -> Result<()> {
        loop {
            self.terminal
                .draw(|frame| {
                    let area = frame.size();
                    chart.render(frame, area);
                })
                .context("drawing chart")?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && is_close_key(key.code) {
                        debug!(?key, "closing chart");
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl Drop for ChartWindow {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn is_close_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter
    )
}

/// Show `chart` full screen until a close key is pressed.
pub fn show(chart: &CurveChart) -> Result<()> {
    let mut window = ChartWindow::open()?;
    window.run(chart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::test_data::{flat, row, set};
    use crate::process::MATURITY_COUNT;
    use ratatui::backend::TestBackend;

    fn render_to_text(chart: &CurveChart, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.size();
                chart.render(frame, area);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..height {
            for x in 0..width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_render_titles_and_legend() {
        let curves = set(vec![flat(2006, 8, 31, 5.0), flat(2019, 8, 30, 1.5)]);
        let chart = CurveChart::from_curves(&curves).unwrap();

        let text = render_to_text(&chart, 140, 40);

        assert!(text.contains(TITLE));
        assert!(text.contains(Y_TITLE));
        assert!(text.contains(LEGEND_TITLE));
        assert!(text.contains("08/31/2006"));
        assert!(text.contains("08/30/2019"));
    }

    #[test]
    fn test_legend_follows_date_order() {
        let curves = set(vec![flat(2019, 8, 30, 1.5), flat(2000, 8, 31, 6.0)]);
        let chart = CurveChart::from_curves(&curves).unwrap();

        let text = render_to_text(&chart, 140, 40);

        let first = text.find("08/31/2000").unwrap();
        let second = text.find("08/30/2019").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_with_gap_does_not_fail() {
        let mut yields = [Some(5.1); MATURITY_COUNT];
        yields[9] = None;
        let curves = set(vec![row(2006, 8, 31, yields)]);
        let chart = CurveChart::from_curves(&curves).unwrap();

        let text = render_to_text(&chart, 100, 30);

        assert!(text.contains("08/31/2006"));
    }

    #[test]
    fn test_close_keys() {
        assert!(is_close_key(KeyCode::Char('q')));
        assert!(is_close_key(KeyCode::Esc));
        assert!(is_close_key(KeyCode::Enter));
        assert!(!is_close_key(KeyCode::Char('x')));
    }
}
