//! Read-only Gantt view over a scheduled timeline.
//!
//! Shows one row per scheduled node, in timeline order, with a bar scaled to
//! the overall window. Nothing here mutates the schedule; the view is rebuilt
//! from a fresh assembly pass each time it is opened.

use std::io;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::event::{self, Event, KeyCode};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use pm_timeline::db::{format_date, truncate};
use pm_timeline::fields::{format_kind, format_node_status};
use pm_timeline::{depths, ContainerStatus, NodeStatus, ScheduledNode, TaskStatus};

use crate::tui::colors::{kind_color, GOLD};

/// Fixed columns: Kind, Status, %, Start, End, Title, plus spacing.
const FIXED_COLUMNS_WIDTH: u16 = 10 + 11 + 5 + 11 + 11 + 32 + 6 + 3;

/// Gantt view state.
pub struct GanttApp {
    title: String,
    nodes: Vec<ScheduledNode>,
    depths: Vec<usize>,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    table_state: TableState,
    show_help: bool,
}

impl GanttApp {
    pub fn new(title: String, nodes: Vec<ScheduledNode>) -> Self {
        let depths = depths(&nodes);
        let window = timeline_window(&nodes);
        let mut table_state = TableState::default();
        if !nodes.is_empty() {
            table_state.select(Some(0));
        }
        GanttApp {
            title,
            nodes,
            depths,
            window,
            table_state,
            show_help: false,
        }
    }

    fn select_offset(&mut self, delta: isize) {
        if self.nodes.is_empty() {
            return;
        }
        let last = self.nodes.len() - 1;
        let cur = self.table_state.selected().unwrap_or(0);
        let next = cur.saturating_add_signed(delta).min(last);
        self.table_state.select(Some(next));
    }

    /// Poll for and handle keyboard events.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if self.show_help {
                    self.show_help = false;
                    return Ok(false);
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    KeyCode::Up | KeyCode::Char('k') => self.select_offset(-1),
                    KeyCode::Down | KeyCode::Char('j') => self.select_offset(1),
                    KeyCode::PageUp => self.select_offset(-10),
                    KeyCode::PageDown => self.select_offset(10),
                    KeyCode::Home | KeyCode::Char('g') => self.select_offset(isize::MIN),
                    KeyCode::End | KeyCode::Char('G') => self.select_offset(isize::MAX),
                    KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
                    _ => {}
                }
            }
        }
        Ok(false)
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let window = match self.window {
            Some((start, end)) => format!("{} → {}", format_date(start), format_date(end)),
            None => "empty".to_string(),
        };
        let header = Paragraph::new(vec![Line::from(vec![
            Span::styled("TIMELINE", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("Project: {}  Window: {}", self.title, window),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])])
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let bar_width = area.width.saturating_sub(FIXED_COLUMNS_WIDTH).max(10) as usize;

        let header = Row::new(
            ["Kind", "Status", "%", "Start", "End", "Title", "Schedule"]
                .iter()
                .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .height(1);

        let rows: Vec<Row> = self
            .nodes
            .iter()
            .zip(&self.depths)
            .map(|(n, depth)| {
                let color = kind_color(n.kind());
                let style = match n.status {
                    NodeStatus::Task(TaskStatus::Done)
                    | NodeStatus::Container(ContainerStatus::Completed) => {
                        Style::default().fg(Color::DarkGray)
                    }
                    NodeStatus::Task(TaskStatus::InProgress)
                    | NodeStatus::Container(ContainerStatus::InProgress) => {
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                    }
                    NodeStatus::Task(TaskStatus::Blocked) => Style::default().fg(Color::Red),
                    _ => Style::default().fg(Color::White),
                };
                let bar = match self.window {
                    Some(window) => bar_cells(n.start, n.end, n.progress, window, bar_width),
                    None => String::new(),
                };
                let title = format!("{}{}", " ".repeat(depth * 2), n.name);
                Row::new(vec![
                    Cell::from(format_kind(n.kind())),
                    Cell::from(format_node_status(n.status)),
                    Cell::from(n.progress.to_string()),
                    Cell::from(format_date(n.start)),
                    Cell::from(format_date(n.end)),
                    Cell::from(truncate(&title, 32)),
                    Cell::from(bar).style(Style::default().fg(color)),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(10), // Kind
            Constraint::Length(11), // Status
            Constraint::Length(5),  // %
            Constraint::Length(11), // Start
            Constraint::Length(11), // End
            Constraint::Length(32), // Title
            Constraint::Min(10),    // Schedule
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Nodes ({}) - Press 'h' for help", self.nodes.len())),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from(vec![Span::styled(
                "Timeline Help",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("  ↑/k, ↓/j     Move selection"),
            Line::from("  PgUp/PgDn    Move by ten rows"),
            Line::from("  g/Home       First row"),
            Line::from("  G/End        Last row"),
            Line::from("  h/?/F1       Show this help"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            Line::from(vec![Span::styled("Bars:", Style::default().add_modifier(Modifier::BOLD))]),
            Line::from("  █ completed share of the interval, ▒ remaining"),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Press any key to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = match self.table_state.selected().and_then(|i| self.nodes.get(i)) {
            Some(n) => {
                let parent = n.parent.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "-".into());
                format!("{}  parent: {}  {}%", n.node, parent, n.progress)
            }
            None => "No scheduled nodes".to_string(),
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(GOLD).fg(Color::Rgb(20, 20, 20)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        if self.show_help {
            self.render_help(f, chunks[1]);
        } else {
            self.render_table(f, chunks[1]);
        }
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop. Handles rendering and input until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}

/// Earliest start and latest end across all nodes.
pub fn timeline_window(nodes: &[ScheduledNode]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = nodes.iter().map(|n| n.start).min()?;
    let end = nodes.iter().map(|n| n.end).max()?;
    Some((start, end))
}

/// Draw one bar of `width` cells for `[start, end)` inside `window`. The
/// done share is solid, the rest shaded, and every bar gets at least one cell.
pub fn bar_cells(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    progress: u8,
    window: (DateTime<Utc>, DateTime<Utc>),
    width: usize,
) -> String {
    if width == 0 {
        return String::new();
    }
    let span = (window.1 - window.0).num_seconds().max(1) as f64;
    let col = |t: DateTime<Utc>| {
        let offset = (t - window.0).num_seconds() as f64 / span;
        ((offset * width as f64).round() as isize).clamp(0, width as isize) as usize
    };

    let from = col(start).min(width - 1);
    let to = col(end).max(from + 1).min(width);
    let len = to - from;
    let filled = (len * usize::from(progress.min(100)) + 50) / 100;

    let mut out = String::with_capacity(width * 3);
    out.push_str(&" ".repeat(from));
    out.push_str(&"█".repeat(filled));
    out.push_str(&"▒".repeat(len - filled));
    out.push_str(&" ".repeat(width - to));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn bar_spans_its_share_of_the_window() {
        let window = (day(1), day(11));
        let bar = bar_cells(day(1), day(6), 0, window, 10);
        assert_eq!(bar, "▒▒▒▒▒     ");
        let bar = bar_cells(day(6), day(11), 40, window, 10);
        assert_eq!(bar, "     ██▒▒▒");
    }

    #[test]
    fn tiny_intervals_still_get_a_cell() {
        let window = (day(1), day(31));
        let bar = bar_cells(day(31), day(31), 100, window, 5);
        assert_eq!(bar.chars().count(), 5);
        assert_eq!(bar, "    █");
    }
}
