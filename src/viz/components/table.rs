use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use strum::IntoEnumIterator;

use crate::algo::tabular::q_table::ActionValues;
use crate::env::Dir;
use crate::gym::walled_garden::Observation;

use super::Component;

/// The full Q-table as scrollable text, one state per row
pub struct TablePane {
    rows: Vec<(Observation, ActionValues)>,
    scroll: u16,
}

impl TablePane {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            scroll: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn update(&mut self, rows: Vec<(Observation, ActionValues)>) {
        self.rows = rows;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn max_scroll(&self) -> u16 {
        self.rows.len().saturating_sub(1) as u16
    }
}

impl WidgetRef for TablePane {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = self
            .rows
            .iter()
            .map(|(state, values)| {
                let best = values.best();
                let mut spans = vec![Span::styled(
                    format!(
                        "({:>2},{:>2},{:<5})",
                        state.food_x,
                        state.food_y,
                        format!("{:?}", state.facing).to_lowercase(),
                    ),
                    Style::default().cyan(),
                )];
                for dir in Dir::iter() {
                    let span = Span::raw(format!(
                        "  {:<5} {:>9.3}",
                        format!("{:?}", dir).to_lowercase(),
                        values[dir],
                    ));
                    spans.push(if dir == best { span.bold().yellow() } else { span });
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title(format!(" Q-Table · {} states ", self.rows.len())),
            )
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}

impl Component for TablePane {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
                true
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            KeyCode::PageDown => {
                self.scroll = (self.scroll + 10).min(self.max_scroll());
                true
            }
            KeyCode::Home => {
                self.scroll = 0;
                true
            }
            _ => false,
        }
    }
}
