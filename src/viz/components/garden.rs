use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};

use crate::gym::walled_garden::{Pos, COURT, GRID};
use crate::viz::app::GardenFrame;

use super::Component;

const PER_PAGE: usize = 9;

/// The paged grid of garden panes
pub struct Gardens {
    frames: Vec<GardenFrame>,
    page: usize,
}

impl Gardens {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            page: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn update(&mut self, frames: Vec<GardenFrame>) {
        self.frames = frames;
        self.page = self.page.min(self.pages() - 1);
    }

    fn pages(&self) -> usize {
        self.frames.len().div_ceil(PER_PAGE).max(1)
    }
}

impl WidgetRef for Gardens {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let start = self.page * PER_PAGE;
        let visible = &self.frames[start.min(self.frames.len())
            ..(start + PER_PAGE).min(self.frames.len())];

        if visible.is_empty() {
            Paragraph::new("no gardens running")
                .block(Block::bordered().border_type(BorderType::Rounded))
                .render(area, buf);
            return;
        }

        let side = (visible.len() as f64).sqrt().ceil() as usize;
        let rows = visible.len().div_ceil(side);

        let mut cells = Vec::with_capacity(side * rows);
        for row_area in Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows])
            .split(area)
            .iter()
        {
            cells.extend(
                Layout::horizontal(vec![Constraint::Ratio(1, side as u32); side])
                    .split(*row_area)
                    .iter()
                    .copied(),
            );
        }

        for (i, (frame, cell)) in visible.iter().zip(cells).enumerate() {
            GardenPane {
                frame,
                index: start + i,
            }
            .render(cell, buf);
        }

        if self.pages() > 1 {
            let label = format!(" page {}/{} ←/→ ", self.page + 1, self.pages());
            let width = label.len() as u16;
            if area.width > width && area.height > 0 {
                buf.set_string(
                    area.right() - width,
                    area.bottom() - 1,
                    label,
                    Style::default().dim(),
                );
            }
        }
    }
}

impl Component for Gardens {
    fn handle_ui_event(&mut self, event: &Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            KeyCode::Left => {
                let pages = self.pages();
                self.page = (self.page + pages - 1) % pages;
                true
            }
            KeyCode::Right => {
                self.page = (self.page + 1) % self.pages();
                true
            }
            _ => false,
        }
    }
}

/// One garden painted as grid-aligned rectangles
struct GardenPane<'a> {
    frame: &'a GardenFrame,
    index: usize,
}

impl Widget for GardenPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let GardenFrame {
            body,
            food,
            score,
            alive,
        } = self.frame;

        let title = if *alive {
            format!(" garden {} · score {} ", self.index, score)
        } else {
            format!(" garden {} · score {} · respawning ", self.index, score)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(if *alive {
                Style::default()
            } else {
                Style::default().dim()
            });
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        fill_cell(inner, *food, Color::Red, buf);
        for (i, &segment) in body.iter().enumerate() {
            let color = if i == 0 { Color::LightGreen } else { Color::Green };
            fill_cell(inner, segment, color, buf);
        }
    }
}

/// Paint one court cell as a rectangle of terminal cells, proportional to
/// the pane size. Out-of-court positions (a dead head in the wall) are
/// skipped.
fn fill_cell(inner: Rect, pos: Pos, color: Color, buf: &mut Buffer) {
    let cols = (COURT.0 / GRID) as u32;
    let rows = (COURT.1 / GRID) as u32;
    let (cx, cy) = (pos.0 / GRID, pos.1 / GRID);
    if pos.0 < 0 || pos.1 < 0 || cx as u32 >= cols || cy as u32 >= rows {
        return;
    }

    let x0 = inner.x as u32 + cx as u32 * inner.width as u32 / cols;
    let x1 = (inner.x as u32 + (cx as u32 + 1) * inner.width as u32 / cols).max(x0 + 1);
    let y0 = inner.y as u32 + cy as u32 * inner.height as u32 / rows;
    let y1 = (inner.y as u32 + (cy as u32 + 1) * inner.height as u32 / rows).max(y0 + 1);

    for x in x0..x1 {
        for y in y0..y1 {
            if x < inner.right() as u32 && y < inner.bottom() as u32 {
                buf.get_mut(x as u16, y as u16).set_char(' ').set_bg(color);
            }
        }
    }
}
