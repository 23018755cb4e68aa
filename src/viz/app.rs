use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};

use crate::algo::tabular::q_table::ActionValues;
use crate::env::Environment;
use crate::gym::walled_garden::{Observation, Pos};
use crate::gym::WalledGarden;

use super::components::{Component, Gardens, Logs, TablePane};
use super::tui;

const TABS: [&str; 3] = ["Gardens", "Q-Table", "Logs"];

#[derive(Default)]
enum State {
    #[default]
    Run,
    Quit,
}

/// One garden as painted on the dashboard
#[derive(Clone)]
pub struct GardenFrame {
    pub body: Vec<Pos>,
    pub food: Pos,
    pub score: u32,
    pub alive: bool,
}

impl GardenFrame {
    pub fn capture(garden: &WalledGarden) -> Self {
        Self {
            body: garden.body().collect(),
            food: garden.food(),
            score: garden.score(),
            alive: garden.is_active(),
        }
    }
}

/// Per-tick payload for the dashboard
pub struct Update {
    pub tick: u64,
    pub frames: Vec<GardenFrame>,
    pub table: Vec<(Observation, ActionValues)>,
}

/// Spawn the dashboard on its own thread
///
/// **Returns** the join handle and the update channel. The driving loop
/// should stop once the channel disconnects, which means the user quit.
pub fn init() -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || App::new().run(rx));
    (handle, tx)
}

/// The root TUI component which holds the main app state and runs the render loop
pub struct App {
    state: State,
    tick: u64,
    selected_tab: usize,
    gardens: Gardens,
    table: TablePane,
    logs: Logs,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: Default::default(),
            tick: 0,
            selected_tab: 0,
            gardens: Gardens::new(),
            table: TablePane::new(),
            logs: Logs::new(),
        }
    }

    /// Initialize the terminal and run the main loop
    ///
    /// Restores the terminal on exit
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::init()?;

        loop {
            match self.state {
                State::Run => {
                    loop {
                        match rx.try_recv() {
                            Ok(update) => {
                                self.tick = update.tick;
                                self.gardens.update(update.frames);
                                self.table.update(update.table);
                            }
                            Err(TryRecvError::Empty) => break,
                            Err(TryRecvError::Disconnected) => {
                                // driving loop is gone, nothing more to show
                                self.state = State::Quit;
                                break;
                            }
                        }
                    }

                    terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

                    if event::poll(Duration::from_millis(16))? {
                        let ev = event::read()?;
                        if self.component_mut().handle_ui_event(&ev) {
                            continue;
                        }
                        if let Event::Key(key) = ev {
                            if key.kind != KeyEventKind::Press {
                                continue;
                            }
                            match key.code {
                                KeyCode::Tab => {
                                    self.selected_tab = (self.selected_tab + 1) % TABS.len();
                                }
                                KeyCode::Char('q') => {
                                    self.state = State::Quit;
                                }
                                _ => {}
                            }
                        }
                    }
                }
                State::Quit => break,
            }
        }

        tui::restore()
    }

    fn component(&self) -> &dyn Component {
        match self.selected_tab {
            1 => &self.table,
            2 => &self.logs,
            _ => &self.gardens,
        }
    }

    fn component_mut(&mut self) -> &mut dyn Component {
        match self.selected_tab {
            1 => &mut self.table,
            2 => &mut self.logs,
            _ => &mut self.gardens,
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Layout
        let [menu_area, main_area, status_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        // Menu
        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        // Main
        self.component().render_ref(main_area, buf);

        // Status
        let status = format!(
            " tick {} · {} gardens · {} learned states · Tab switches · q quits",
            self.tick,
            self.gardens.len(),
            self.table.len(),
        );
        Paragraph::new(status)
            .block(Block::bordered().border_type(BorderType::Rounded))
            .render(status_area, buf);
    }
}
