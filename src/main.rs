use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use log::{info, LevelFilter};
use snakepit::algo::tabular::q_table::{QTableAgent, QTableAgentConfig};
use snakepit::env::Environment;
use snakepit::gym::WalledGarden;
use snakepit::store;
use snakepit::viz::{self, GardenFrame, Update};

const TICK_PERIOD: Duration = Duration::from_millis(100);
const SNAPSHOT_PATH: &str = "q_table.ron";
const DEFAULT_GAMES: usize = 4;

fn main() -> Result<(), Box<dyn Error>> {
    tui_logger::init_logger(LevelFilter::Trace)?;
    tui_logger::set_default_level(viz::DEFAULT_LOG_LEVEL);

    let games = prompt_game_count()?;

    let db = store::open(PathBuf::from(SNAPSHOT_PATH))?;
    let mut agent = QTableAgent::new(QTableAgentConfig::default());
    let snapshot = db.read(|table| table.clone())?;
    if !snapshot.is_empty() {
        info!("restored {} learned states", snapshot.len());
    }
    agent.import_state(snapshot);

    let mut gardens: Vec<WalledGarden> = (0..games).map(|_| WalledGarden::new()).collect();
    let (handle, tx) = viz::init();

    let mut tick: u64 = 0;
    let outcome = loop {
        let deadline = Instant::now() + TICK_PERIOD;

        // every garden advances once per tick, sharing the one table;
        // dead gardens sit out their revival delay instead
        for garden in &mut gardens {
            if !garden.is_active() {
                garden.heal();
                continue;
            }
            agent.drive(garden);
        }

        if let Err(err) = store::save(&db, agent.export_learned_values()) {
            break Err(err);
        }

        let mut table: Vec<_> = agent
            .q_table()
            .iter()
            .map(|(state, values)| (*state, *values))
            .collect();
        table.sort_by_key(|row| row.0);

        let update = Update {
            tick,
            frames: gardens.iter().map(GardenFrame::capture).collect(),
            table,
        };
        if tx.send(update).is_err() {
            // dashboard closed
            break Ok(());
        }

        tick += 1;
        if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }
    };

    // disconnect so the dashboard quits and restores the terminal, then
    // surface whichever side failed first
    drop(tx);
    handle.join().map_err(|_| "dashboard thread panicked")??;
    outcome?;
    Ok(())
}

fn prompt_game_count() -> io::Result<usize> {
    print!("Simultaneous games [{DEFAULT_GAMES}]: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().parse().unwrap_or(DEFAULT_GAMES))
}
