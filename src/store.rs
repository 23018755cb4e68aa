use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::warn;
use rustbreak::backend::PathBackend;
use rustbreak::deser::Ron;
use rustbreak::{Database, PathDatabase, RustbreakError};

use crate::algo::tabular::q_table::ActionValues;
use crate::gym::walled_garden::Observation;

/// Everything the agent has learned, keyed by state
pub type Snapshot = HashMap<Observation, ActionValues>;

pub type SnapshotDb = Database<Snapshot, PathBackend, Ron>;

/// Open the snapshot file at `path`, creating it empty if absent.
///
/// An unreadable snapshot (truncated write, incompatible encoding) is
/// discarded with a warning: prior learning is lost, never misread.
pub fn open(path: PathBuf) -> Result<SnapshotDb, RustbreakError> {
    match PathDatabase::load_from_path_or(path.clone(), Snapshot::new()) {
        Ok(db) => Ok(db),
        Err(err) => {
            warn!(
                "discarding unreadable snapshot at {}: {}",
                path.display(),
                err
            );
            fs::remove_file(&path).ok();
            PathDatabase::load_from_path_or(path, Snapshot::new())
        }
    }
}

/// Overwrite the snapshot on disk with `table`
pub fn save(db: &SnapshotDb, table: Snapshot) -> Result<(), RustbreakError> {
    db.write(|data| *data = table)?;
    db.save()
}

#[cfg(test)]
mod tests {
    use crate::env::Dir;

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("snakepit_{}_{}.ron", name, std::process::id()))
    }

    fn sample_table() -> Snapshot {
        let mut table = Snapshot::new();
        table.insert(
            Observation {
                food_x: 1,
                food_y: 0,
                facing: Dir::Right,
            },
            ActionValues {
                up: -1.0,
                down: 0.5,
                left: 0.0,
                right: 2.25,
            },
        );
        table
    }

    #[test]
    fn round_trips_through_disk() {
        let path = scratch_path("round_trip");
        let table = sample_table();

        let db = open(path.clone()).unwrap();
        save(&db, table.clone()).unwrap();
        drop(db);

        let db = open(path.clone()).unwrap();
        let restored = db.read(|data| data.clone()).unwrap();
        assert_eq!(restored, table);
        for (state, values) in &table {
            assert_eq!(restored[state].best(), values.best());
        }

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn unreadable_snapshot_starts_fresh() {
        let path = scratch_path("unreadable");
        fs::write(&path, "not a snapshot").unwrap();

        let db = open(path.clone()).unwrap();
        let restored = db.read(|data| data.clone()).unwrap();
        assert!(restored.is_empty());

        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_snapshot_starts_fresh() {
        let path = scratch_path("missing");
        fs::remove_file(&path).ok();

        let db = open(path.clone()).unwrap();
        let restored = db.read(|data| data.clone()).unwrap();
        assert!(restored.is_empty());

        fs::remove_file(path).ok();
    }
}
